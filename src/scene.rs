use crate::camera::{look_at_target, Camera};
use crate::config::RotationStyle;
use crate::math::{mat3_mul, rotation_x, rotation_y, rotation_z, Mat3, Vec3};
use crate::mesh::Mesh;

/// Loaded models are rescaled so their largest dimension matches this.
pub const MODEL_EXTENT: f32 = 10.0;
pub const CAMERA_DISTANCE: f32 = 15.0;

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    /// Unit vector pointing from the scene toward the light.
    pub direction: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    Shaded,
    Wireframe,
}

impl RenderStyle {
    pub fn name(self) -> &'static str {
        match self {
            Self::Shaded => "shaded",
            Self::Wireframe => "wireframe",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Shaded => Self::Wireframe,
            Self::Wireframe => Self::Shaded,
        }
    }
}

#[derive(Debug)]
pub struct Model {
    pub name: String,
    pub mesh: Mesh,
    /// Euler rotation in radians, applied X then Y then Z.
    pub rotation: Vec3,
}

/// Fixed-rig scene: one camera, one light setup, at most one resident model.
#[derive(Debug)]
pub struct Scene {
    pub camera: Camera,
    pub ambient: f32,
    pub lights: Vec<DirectionalLight>,
    pub model: Option<Model>,
    pub style: RenderStyle,
}

impl Scene {
    pub fn new(pixel_aspect: f32) -> Self {
        let mut camera = Camera::new(
            Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            -std::f32::consts::FRAC_PI_2,
            0.0,
        );
        camera.pixel_aspect = pixel_aspect;
        look_at_target(&mut camera, Vec3::ZERO);

        // Low ambient, hard key light, faint back light: steep brightness
        // gradients survive the glyph quantization.
        let lights = vec![
            DirectionalLight {
                direction: Vec3::new(2.0, 2.0, 3.0).normalize(),
                intensity: 1.2,
            },
            DirectionalLight {
                direction: Vec3::new(-2.0, -1.0, -2.0).normalize(),
                intensity: 0.15,
            },
        ];

        Self {
            camera,
            ambient: 0.15,
            lights,
            model: None,
            style: RenderStyle::Shaded,
        }
    }

    pub fn clear_model(&mut self) {
        self.model = None;
    }

    /// Install a mesh as the resident model, rotation reset.
    pub fn set_model(&mut self, name: &str, mesh: Mesh) {
        self.model = Some(Model {
            name: name.to_string(),
            mesh,
            rotation: Vec3::ZERO,
        });
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.name.as_str())
    }

    pub fn advance_rotation(&mut self, style: RotationStyle, speed: f32) {
        let Some(model) = &mut self.model else {
            return;
        };
        match style {
            RotationStyle::Yaw => model.rotation.y += speed,
            RotationStyle::Tumble => {
                model.rotation.x += speed * 2.0;
                model.rotation.y += speed * 3.0;
                model.rotation.z += speed;
            }
        }
    }

    /// Lambert term for a world-space unit normal.
    pub fn light_intensity(&self, normal: Vec3) -> f32 {
        let mut intensity = self.ambient;
        for light in &self.lights {
            intensity += light.intensity * normal.dot(light.direction).max(0.0);
        }
        intensity
    }
}

pub fn model_matrix(rotation: Vec3) -> Mat3 {
    mat3_mul(
        rotation_z(rotation.z),
        mat3_mul(rotation_y(rotation.y), rotation_x(rotation.x)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mat3_apply;

    #[test]
    fn yaw_rotation_advances_y_only() {
        let mut scene = Scene::new(1.0);
        scene.set_model("test", Mesh::default());
        scene.advance_rotation(RotationStyle::Yaw, 0.01);
        scene.advance_rotation(RotationStyle::Yaw, 0.01);
        let rotation = scene.model.as_ref().expect("model").rotation;
        assert_eq!(rotation.x, 0.0);
        assert!((rotation.y - 0.02).abs() < 1e-6);
        assert_eq!(rotation.z, 0.0);
    }

    #[test]
    fn tumble_rotation_uses_2_3_1_ratios() {
        let mut scene = Scene::new(1.0);
        scene.set_model("test", Mesh::default());
        scene.advance_rotation(RotationStyle::Tumble, 0.005);
        let rotation = scene.model.as_ref().expect("model").rotation;
        assert!((rotation.x - 0.010).abs() < 1e-6);
        assert!((rotation.y - 0.015).abs() < 1e-6);
        assert!((rotation.z - 0.005).abs() < 1e-6);
    }

    #[test]
    fn replacing_a_model_resets_rotation() {
        let mut scene = Scene::new(1.0);
        scene.set_model("first", Mesh::default());
        scene.advance_rotation(RotationStyle::Yaw, 1.0);
        scene.set_model("second", Mesh::default());
        let rotation = scene.model.as_ref().expect("model").rotation;
        assert_eq!(rotation.y, 0.0);
        assert_eq!(scene.model_name(), Some("second"));
    }

    #[test]
    fn key_light_brightens_facing_normals() {
        let scene = Scene::new(1.0);
        let toward_key = Vec3::new(2.0, 2.0, 3.0).normalize();
        let away = -toward_key;
        assert!(scene.light_intensity(toward_key) > 1.0);
        // Facing away still catches the back light plus ambient.
        let back = scene.light_intensity(away);
        assert!(back > scene.ambient);
        assert!(back < 0.5);
    }

    #[test]
    fn model_matrix_applies_x_before_z() {
        // Rotate +Y by 90° around X (→ +Z), then 90° around Z (stays +Z).
        let m = model_matrix(Vec3::new(
            std::f32::consts::FRAC_PI_2,
            0.0,
            std::f32::consts::FRAC_PI_2,
        ));
        let v = mat3_apply(m, Vec3::new(0.0, 1.0, 0.0));
        assert!(v.x.abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);
        assert!((v.z - 1.0).abs() < 1e-6);
    }
}
