use crate::math::Vec3;

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Display height of one raster pixel relative to its width. Terminal
    /// character cells are roughly 1:2, so the terminal frontend uses 2.0 to
    /// keep the picture round.
    pub pixel_aspect: f32,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            forward: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            yaw,
            pitch,
            fov: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 1000.0,
            pixel_aspect: 1.0,
        };
        camera.update_vectors();
        camera
    }

    pub fn update_vectors(&mut self) {
        let forward = Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize();

        let world_up = Vec3::new(0.0, 1.0, 0.0);
        let right = forward.cross(world_up).normalize();
        let up = right.cross(forward).normalize();

        self.forward = forward;
        self.right = if right.length_squared() < 1e-6 {
            Vec3::new(1.0, 0.0, 0.0)
        } else {
            right
        };
        self.up = up;
    }

    pub fn world_to_view(&self, point: Vec3) -> Vec3 {
        let rel = point - self.position;
        Vec3::new(rel.dot(self.right), rel.dot(self.up), rel.dot(self.forward))
    }

    /// Focal lengths in raster pixels. fy is compressed by `pixel_aspect`
    /// so tall display pixels do not stretch the image.
    pub fn focal_lengths(&self, width: usize, height: usize) -> (f32, f32) {
        let h = height.max(1) as f32;
        let w = width.max(1) as f32;
        let tan_half = (self.fov * 0.5).tan().max(1e-6);
        let aspect = self.pixel_aspect.max(1e-3);
        let fy = h / (2.0 * tan_half) / aspect;
        let fx = fy * aspect * (w / h);
        (fx, fy)
    }
}

pub fn look_at_target(camera: &mut Camera, target: Vec3) {
    let to_target = (target - camera.position).normalize();
    if to_target.length_squared() < 1e-8 {
        return;
    }
    camera.yaw = to_target.z.atan2(to_target.x);
    camera.pitch = to_target.y.clamp(-1.0, 1.0).asin();
    camera.update_vectors();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_down_minus_z_puts_points_ahead_at_positive_view_z() {
        let mut camera =
            Camera::new(Vec3::new(0.0, 0.0, 15.0), -std::f32::consts::FRAC_PI_2, 0.0);
        look_at_target(&mut camera, Vec3::ZERO);
        let view = camera.world_to_view(Vec3::ZERO);
        assert!(view.x.abs() < 1e-4);
        assert!(view.y.abs() < 1e-4);
        assert!((view.z - 15.0).abs() < 1e-3);
    }

    #[test]
    fn pixel_aspect_compresses_vertical_focal_length() {
        let mut camera =
            Camera::new(Vec3::new(0.0, 0.0, 15.0), -std::f32::consts::FRAC_PI_2, 0.0);
        let (fx_square, fy_square) = camera.focal_lengths(100, 100);
        camera.pixel_aspect = 2.0;
        let (fx_tall, fy_tall) = camera.focal_lengths(100, 100);
        assert!((fy_tall - fy_square / 2.0).abs() < 1e-3);
        assert!((fx_tall - fx_square).abs() < 1e-3);
    }
}
