use clap::ValueEnum;
use rand::Rng;
use std::f32::consts::TAU;

use crate::math::{hsv_to_rgb, Vec3};
use crate::mesh::{Face, Material, Mesh};

// --- Procedural demo meshes ---

/// Demo face palette: green, cyan, magenta, yellow.
const PALETTE: [[u8; 3]; 4] = [
    [0, 255, 0],
    [0, 255, 255],
    [255, 0, 255],
    [255, 255, 0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoKind {
    Cube,
    Pyramid,
    Rock,
}

impl DemoKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Pyramid => "pyramid",
            Self::Rock => "rock",
        }
    }
}

pub fn generate(kind: DemoKind) -> Mesh {
    match kind {
        DemoKind::Cube => generate_cube(),
        DemoKind::Pyramid => generate_pyramid(),
        DemoKind::Rock => generate_rock(),
    }
}

fn palette_materials() -> Vec<Material> {
    PALETTE
        .iter()
        .enumerate()
        .map(|(i, &diffuse)| Material {
            name: format!("palette{i}"),
            diffuse,
            dissolve: 1.0,
        })
        .collect()
}

/// Append a flat-shaded quad: four fresh vertices sharing one normal,
/// split into two triangles.
fn push_quad(mesh: &mut Mesh, corners: [Vec3; 4], normal: Vec3, material: u16) {
    let base = mesh.positions.len() as u32;
    let normal_idx = mesh.normals.len() as u32;
    mesh.positions.extend(corners);
    mesh.normals.push(normal);
    for tri in [[0, 1, 2], [0, 2, 3]] {
        mesh.faces.push(Face {
            positions: [base + tri[0], base + tri[1], base + tri[2]],
            normals: [normal_idx; 3],
            material,
        });
    }
}

fn push_tri(mesh: &mut Mesh, corners: [Vec3; 3], material: u16) {
    let base = mesh.positions.len() as u32;
    let normal_idx = mesh.normals.len() as u32;
    let normal = (corners[1] - corners[0])
        .cross(corners[2] - corners[0])
        .normalize();
    mesh.positions.extend(corners);
    mesh.normals.push(normal);
    mesh.faces.push(Face {
        positions: [base, base + 1, base + 2],
        normals: [normal_idx; 3],
        material,
    });
}

fn generate_cube() -> Mesh {
    let mut mesh = Mesh {
        materials: palette_materials(),
        ..Mesh::default()
    };

    let v = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
    // Six faces, palette cycling per side, flat normals.
    let sides: [([Vec3; 4], Vec3); 6] = [
        (
            [v(-1., -1., 1.), v(1., -1., 1.), v(1., 1., 1.), v(-1., 1., 1.)],
            v(0., 0., 1.),
        ),
        (
            [v(1., -1., -1.), v(-1., -1., -1.), v(-1., 1., -1.), v(1., 1., -1.)],
            v(0., 0., -1.),
        ),
        (
            [v(1., -1., 1.), v(1., -1., -1.), v(1., 1., -1.), v(1., 1., 1.)],
            v(1., 0., 0.),
        ),
        (
            [v(-1., -1., -1.), v(-1., -1., 1.), v(-1., 1., 1.), v(-1., 1., -1.)],
            v(-1., 0., 0.),
        ),
        (
            [v(-1., 1., 1.), v(1., 1., 1.), v(1., 1., -1.), v(-1., 1., -1.)],
            v(0., 1., 0.),
        ),
        (
            [v(-1., -1., -1.), v(1., -1., -1.), v(1., -1., 1.), v(-1., -1., 1.)],
            v(0., -1., 0.),
        ),
    ];
    for (i, (corners, normal)) in sides.into_iter().enumerate() {
        push_quad(&mut mesh, corners, normal, (i % PALETTE.len()) as u16);
    }

    // The classic 12-edge outline, not the triangulated one.
    let corners = [
        v(-1., -1., -1.),
        v(1., -1., -1.),
        v(1., 1., -1.),
        v(-1., 1., -1.),
        v(-1., -1., 1.),
        v(1., -1., 1.),
        v(1., 1., 1.),
        v(-1., 1., 1.),
    ];
    let outline_base = mesh.positions.len() as u32;
    mesh.positions.extend(corners);
    for [a, b] in [
        [0, 1], [1, 2], [2, 3], [3, 0],
        [4, 5], [5, 6], [6, 7], [7, 4],
        [0, 4], [1, 5], [2, 6], [3, 7],
    ] {
        mesh.edges.push([outline_base + a, outline_base + b]);
    }

    mesh
}

fn generate_pyramid() -> Mesh {
    let mut mesh = Mesh {
        materials: palette_materials(),
        ..Mesh::default()
    };

    let apex = Vec3::new(0.0, 1.5, 0.0);
    let base = [
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
    ];

    for i in 0..4 {
        let material = (i % PALETTE.len()) as u16;
        push_tri(&mut mesh, [apex, base[(i + 1) % 4], base[i]], material);
    }
    // Square base, facing down.
    push_quad(
        &mut mesh,
        [base[0], base[1], base[2], base[3]],
        Vec3::new(0.0, -1.0, 0.0),
        0,
    );

    // Outline: apex spokes plus the base loop.
    let outline_base = mesh.positions.len() as u32;
    mesh.positions.push(apex);
    mesh.positions.extend(base);
    for [a, b] in [[0, 1], [0, 2], [0, 3], [0, 4], [1, 2], [2, 3], [3, 4], [4, 1]] {
        mesh.edges.push([outline_base + a, outline_base + b]);
    }

    mesh
}

/// Randomized lat/long sphere with jittered radii: a lumpy asteroid that
/// shows off smooth shading and the halftone ramp.
fn generate_rock() -> Mesh {
    const RINGS: usize = 14;
    const SEGMENTS: usize = 24;

    let mut rng = rand::rng();
    // A few regolith shades around a dusty ochre hue, scattered per face.
    let materials = (0..3)
        .map(|i| Material {
            name: format!("regolith{i}"),
            diffuse: hsv_to_rgb(34.0, 0.24, 0.52 + i as f32 * 0.09),
            dissolve: 1.0,
        })
        .collect();
    let mut mesh = Mesh {
        materials,
        ..Mesh::default()
    };

    // Vertex grid: poles get a full ring of duplicates to keep indexing flat.
    for ring in 0..=RINGS {
        let theta = ring as f32 / RINGS as f32 * std::f32::consts::PI;
        for segment in 0..SEGMENTS {
            let phi = segment as f32 / SEGMENTS as f32 * TAU;
            let radius = rng.random_range(0.84_f32..1.12_f32);
            mesh.positions.push(Vec3::new(
                theta.sin() * phi.cos() * radius,
                theta.cos() * radius,
                theta.sin() * phi.sin() * radius,
            ));
        }
    }

    let index = |ring: usize, segment: usize| (ring * SEGMENTS + segment % SEGMENTS) as u32;
    for ring in 0..RINGS {
        for segment in 0..SEGMENTS {
            let a = index(ring, segment);
            let b = index(ring + 1, segment);
            let c = index(ring + 1, segment + 1);
            let d = index(ring, segment + 1);
            let material = rng.random_range(0..mesh.materials.len()) as u16;
            mesh.faces.push(Face {
                positions: [a, b, c],
                normals: [a, b, c],
                material,
            });
            mesh.faces.push(Face {
                positions: [a, c, d],
                normals: [a, c, d],
                material,
            });
        }
    }

    mesh.compute_vertex_normals();
    mesh.collect_edges();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_flat_quads_and_twelve_outline_edges() {
        let mesh = generate_cube();
        assert_eq!(mesh.faces.len(), 12);
        assert_eq!(mesh.edges.len(), 12);
        assert_eq!(mesh.materials.len(), 4);
        // Every face's normal is axis-aligned unit length.
        for face in &mesh.faces {
            let n = mesh.normals[face.normals[0] as usize];
            assert!((n.length() - 1.0).abs() < 1e-6);
            let max_axis = n.x.abs().max(n.y.abs()).max(n.z.abs());
            assert!((max_axis - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn pyramid_has_four_sides_and_a_base() {
        let mesh = generate_pyramid();
        // 4 side triangles + 2 base triangles.
        assert_eq!(mesh.faces.len(), 6);
        assert_eq!(mesh.edges.len(), 8);
    }

    #[test]
    fn rock_is_closed_enough_to_shade() {
        let mesh = generate_rock();
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert!(!mesh.faces.is_empty());
        assert!(!mesh.edges.is_empty());
        // All radii inside the jitter band.
        for p in &mesh.positions {
            let r = p.length();
            assert!((0.8..1.2).contains(&r), "radius {r}");
        }
    }

    #[test]
    fn demo_kinds_name_themselves() {
        assert_eq!(DemoKind::Cube.name(), "cube");
        assert_eq!(DemoKind::Rock.name(), "rock");
    }
}
