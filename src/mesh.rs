use std::collections::HashSet;

use crate::math::Vec3;

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub diffuse: [u8; 3],
    /// 1.0 opaque, 0.0 fully dissolved.
    pub dissolve: f32,
}

impl Material {
    pub fn default_gray() -> Self {
        Self {
            name: "default".to_string(),
            diffuse: [200, 200, 200],
            dissolve: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub positions: [u32; 3],
    pub normals: [u32; 3],
    pub material: u16,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Face>,
    /// Unique undirected edges, for wireframe drawing.
    pub edges: Vec<[u32; 2]>,
    pub materials: Vec<Material>,
}

impl Mesh {
    pub fn aabb(&self) -> Option<(Vec3, Vec3)> {
        if self.positions.is_empty() {
            return None;
        }
        let mut min = Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        let mut max = Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in &self.positions {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }

    /// Center on the AABB midpoint and scale uniformly so the largest
    /// dimension equals `extent`. Keeps the fixed camera framing valid for
    /// arbitrary model units.
    pub fn normalize_to_extent(&mut self, extent: f32) {
        let Some((min, max)) = self.aabb() else {
            return;
        };
        let center = (min + max) * 0.5;
        let span = max - min;
        let max_dim = span.x.max(span.y).max(span.z);
        let scale = if max_dim > 1e-6 { extent / max_dim } else { 1.0 };
        for p in &mut self.positions {
            *p = (*p - center) * scale;
        }
    }

    /// Area-weighted per-vertex normals. Rewrites `normals` to mirror
    /// `positions` and points every face's normal indices at its positions.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for face in &self.faces {
            let a = self.positions[face.positions[0] as usize];
            let b = self.positions[face.positions[1] as usize];
            let c = self.positions[face.positions[2] as usize];
            // Cross product length is twice the triangle area, so summing
            // unnormalized face normals area-weights the average.
            let face_normal = (b - a).cross(c - a);
            for &idx in &face.positions {
                normals[idx as usize] += face_normal;
            }
        }
        for n in &mut normals {
            *n = n.normalize();
        }
        self.normals = normals;
        for face in &mut self.faces {
            face.normals = face.positions;
        }
    }

    /// Derive the unique edge set from the triangle list.
    pub fn collect_edges(&mut self) {
        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let mut edges = Vec::new();
        for face in &self.faces {
            let tri = face.positions;
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    edges.push([key.0, key.1]);
                }
            }
        }
        self.edges = edges;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Mesh {
        Mesh {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            normals: Vec::new(),
            faces: vec![Face {
                positions: [0, 1, 2],
                normals: [0, 1, 2],
                material: 0,
            }],
            edges: Vec::new(),
            materials: vec![Material::default_gray()],
        }
    }

    #[test]
    fn normalize_centers_and_scales() {
        let mut mesh = unit_triangle();
        mesh.normalize_to_extent(10.0);
        let (min, max) = mesh.aabb().expect("aabb");
        let span = max - min;
        let max_dim = span.x.max(span.y).max(span.z);
        assert!((max_dim - 10.0).abs() < 1e-4);
        let center = (min + max) * 0.5;
        assert!(center.length() < 1e-4);
    }

    #[test]
    fn vertex_normals_point_away_from_winding_plane() {
        let mut mesh = unit_triangle();
        mesh.compute_vertex_normals();
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        for n in &mesh.normals {
            // (b-a) x (c-a) for this winding points along -Y.
            assert!((n.y + 1.0).abs() < 1e-5, "got {n:?}");
        }
    }

    #[test]
    fn edge_collection_dedups_shared_edges() {
        let mut mesh = unit_triangle();
        mesh.faces.push(Face {
            positions: [2, 1, 0],
            normals: [2, 1, 0],
            material: 0,
        });
        mesh.collect_edges();
        assert_eq!(mesh.edges.len(), 3);
    }
}
