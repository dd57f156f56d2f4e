use std::fs;
use std::path::Path;

use crate::math::Vec3;
use crate::mesh::{Face, Material, Mesh};
use crate::parser::mtl;

use crate::AppResult;

/// One corner of a face statement: position index plus optional normal.
#[derive(Debug, Clone, Copy)]
struct FaceRef {
    position: u32,
    normal: Option<u32>,
}

fn resolve_index(raw: i64, count: usize, what: &str) -> AppResult<u32> {
    // OBJ indices are 1-based; negative indices count back from the end.
    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        count as i64 + raw
    } else {
        return Err(format!("OBJ parse error: zero {what} index").into());
    };
    if resolved < 0 || resolved >= count as i64 {
        return Err(format!("OBJ parse error: {what} index {raw} out of range").into());
    }
    Ok(resolved as u32)
}

fn parse_face_ref(token: &str, positions: usize, normals: usize) -> AppResult<FaceRef> {
    let mut fields = token.split('/');
    let pos_token = fields.next().unwrap_or("");
    let raw_pos = pos_token
        .parse::<i64>()
        .map_err(|_| format!("OBJ parse error: invalid face reference '{token}'"))?;
    let _texcoord = fields.next();
    let normal = match fields.next() {
        Some("") | None => None,
        Some(n) => {
            let raw = n
                .parse::<i64>()
                .map_err(|_| format!("OBJ parse error: invalid normal reference '{token}'"))?;
            Some(resolve_index(raw, normals, "normal")?)
        }
    };
    Ok(FaceRef {
        position: resolve_index(raw_pos, positions, "vertex")?,
        normal,
    })
}

fn parse_float(token: &str) -> AppResult<f32> {
    token
        .parse::<f32>()
        .map_err(|_| format!("OBJ parse error: invalid number '{token}'").into())
}

/// Parse OBJ text. `resolve_mtl` maps a `mtllib` name to that file's
/// contents, so the caller controls filesystem access.
pub fn parse_obj(
    text: &str,
    resolve_mtl: impl Fn(&str) -> AppResult<String>,
) -> AppResult<Mesh> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut file_normals: Vec<Vec3> = Vec::new();
    let mut faces: Vec<Face> = Vec::new();
    let mut materials: Vec<Material> = vec![Material::default_gray()];
    let mut current_material: u16 = 0;
    let mut all_faces_have_normals = true;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let keyword = match parts.next() {
            Some(k) => k,
            None => continue,
        };

        match keyword {
            "v" => {
                let mut p = [0.0_f32; 3];
                for channel in &mut p {
                    let token = parts.next().ok_or_else(|| {
                        format!("OBJ parse error: line {}: v needs 3 values", line_no + 1)
                    })?;
                    *channel = parse_float(token)?;
                }
                positions.push(Vec3::new(p[0], p[1], p[2]));
            }
            "vn" => {
                let mut n = [0.0_f32; 3];
                for channel in &mut n {
                    let token = parts.next().ok_or_else(|| {
                        format!("OBJ parse error: line {}: vn needs 3 values", line_no + 1)
                    })?;
                    *channel = parse_float(token)?;
                }
                file_normals.push(Vec3::new(n[0], n[1], n[2]).normalize());
            }
            "f" => {
                let refs: Vec<FaceRef> = parts
                    .map(|token| parse_face_ref(token, positions.len(), file_normals.len()))
                    .collect::<AppResult<_>>()?;
                if refs.len() < 3 {
                    return Err(format!(
                        "OBJ parse error: line {}: face needs at least 3 vertices",
                        line_no + 1
                    )
                    .into());
                }
                // Fan triangulation for quads and larger polygons.
                for i in 1..refs.len() - 1 {
                    let corners = [refs[0], refs[i], refs[i + 1]];
                    if corners.iter().any(|c| c.normal.is_none()) {
                        all_faces_have_normals = false;
                    }
                    faces.push(Face {
                        positions: [
                            corners[0].position,
                            corners[1].position,
                            corners[2].position,
                        ],
                        normals: [
                            corners[0].normal.unwrap_or(0),
                            corners[1].normal.unwrap_or(0),
                            corners[2].normal.unwrap_or(0),
                        ],
                        material: current_material,
                    });
                }
            }
            "usemtl" => {
                let name = parts
                    .next()
                    .ok_or("OBJ parse error: usemtl without a name")?;
                let index = materials
                    .iter()
                    .position(|m| m.name == name)
                    .ok_or_else(|| format!("OBJ parse error: unknown material '{name}'"))?;
                current_material = index as u16;
            }
            "mtllib" => {
                let name = parts
                    .next()
                    .ok_or("OBJ parse error: mtllib without a name")?;
                let text = resolve_mtl(name)?;
                materials.extend(mtl::parse_mtl(&text)?);
            }
            // Groups, objects, smoothing groups, texcoords: irrelevant here.
            _ => {}
        }
    }

    if faces.is_empty() {
        return Err("OBJ parse error: no faces found".into());
    }

    let mut mesh = Mesh {
        positions,
        normals: file_normals,
        faces,
        edges: Vec::new(),
        materials,
    };
    if !all_faces_have_normals || mesh.normals.is_empty() {
        mesh.compute_vertex_normals();
    }
    mesh.collect_edges();
    Ok(mesh)
}

/// Load an OBJ model plus its material library. The library is whatever
/// `mtllib` names, resolved next to the OBJ; a missing or malformed library
/// rejects the whole load, while an OBJ with no `mtllib` keeps a default
/// material.
pub fn load_obj_file(path: &str) -> AppResult<Mesh> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {}", Path::new(path).display(), e))?;
    let base_dir = Path::new(path).parent().map(Path::to_path_buf);
    parse_obj(&text, |mtl_name| {
        let mtl_path = match &base_dir {
            Some(dir) => dir.join(mtl_name),
            None => Path::new(mtl_name).to_path_buf(),
        };
        fs::read_to_string(&mtl_path)
            .map_err(|e| format!("failed to read '{}': {}", mtl_path.display(), e).into())
    })
}
