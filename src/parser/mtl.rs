use crate::math::clamp_u8;
use crate::mesh::Material;

use crate::AppResult;

fn parse_channel(token: &str) -> AppResult<f32> {
    token
        .parse::<f32>()
        .map_err(|_| format!("MTL parse error: invalid number '{token}'").into())
}

/// Parse a Wavefront MTL material library. Only the fields the renderer
/// consumes are kept: diffuse color (Kd) and dissolve (d / Tr).
pub fn parse_mtl(text: &str) -> AppResult<Vec<Material>> {
    let mut materials: Vec<Material> = Vec::new();

    for line in text.lines() {
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
            "newmtl" => {
                let name = parts
                    .next()
                    .ok_or("MTL parse error: newmtl without a name")?;
                materials.push(Material {
                    name: name.to_string(),
                    diffuse: [200, 200, 200],
                    dissolve: 1.0,
                });
            }
            "Kd" => {
                let current = materials
                    .last_mut()
                    .ok_or("MTL parse error: Kd before newmtl")?;
                let mut kd = [0.0_f32; 3];
                for channel in &mut kd {
                    let token = parts.next().ok_or("MTL parse error: Kd needs 3 values")?;
                    *channel = parse_channel(token)?;
                }
                current.diffuse = [
                    clamp_u8(kd[0] * 255.0),
                    clamp_u8(kd[1] * 255.0),
                    clamp_u8(kd[2] * 255.0),
                ];
            }
            "d" => {
                let current = materials
                    .last_mut()
                    .ok_or("MTL parse error: d before newmtl")?;
                let token = parts.next().ok_or("MTL parse error: d needs a value")?;
                current.dissolve = parse_channel(token)?.clamp(0.0, 1.0);
            }
            "Tr" => {
                // Inverted dissolve, used by some exporters.
                let current = materials
                    .last_mut()
                    .ok_or("MTL parse error: Tr before newmtl")?;
                let token = parts.next().ok_or("MTL parse error: Tr needs a value")?;
                current.dissolve = (1.0 - parse_channel(token)?).clamp(0.0, 1.0);
            }
            _ => {}
        }
    }

    if materials.is_empty() {
        return Err("MTL parse error: no materials defined".into());
    }
    Ok(materials)
}
