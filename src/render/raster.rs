use rayon::prelude::*;

use crate::camera::Camera;
use crate::math::{clamp_u8, mat3_apply, Vec3};
use crate::mesh::Mesh;
use crate::scene::{model_matrix, RenderStyle, Scene};

use super::RasterState;

// --- Scene rasterizer ---

/// A camera-projected, lit triangle ready for scan conversion.
#[derive(Debug, Clone, Copy)]
struct ProjectedTri {
    sx: [f32; 3],
    sy: [f32; 3],
    depth: [f32; 3],
    rgb: [[f32; 3]; 3],
    alpha: u8,
}

/// Render the scene into the raster. Clears first; with no model resident
/// the raster stays fully transparent (the empty/background frame).
pub fn render_scene(scene: &Scene, raster: &mut RasterState) {
    raster.clear();
    if raster.width == 0 || raster.height == 0 {
        return;
    }
    let Some(model) = &scene.model else {
        return;
    };
    match scene.style {
        RenderStyle::Shaded => rasterize_mesh(scene, &model.mesh, model.rotation, raster),
        RenderStyle::Wireframe => rasterize_wireframe(scene, &model.mesh, model.rotation, raster),
    }
}

/// Project every vertex through model rotation, camera, and perspective.
/// Returns (screen_x, screen_y, view_z) per vertex.
fn project_positions(
    mesh: &Mesh,
    rotation: Vec3,
    camera: &Camera,
    width: usize,
    height: usize,
) -> Vec<(f32, f32, f32)> {
    let m = model_matrix(rotation);
    let (fx, fy) = camera.focal_lengths(width, height);
    let half_w = width as f32 * 0.5;
    let half_h = height as f32 * 0.5;

    mesh.positions
        .par_iter()
        .map(|&p| {
            let view = camera.world_to_view(mat3_apply(m, p));
            let inv_z = 1.0 / view.z.max(1e-5);
            let screen_x = half_w + view.x * fx * inv_z;
            let screen_y = half_h - view.y * fy * inv_z;
            (screen_x, screen_y, view.z)
        })
        .collect()
}

fn rasterize_mesh(scene: &Scene, mesh: &Mesh, rotation: Vec3, raster: &mut RasterState) {
    let width = raster.width;
    let height = raster.height;
    let camera = &scene.camera;

    let projected = project_positions(mesh, rotation, camera, width, height);

    // Lambert intensity per normal, in world space. Rotation is orthonormal
    // so normals transform by the same matrix.
    let m = model_matrix(rotation);
    let intensities: Vec<f32> = mesh
        .normals
        .par_iter()
        .map(|&n| scene.light_intensity(mat3_apply(m, n)))
        .collect();

    let sw = width as f32;
    let sh = height as f32;
    let tris: Vec<ProjectedTri> = mesh
        .faces
        .par_iter()
        .filter_map(|face| {
            let mut sx = [0.0; 3];
            let mut sy = [0.0; 3];
            let mut depth = [0.0; 3];
            for k in 0..3 {
                let (x, y, z) = projected[face.positions[k] as usize];
                if !x.is_finite() || !y.is_finite() || z < camera.near || z > camera.far {
                    return None;
                }
                sx[k] = x;
                sy[k] = y;
                depth[k] = z;
            }

            let min_x = sx[0].min(sx[1]).min(sx[2]);
            let max_x = sx[0].max(sx[1]).max(sx[2]);
            let min_y = sy[0].min(sy[1]).min(sy[2]);
            let max_y = sy[0].max(sy[1]).max(sy[2]);
            if max_x < 0.0 || min_x >= sw || max_y < 0.0 || min_y >= sh {
                return None;
            }

            let material = &mesh.materials[face.material as usize];
            let mut rgb = [[0.0; 3]; 3];
            for k in 0..3 {
                let intensity = intensities
                    .get(face.normals[k] as usize)
                    .copied()
                    .unwrap_or(1.0);
                for c in 0..3 {
                    rgb[k][c] = material.diffuse[c] as f32 * intensity;
                }
            }

            Some(ProjectedTri {
                sx,
                sy,
                depth,
                rgb,
                alpha: clamp_u8(material.dissolve * 255.0),
            })
        })
        .collect();

    if tris.is_empty() {
        return;
    }

    let num_bands = rayon::current_num_threads();
    let band_height = height.div_ceil(num_bands);
    let actual_bands = height.div_ceil(band_height);

    // Phase 1: bin triangle indices into every horizontal band their
    // bounding box overlaps, so bands never contend.
    let mut bins: Vec<Vec<usize>> = vec![Vec::new(); actual_bands];
    for (ti, tri) in tris.iter().enumerate() {
        let min_y = tri.sy[0].min(tri.sy[1]).min(tri.sy[2]).floor().max(0.0) as usize;
        let max_y = tri.sy[0]
            .max(tri.sy[1])
            .max(tri.sy[2])
            .ceil()
            .min(height.saturating_sub(1) as f32) as usize;
        let band_start = min_y / band_height;
        let band_end = (max_y / band_height).min(actual_bands - 1);
        for bin in &mut bins[band_start..=band_end] {
            bin.push(ti);
        }
    }

    // Phase 2: parallel scan conversion, one band per task.
    let pixel_chunks: Vec<&mut [[u8; 4]]> =
        raster.pixels.chunks_mut(band_height * width).collect();
    let depth_chunks: Vec<&mut [f32]> = raster.depth.chunks_mut(band_height * width).collect();

    pixel_chunks
        .into_par_iter()
        .zip(depth_chunks.into_par_iter())
        .zip(bins.par_iter())
        .enumerate()
        .for_each(|(band_idx, ((pixel_band, depth_band), bin))| {
            let y_start = band_idx * band_height;
            let band_rows = pixel_band.len() / width;
            let y_end = y_start + band_rows;

            for &ti in bin {
                let tri = &tris[ti];
                fill_triangle(tri, width, y_start, y_end, pixel_band, depth_band);
            }
        });
}

fn edge(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> f32 {
    (bx - ax) * (py - ay) - (by - ay) * (px - ax)
}

fn fill_triangle(
    tri: &ProjectedTri,
    width: usize,
    y_start: usize,
    y_end: usize,
    pixel_band: &mut [[u8; 4]],
    depth_band: &mut [f32],
) {
    let area = edge(tri.sx[0], tri.sy[0], tri.sx[1], tri.sy[1], tri.sx[2], tri.sy[2]);
    if area.abs() < 1e-6 {
        return;
    }
    let inv_area = 1.0 / area;

    let min_x = tri.sx[0].min(tri.sx[1]).min(tri.sx[2]).floor().max(0.0) as usize;
    let max_x = tri.sx[0]
        .max(tri.sx[1])
        .max(tri.sx[2])
        .ceil()
        .min((width.saturating_sub(1)) as f32) as usize;
    let min_y = tri.sy[0]
        .min(tri.sy[1])
        .min(tri.sy[2])
        .floor()
        .max(y_start as f32) as usize;
    let max_y = tri.sy[0]
        .max(tri.sy[1])
        .max(tri.sy[2])
        .ceil()
        .min((y_end - 1) as f32) as usize;
    if min_x > max_x || min_y > max_y {
        return;
    }

    for y in min_y..=max_y {
        let py = y as f32 + 0.5;
        let row = (y - y_start) * width;
        for x in min_x..=max_x {
            let px = x as f32 + 0.5;
            // Barycentric weights, sign-normalized by the full area so the
            // inside test works for either winding.
            let b0 = edge(tri.sx[1], tri.sy[1], tri.sx[2], tri.sy[2], px, py) * inv_area;
            let b1 = edge(tri.sx[2], tri.sy[2], tri.sx[0], tri.sy[0], px, py) * inv_area;
            let b2 = edge(tri.sx[0], tri.sy[0], tri.sx[1], tri.sy[1], px, py) * inv_area;
            if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                continue;
            }

            let depth = b0 * tri.depth[0] + b1 * tri.depth[1] + b2 * tri.depth[2];
            let idx = row + x;
            if depth >= depth_band[idx] {
                continue;
            }
            depth_band[idx] = depth;
            pixel_band[idx] = [
                clamp_u8(b0 * tri.rgb[0][0] + b1 * tri.rgb[1][0] + b2 * tri.rgb[2][0]),
                clamp_u8(b0 * tri.rgb[0][1] + b1 * tri.rgb[1][1] + b2 * tri.rgb[2][1]),
                clamp_u8(b0 * tri.rgb[0][2] + b1 * tri.rgb[1][2] + b2 * tri.rgb[2][2]),
                tri.alpha,
            ];
        }
    }
}

// --- Wireframe ---

fn rasterize_wireframe(scene: &Scene, mesh: &Mesh, rotation: Vec3, raster: &mut RasterState) {
    let width = raster.width;
    let height = raster.height;
    let projected = project_positions(mesh, rotation, &scene.camera, width, height);

    for (edge_idx, edge) in mesh.edges.iter().enumerate() {
        let (x0, y0, z0) = projected[edge[0] as usize];
        let (x1, y1, z1) = projected[edge[1] as usize];
        if !x0.is_finite() || !x1.is_finite() || z0 < scene.camera.near || z1 < scene.camera.near {
            continue;
        }
        // Edges cycle through the material palette, one color per edge.
        let color = mesh.materials[edge_idx % mesh.materials.len()].diffuse;
        draw_line(raster, x0, y0, x1, y1, (z0 + z1) * 0.5, color);
    }
}

/// Bresenham with a midpoint depth test; out-of-bounds steps are skipped.
fn draw_line(raster: &mut RasterState, x0: f32, y0: f32, x1: f32, y1: f32, z: f32, color: [u8; 3]) {
    let mut x0 = x0.floor() as i64;
    let mut y0 = y0.floor() as i64;
    let x1 = x1.floor() as i64;
    let y1 = y1.floor() as i64;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        if x0 >= 0 && (x0 as usize) < raster.width && y0 >= 0 && (y0 as usize) < raster.height {
            let idx = y0 as usize * raster.width + x0 as usize;
            if z < raster.depth[idx] {
                raster.depth[idx] = z;
                raster.pixels[idx] = [color[0], color[1], color[2], 255];
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}
