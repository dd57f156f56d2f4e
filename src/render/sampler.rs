use rayon::prelude::*;

use super::RasterState;

/// The cols x rows staging grid of averaged RGBA samples, one per character
/// cell. Values stay in [0, 255] as f32 so block averaging keeps precision.
#[derive(Debug, Clone, Default)]
pub struct SampleGrid {
    pub cols: usize,
    pub rows: usize,
    samples: Vec<[f32; 4]>,
}

impl SampleGrid {
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        self.samples.clear();
        self.samples.resize(cols.saturating_mul(rows), [0.0; 4]);
    }

    pub fn get(&self, col: usize, row: usize) -> [f32; 4] {
        self.samples[row * self.cols + col]
    }

    #[cfg(test)]
    pub fn set(&mut self, col: usize, row: usize, sample: [f32; 4]) {
        let cols = self.cols;
        self.samples[row * cols + col] = sample;
    }
}

/// Box-filter the raster down to the grid resolution. Each output sample is
/// the plain average of its source block, so coverage is exact even when the
/// raster does not divide evenly. A zero-sized grid or raster skips the
/// frame entirely.
pub fn downsample(raster: &RasterState, grid: &mut SampleGrid) {
    let cols = grid.cols;
    let rows = grid.rows;
    if cols == 0 || rows == 0 {
        return;
    }
    if raster.width == 0 || raster.height == 0 {
        grid.samples.fill([0.0; 4]);
        return;
    }

    let width = raster.width;
    let height = raster.height;
    let pixels = &raster.pixels;

    grid.samples
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(row, out_row)| {
            let y0 = row * height / rows;
            let y1 = (((row + 1) * height) / rows).max(y0 + 1).min(height);
            for (col, out) in out_row.iter_mut().enumerate() {
                let x0 = col * width / cols;
                let x1 = (((col + 1) * width) / cols).max(x0 + 1).min(width);

                let mut acc = [0.0_f32; 4];
                for y in y0..y1 {
                    let base = y * width;
                    for pixel in &pixels[base + x0..base + x1] {
                        acc[0] += pixel[0] as f32;
                        acc[1] += pixel[1] as f32;
                        acc[2] += pixel[2] as f32;
                        acc[3] += pixel[3] as f32;
                    }
                }
                let count = ((y1 - y0) * (x1 - x0)) as f32;
                *out = [
                    acc[0] / count,
                    acc[1] / count,
                    acc[2] / count,
                    acc[3] / count,
                ];
            }
        });
}
