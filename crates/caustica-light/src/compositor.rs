//! Turns light hits into a raster: accumulate brightness per texel, then
//! apply the block-overwrite box blur.

use image::{Rgba, RgbaImage};

use crate::error::LightError;
use crate::simulator::LightHit;

/// Channel value every texel starts at.
pub const BASE_INTENSITY: f32 = 0.1;

/// Brightness added per light hit, saturating at 1.0.
pub const HIT_INTENSITY: f32 = 0.1;

/// A square RGBA raster with float channels, stored row-major.
///
/// Texel `(x, y)` counts rows up from the bottom edge of the final image.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    resolution: u32,
    pixels: Vec<[f32; 4]>,
}

impl Raster {
    /// Create a raster with every texel set to `color`.
    pub fn filled(resolution: u32, color: [f32; 4]) -> Self {
        Self {
            resolution,
            pixels: vec![color; resolution as usize * resolution as usize],
        }
    }

    /// Width and height in texels.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.resolution, self.resolution)
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// # Panics
    ///
    /// Panics if `x` or `y` is outside the raster.
    pub fn get(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[self.offset(x, y)]
    }

    /// # Panics
    ///
    /// Panics if `x` or `y` is outside the raster.
    pub fn set(&mut self, x: u32, y: u32, color: [f32; 4]) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.resolution && y < self.resolution,
            "texel ({x}, {y}) outside {0}x{0} raster",
            self.resolution
        );
        y as usize * self.resolution as usize + x as usize
    }

    /// Quantize to 8-bit RGBA, flipping rows so texel row 0 is the bottom
    /// image row.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let top = self.resolution.saturating_sub(1);
        RgbaImage::from_fn(self.resolution, self.resolution, |x, row| {
            let texel = self.get(x, top - row);
            Rgba(texel.map(quantize))
        })
    }
}

fn quantize(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Fill a base-colored raster and brighten the texel of every hit.
///
/// Each hit reads the texel's current red channel and writes
/// `min(1, red + HIT_INTENSITY)` to the three color channels, so a texel hit
/// `n` times ends at `min(1, BASE_INTENSITY + n * HIT_INTENSITY)` whatever the
/// hit order.
///
/// # Panics
///
/// Panics if a hit lies outside the raster.
pub fn accumulate(resolution: u32, hits: &[LightHit]) -> Raster {
    let mut raster = Raster::filled(
        resolution,
        [BASE_INTENSITY, BASE_INTENSITY, BASE_INTENSITY, 1.0],
    );
    for hit in hits {
        let [current, ..] = raster.get(hit.x, hit.y);
        let intensity = (current + HIT_INTENSITY).clamp(0.0, 1.0);
        raster.set(hit.x, hit.y, [intensity, intensity, intensity, 1.0]);
    }
    raster
}

/// Block-overwrite box blur.
///
/// Anchors are visited x-major, y-minor. Each anchor averages the input over
/// the window `[x, x + size) x [y, y + size)` (clipped to the raster) and
/// overwrites that whole window of the output with the average. Later
/// anchors overwrite earlier ones, so `size == 1` is the identity.
pub fn block_overwrite_blur(source: &Raster, size: u32) -> Raster {
    let resolution = source.resolution;
    let mut blurred = source.clone();

    for xx in 0..resolution {
        let x_end = xx.saturating_add(size).min(resolution);
        for yy in 0..resolution {
            let y_end = yy.saturating_add(size).min(resolution);

            let mut sum = [0.0_f32; 4];
            let mut count = 0_u32;
            for x in xx..x_end {
                for y in yy..y_end {
                    let pixel = source.get(x, y);
                    for (total, channel) in sum.iter_mut().zip(pixel) {
                        *total += channel;
                    }
                    count += 1;
                }
            }
            let average = sum.map(|total| total / count as f32);

            for x in xx..x_end {
                for y in yy..y_end {
                    blurred.set(x, y, average);
                }
            }
        }
    }

    blurred
}

/// Accumulate `hits` into an `resolution x resolution` raster and blur it.
///
/// # Errors
///
/// Returns [`LightError`] for a zero resolution or blur size.
pub fn composite(resolution: u32, hits: &[LightHit], blur_size: u32) -> Result<Raster, LightError> {
    if resolution == 0 {
        return Err(LightError::InvalidResolution);
    }
    if blur_size == 0 {
        return Err(LightError::InvalidBlurSize);
    }
    let base = accumulate(resolution, hits);
    Ok(block_overwrite_blur(&base, blur_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, seq::SliceRandom};
    use rand_chacha::ChaCha8Rng;

    const EPSILON: f32 = 1e-5;

    fn random_raster(resolution: u32, seed: u64) -> Raster {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut raster = Raster::filled(resolution, [0.0; 4]);
        for x in 0..resolution {
            for y in 0..resolution {
                let v: f32 = rng.random();
                raster.set(x, y, [v, v * 0.5, 1.0 - v, rng.random()]);
            }
        }
        raster
    }

    /// Each output texel is the average of the window anchored at itself:
    /// it is the last anchor in scan order whose window covers it.
    fn forward_window_average(source: &Raster, size: u32) -> Raster {
        let resolution = source.resolution();
        let mut out = source.clone();
        for px in 0..resolution {
            for py in 0..resolution {
                let mut sum = [0.0_f32; 4];
                let mut count = 0.0;
                for x in px..(px + size).min(resolution) {
                    for y in py..(py + size).min(resolution) {
                        for (total, channel) in sum.iter_mut().zip(source.get(x, y)) {
                            *total += channel;
                        }
                        count += 1.0;
                    }
                }
                out.set(px, py, sum.map(|total| total / count));
            }
        }
        out
    }

    #[test]
    fn test_base_color() {
        let raster = accumulate(8, &[]);
        assert_eq!(raster.dimensions(), (8, 8));
        assert!(raster.pixels().iter().all(|&p| p == [0.1, 0.1, 0.1, 1.0]));
    }

    #[test]
    fn test_hits_saturate_at_one() {
        for n in 0..15_u32 {
            let hits = vec![LightHit { x: 2, y: 1 }; n as usize];
            let raster = accumulate(4, &hits);
            let expected = (BASE_INTENSITY + n as f32 * HIT_INTENSITY).min(1.0);
            let [r, g, b, a] = raster.get(2, 1);
            assert!((r - expected).abs() < EPSILON, "{n} hits gave {r}, want {expected}");
            assert_eq!(r, g);
            assert_eq!(r, b);
            assert_eq!(a, 1.0);
            assert_eq!(raster.get(0, 0)[0], BASE_INTENSITY);
        }
    }

    #[test]
    fn test_hit_order_does_not_matter() {
        let mut hits: Vec<LightHit> = (0..60)
            .map(|i| LightHit {
                x: i % 3,
                y: (i / 3) % 4,
            })
            .collect();
        let reference = accumulate(4, &hits);
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        for _ in 0..5 {
            hits.shuffle(&mut rng);
            assert_eq!(accumulate(4, &hits), reference);
        }
    }

    #[test]
    fn test_blur_size_one_is_identity() {
        let raster = random_raster(9, 3);
        assert_eq!(block_overwrite_blur(&raster, 1), raster);
    }

    #[test]
    fn test_blur_matches_forward_window_average() {
        for (resolution, size, seed) in [(7, 2, 1), (8, 3, 2), (5, 5, 3), (6, 9, 4), (10, 4, 5)] {
            let raster = random_raster(resolution, seed);
            let literal = block_overwrite_blur(&raster, size);
            let closed = forward_window_average(&raster, size);
            for (a, b) in literal.pixels().iter().zip(closed.pixels()) {
                for c in 0..4 {
                    assert!((a[c] - b[c]).abs() < EPSILON, "size {size}: {a:?} vs {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_blur_edges_use_truncated_windows() {
        let mut raster = Raster::filled(4, [0.0, 0.0, 0.0, 1.0]);
        raster.set(3, 3, [1.0, 1.0, 1.0, 1.0]);
        let blurred = block_overwrite_blur(&raster, 2);
        // Corner window is a single texel.
        assert_eq!(blurred.get(3, 3), [1.0, 1.0, 1.0, 1.0]);
        // Edge windows hold two texels, interior windows four.
        assert!((blurred.get(3, 2)[0] - 0.5).abs() < EPSILON);
        assert!((blurred.get(2, 3)[0] - 0.5).abs() < EPSILON);
        assert!((blurred.get(2, 2)[0] - 0.25).abs() < EPSILON);
        // Windows only reach forward.
        assert_eq!(blurred.get(1, 1)[0], 0.0);
    }

    #[test]
    fn test_composite_dimensions_without_hits() {
        let raster = composite(16, &[], 5).unwrap();
        assert_eq!(raster.dimensions(), (16, 16));
        for p in raster.pixels() {
            assert!((p[0] - BASE_INTENSITY).abs() < EPSILON);
            assert!((p[3] - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_composite_rejects_degenerate_sizes() {
        assert_eq!(composite(0, &[], 5), Err(LightError::InvalidResolution));
        assert_eq!(composite(4, &[], 0), Err(LightError::InvalidBlurSize));
    }

    #[test]
    fn test_rgba_image_flips_rows() {
        let mut raster = Raster::filled(3, [0.0, 0.0, 0.0, 1.0]);
        raster.set(1, 0, [1.0, 0.5, 0.1, 1.0]);
        let image = raster.to_rgba_image();
        assert_eq!(image.dimensions(), (3, 3));
        assert_eq!(image.get_pixel(1, 2), &Rgba([255, 128, 26, 255]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([0, 0, 0, 255]));
    }
}
