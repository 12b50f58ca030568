//! Procedural cloud textures
//!
//! A cloud is a pile of soft discs: each disc is a radial gradient from the
//! cloud color at the center to fully transparent at the rim, and discs are
//! blended source-over so overlapping cores build up density.

use crate::color::Rgba;
use crate::display::{DrawSurface, PixelBuffer};
use crate::gradient::RadialGradient;
use rand::Rng;
use std::f32::consts::TAU;

/// How far from the box center a disc may be pushed, as a fraction of the half extent
const MAX_OFFSET_SCALE: f32 = 0.75;
/// Disc radius range as a fraction of the space left around its center
const RADIUS_SCALE_MIN: f32 = 0.5;
const RADIUS_SCALE_MAX: f32 = 1.0;

/// A generated cloud raster. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudTexture {
    buffer: PixelBuffer,
}

impl CloudTexture {
    #[inline]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// The raster, for blitting
    #[inline]
    pub fn as_buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[cfg(test)]
    pub(crate) fn from_buffer(buffer: PixelBuffer) -> Self {
        Self { buffer }
    }
}

impl std::fmt::Debug for CloudTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudTexture")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// One disc of a cloud, in texture-local coordinates (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Place a disc inside a box with the given half extents.
///
/// The center is pushed away from the box center along a random direction,
/// by up to 75% of the half extent on each axis. The radius is then capped by
/// the distance left to the nearer edge, axis by axis. That cap is loose for
/// diagonal offsets, so a disc can still graze the box edge.
pub fn place_disc<R: Rng>(rng: &mut R, half_w: f32, half_h: f32) -> Disc {
    let scale = rng.random::<f32>() * MAX_OFFSET_SCALE;
    let direction = rng.random::<f32>() * TAU;

    let offset_x = direction.cos() * scale * half_w;
    let offset_y = direction.sin() * scale * half_h;

    let max_radius = (half_w - offset_x.abs()).min(half_h - offset_y.abs());
    let radius = max_radius * rng.random_range(RADIUS_SCALE_MIN..RADIUS_SCALE_MAX);

    Disc {
        x: half_w + offset_x,
        y: half_h + offset_y,
        radius,
    }
}

/// Paint one faded disc
fn paint_disc<S: DrawSurface + ?Sized>(surface: &mut S, disc: Disc, color: Rgba) {
    let gradient = RadialGradient::concentric(disc.x, disc.y, 0.0, disc.radius)
        .with_stop(0.0, color)
        .with_stop(1.0, color.with_alpha(0.0));
    surface.fill_disc(disc.x, disc.y, disc.radius, &gradient);
}

/// Generate a cloud texture for a `width` x `height` box.
///
/// The raster is the box truncated to whole pixels; disc geometry uses the
/// exact extents. Zero discs gives a fully transparent texture.
pub fn generate<R: Rng>(
    width: f32,
    height: f32,
    disc_count: u32,
    color: Rgba,
    rng: &mut R,
) -> CloudTexture {
    let mut buffer = PixelBuffer::with_size(width.max(0.0) as u32, height.max(0.0) as u32);

    let half_w = width / 2.0;
    let half_h = height / 2.0;

    for _ in 0..disc_count {
        let disc = place_disc(rng, half_w, half_h);
        paint_disc(&mut buffer, disc, color);
    }

    log::debug!(
        "generated {}x{} cloud texture from {} discs ({} pixels covered)",
        buffer.width(),
        buffer.height(),
        disc_count,
        buffer.coverage()
    );

    CloudTexture { buffer }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_texture_has_requested_size() {
        let mut rng = StdRng::seed_from_u64(7);
        for discs in [0, 1, 5, 20] {
            let tex = generate(64.0, 40.0, discs, Rgba::WHITE, &mut rng);
            assert_eq!((tex.width(), tex.height()), (64, 40));
        }
    }

    #[test]
    fn test_fractional_box_truncates() {
        let mut rng = StdRng::seed_from_u64(7);
        let tex = generate(30.9, 12.2, 3, Rgba::WHITE, &mut rng);
        assert_eq!((tex.width(), tex.height()), (30, 12));
    }

    #[test]
    fn test_zero_discs_is_transparent() {
        let mut rng = StdRng::seed_from_u64(1);
        let tex = generate(50.0, 50.0, 0, Rgba::WHITE, &mut rng);
        assert!(tex.as_buffer().is_transparent());
    }

    #[test]
    fn test_discs_paint_the_cloud_color() {
        let mut rng = StdRng::seed_from_u64(3);
        let color = Rgba::new(150, 160, 170, 0.4);
        let tex = generate(80.0, 60.0, 12, color, &mut rng);
        let buf = tex.as_buffer();

        assert!(buf.coverage() > 0);
        for y in 0..60 {
            for x in 0..80 {
                let (r, g, b, a) = buf.get_pixel_rgba(x, y).unwrap();
                if a > 0 {
                    // a single tint blended with itself stays that tint
                    assert!(r.abs_diff(150) <= 1 && g.abs_diff(160) <= 1 && b.abs_diff(170) <= 1);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_texture() {
        let a = generate(40.0, 30.0, 8, Rgba::WHITE, &mut StdRng::seed_from_u64(99));
        let b = generate(40.0, 30.0, 8, Rgba::WHITE, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_place_disc_within_heuristic_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let (half_w, half_h) = (200.0_f32, 90.0_f32);
        for _ in 0..1000 {
            let disc = place_disc(&mut rng, half_w, half_h);
            let off_x = disc.x - half_w;
            let off_y = disc.y - half_h;

            // center stays inside the inner 75% of the box
            assert!(off_x.abs() <= 0.75 * half_w + 1e-3);
            assert!(off_y.abs() <= 0.75 * half_h + 1e-3);

            let max_radius = (half_w - off_x.abs()).min(half_h - off_y.abs());
            assert!(disc.radius >= 0.5 * max_radius - 1e-3);
            assert!(disc.radius < max_radius + 1e-3);
            assert!(disc.radius > 0.0);
        }
    }

    #[test]
    fn test_overlapping_discs_accumulate_alpha() {
        // Many discs over a small box overlap near the center
        let mut rng = StdRng::seed_from_u64(5);
        let tex = generate(40.0, 40.0, 60, Rgba::WHITE.with_alpha(0.2), &mut rng);
        let (_, _, _, a) = tex.as_buffer().get_pixel_rgba(20, 20).unwrap();
        // one disc alone peaks at 0.2 * 255 = 51
        assert!(a > 51, "center alpha {} did not build up", a);
    }
}
