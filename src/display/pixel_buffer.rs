use super::DrawSurface;
use crate::color::Rgba;
use crate::gradient::RadialGradient;

// ============================================================================
// Utility Functions
// ============================================================================

/// Source-over blend of a straight-alpha color onto a straight-alpha ABGR pixel.
/// Works for transparent destinations too, so offscreen layers accumulate alpha.
#[inline]
fn blend_over(dest: &mut [u8], r: u8, g: u8, b: u8, a: u8) {
    if a == 0 {
        return;
    }
    if a == 255 {
        write_pixel_rgba(dest, r, g, b, 255);
        return;
    }

    let sa = a as u32;
    let da = dest[0] as u32;
    let inv = 255 - sa;

    // out_a scaled by 255 to keep precision through the division below
    let out_a_255 = sa * 255 + da * inv;
    if out_a_255 == 0 {
        write_pixel_rgba(dest, 0, 0, 0, 0);
        return;
    }

    let channel = |s: u8, d: u8| -> u8 {
        let num = s as u32 * sa * 255 + d as u32 * da * inv;
        ((num + out_a_255 / 2) / out_a_255) as u8
    };

    let out_b = channel(b, dest[1]);
    let out_g = channel(g, dest[2]);
    let out_r = channel(r, dest[3]);
    let out_a = ((out_a_255 + 127) / 255) as u8;

    write_pixel_rgba(dest, out_r, out_g, out_b, out_a);
}

/// Write ABGR pixel with custom alpha (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel_rgba(dest: &mut [u8], r: u8, g: u8, b: u8, a: u8) {
    dest[0] = a; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering.
/// Alpha is straight (not premultiplied); a fresh buffer is fully transparent.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a fully transparent pixel buffer
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the buffer is exactly `width` x `height`
    #[inline]
    pub fn has_size(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }

    /// Change dimensions. Contents are discarded (transparent).
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize((width as usize) * (height as usize) * 4, 0);
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    /// Clip a rectangle to the buffer. Returns (x0, y0, x1, y1), exclusive end.
    fn clip_rect(&self, x: i32, y: i32, w: u32, h: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + w as i64).min(self.width as i64);
        let y1 = (y as i64 + h as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Clear to a solid color with custom alpha
    pub fn clear_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            write_pixel_rgba(chunk, r, g, b, a);
        }
    }

    /// Set a single pixel with custom alpha (bounds checked, no blending)
    #[inline]
    pub fn set_pixel_rgba(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel_rgba(&mut self.pixels[idx..idx + 4], r, g, b, a);
        }
    }

    /// Read all 4 channels of a pixel (bounds checked)
    /// Returns (r, g, b, a) or None if out of bounds
    #[inline]
    pub fn get_pixel_rgba(&self, x: i32, y: i32) -> Option<(u8, u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
                self.pixels[idx],     // A
            ))
        } else {
            None
        }
    }

    /// Source-over blend a single pixel (bounds checked)
    #[inline]
    pub fn blend_pixel_rgba(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            blend_over(&mut self.pixels[idx..idx + 4], r, g, b, a);
        }
    }

    /// True when every pixel has zero alpha
    pub fn is_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[0] == 0)
    }

    /// Number of pixels with non-zero alpha
    pub fn coverage(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[0] != 0).count()
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// Reset a rectangle to transparent black
    pub fn clear_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        let Some((x0, y0, x1, y1)) = self.clip_rect(x, y, w, h) else {
            return;
        };
        for row in y0..y1 {
            let start = self.pixel_index(x0, row);
            let end = self.pixel_index(x1 - 1, row) + 4;
            self.pixels[start..end].fill(0);
        }
    }

    /// Fill a rectangle, blending the color over what is there
    pub fn fill_rect_rgba(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba) {
        let a = color.alpha_u8();
        if a == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip_rect(x, y, w, h) else {
            return;
        };
        for row in y0..y1 {
            let mut idx = self.pixel_index(x0, row);
            for _ in x0..x1 {
                blend_over(&mut self.pixels[idx..idx + 4], color.r, color.g, color.b, a);
                idx += 4;
            }
        }
    }

    /// Fill a disc with a radial gradient, blending source-over.
    /// A pixel is covered when its center lies inside the circle; its color
    /// is the gradient sampled at that center.
    pub fn fill_circle_radial(&mut self, cx: f32, cy: f32, radius: f32, gradient: &RadialGradient) {
        if radius.is_nan() || radius <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let r_sq = radius * radius;

        let y_start = ((cy - radius).floor() as i32).max(0);
        let y_end = ((cy + radius).ceil() as i32).min(self.height as i32 - 1);
        let x_start = ((cx - radius).floor() as i32).max(0);
        let x_end = ((cx + radius).ceil() as i32).min(self.width as i32 - 1);

        for y in y_start..=y_end {
            let py = y as f32 + 0.5;
            let dy = py - cy;
            let dy_sq = dy * dy;
            for x in x_start..=x_end {
                let px = x as f32 + 0.5;
                let dx = px - cx;
                if dx * dx + dy_sq > r_sq {
                    continue;
                }

                let c = gradient.sample(px, py);
                let a = c.alpha_u8();
                if a == 0 {
                    continue;
                }
                let idx = self.pixel_index(x as u32, y as u32);
                blend_over(&mut self.pixels[idx..idx + 4], c.r, c.g, c.b, a);
            }
        }
    }

    // ========================================================================
    // Buffer Operations
    // ========================================================================

    /// Composite a source buffer onto this one at (dst_x, dst_y) using
    /// per-pixel source alpha (source-over). Pixel for pixel, no scaling.
    /// Skips fully transparent pixels; fast-copies fully opaque ones.
    pub fn composite(&mut self, src: &PixelBuffer, dst_x: i32, dst_y: i32) {
        let src_w = src.width() as i32;
        let src_h = src.height() as i32;
        let dst_w = self.width as i32;
        let dst_h = self.height as i32;

        for sy in 0..src_h {
            let dy = dst_y + sy;
            if dy < 0 || dy >= dst_h {
                continue;
            }

            for sx in 0..src_w {
                let dx = dst_x + sx;
                if dx < 0 || dx >= dst_w {
                    continue;
                }

                let si = src.pixel_index(sx as u32, sy as u32);
                let sa = src.pixels[si]; // alpha channel (ABGR[0])
                if sa == 0 {
                    continue;
                }

                let sr = src.pixels[si + 3];
                let sg = src.pixels[si + 2];
                let sb = src.pixels[si + 1];

                let di = self.pixel_index(dx as u32, dy as u32);
                blend_over(&mut self.pixels[di..di + 4], sr, sg, sb, sa);
            }
        }
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl DrawSurface for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear_region(&mut self, x: i32, y: i32, w: u32, h: u32) {
        self.clear_rect(x, y, w, h);
    }

    fn fill_region(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba) {
        self.fill_rect_rgba(x, y, w, h, color);
    }

    fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, gradient: &RadialGradient) {
        self.fill_circle_radial(cx, cy, radius, gradient);
    }

    fn blit_image(&mut self, image: &PixelBuffer, x: i32, y: i32) {
        self.composite(image, x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_transparent() {
        let buf = PixelBuffer::with_size(4, 3);
        assert_eq!(buf.as_bytes().len(), 4 * 3 * 4);
        assert!(buf.is_transparent());
        assert_eq!(buf.get_pixel_rgba(4, 0), None);
    }

    #[test]
    fn test_blend_onto_transparent_keeps_source() {
        let mut buf = PixelBuffer::with_size(1, 1);
        buf.blend_pixel_rgba(0, 0, 200, 100, 50, 128);
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((200, 100, 50, 128)));
    }

    #[test]
    fn test_blend_accumulates_alpha() {
        let mut buf = PixelBuffer::with_size(1, 1);
        buf.blend_pixel_rgba(0, 0, 255, 255, 255, 128);
        buf.blend_pixel_rgba(0, 0, 255, 255, 255, 128);
        let (r, _, _, a) = buf.get_pixel_rgba(0, 0).unwrap();
        assert_eq!(r, 255);
        // 128 + 128 * 127 / 255 ~= 192
        assert!((191..=193).contains(&a), "alpha was {}", a);
    }

    #[test]
    fn test_blend_over_opaque_mixes_colors() {
        let mut buf = PixelBuffer::with_size(1, 1);
        buf.set_pixel_rgba(0, 0, 0, 0, 0, 255);
        buf.blend_pixel_rgba(0, 0, 255, 255, 255, 51);
        let (r, g, b, a) = buf.get_pixel_rgba(0, 0).unwrap();
        assert_eq!(a, 255);
        assert_eq!((r, g, b), (51, 51, 51));
    }

    #[test]
    fn test_clear_rect_clips() {
        let mut buf = PixelBuffer::with_size(4, 4);
        buf.clear_rgba(10, 20, 30, 255);
        buf.clear_rect(-2, -2, 4, 4);
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((0, 0, 0, 0)));
        assert_eq!(buf.get_pixel_rgba(1, 1), Some((0, 0, 0, 0)));
        assert_eq!(buf.get_pixel_rgba(2, 2), Some((10, 20, 30, 255)));
        buf.clear_rect(10, 10, 5, 5);
        assert_eq!(buf.get_pixel_rgba(3, 3), Some((10, 20, 30, 255)));
    }

    #[test]
    fn test_fill_rect_transparent_is_noop() {
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.fill_rect_rgba(0, 0, 2, 2, Rgba::TRANSPARENT);
        assert!(buf.is_transparent());
        buf.fill_rect_rgba(0, 0, 2, 2, Rgba::SKY_BLUE);
        assert_eq!(buf.get_pixel_rgba(1, 1), Some((135, 206, 235, 255)));
    }

    #[test]
    fn test_fill_circle_radial_stays_inside_radius() {
        let mut buf = PixelBuffer::with_size(21, 21);
        let g = RadialGradient::concentric(10.5, 10.5, 0.0, 5.0)
            .with_stop(0.0, Rgba::WHITE)
            .with_stop(1.0, Rgba::WHITE.with_alpha(0.0));
        buf.fill_circle_radial(10.5, 10.5, 5.0, &g);

        let (_, _, _, center) = buf.get_pixel_rgba(10, 10).unwrap();
        assert_eq!(center, 255);
        for y in 0..21 {
            for x in 0..21 {
                let dx = x as f32 + 0.5 - 10.5;
                let dy = y as f32 + 0.5 - 10.5;
                let (_, _, _, a) = buf.get_pixel_rgba(x, y).unwrap();
                if dx * dx + dy * dy > 25.0 {
                    assert_eq!(a, 0, "pixel ({}, {}) outside disc was painted", x, y);
                }
            }
        }
    }

    #[test]
    fn test_composite_offsets_and_clips() {
        let mut src = PixelBuffer::with_size(2, 2);
        src.set_pixel_rgba(0, 0, 1, 2, 3, 255);
        src.set_pixel_rgba(1, 1, 4, 5, 6, 255);

        let mut dst = PixelBuffer::with_size(3, 3);
        dst.composite(&src, 2, -1);
        // (0,0) lands off the top edge; (1,1) lands at (3,0), off the right edge
        assert!(dst.is_transparent());

        dst.composite(&src, 1, 1);
        assert_eq!(dst.get_pixel_rgba(1, 1), Some((1, 2, 3, 255)));
        assert_eq!(dst.get_pixel_rgba(2, 2), Some((4, 5, 6, 255)));
        assert_eq!(dst.get_pixel_rgba(2, 1), Some((0, 0, 0, 0)));
    }

    #[test]
    fn test_has_size_tracks_resize() {
        let mut buf = PixelBuffer::with_size(8, 6);
        assert!(buf.has_size(8, 6));
        assert!(!buf.has_size(6, 8));
        buf.resize(4, 4);
        assert!(buf.has_size(4, 4));
        assert!(!buf.has_size(8, 6));
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.clear_rgba(1, 1, 1, 255);
        buf.resize(3, 1);
        assert_eq!((buf.width(), buf.height()), (3, 1));
        assert!(buf.is_transparent());
    }
}
