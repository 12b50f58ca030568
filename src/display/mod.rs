mod pixel_buffer;
#[cfg(feature = "window")]
mod window;

pub use pixel_buffer::PixelBuffer;
#[cfg(feature = "window")]
pub use window::{Display, InputEvent, RenderTarget};

use crate::color::Rgba;
use crate::gradient::RadialGradient;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// What the cloud engine needs from a drawing surface.
///
/// Width and height may change between frames; callers read them fresh
/// before every pass.
pub trait DrawSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Whether anything can be drawn on this surface at all
    fn is_drawable(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    /// Reset a rectangle to fully transparent
    fn clear_region(&mut self, x: i32, y: i32, w: u32, h: u32);

    /// Blend a flat color over a rectangle
    fn fill_region(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba);

    /// Fill a disc, coloring each covered pixel from `gradient`
    fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, gradient: &RadialGradient);

    /// Composite an image with its top-left corner at (x, y), no scaling
    fn blit_image(&mut self, image: &PixelBuffer, x: i32, y: i32);
}
