//! Cloud sprites and the field that animates them

mod field;
pub mod texture;

pub use field::{CloudField, STUTTER_THRESHOLD_MS};
pub use texture::{generate, CloudTexture};

use crate::color::Rgba;
use crate::display::DrawSurface;
use rand::Rng;

/// A cloud texture placed on a surface, drifting at a fixed speed
#[derive(Debug, Clone)]
pub struct CloudSprite {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    speed: f32,
    color: Rgba,
    texture: CloudTexture,
}

impl CloudSprite {
    /// Center position on the surface
    #[inline]
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Surface units per second along the wind
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn color(&self) -> Rgba {
        self.color
    }

    #[inline]
    pub fn texture(&self) -> &CloudTexture {
        &self.texture
    }

    /// Top-left corner the texture is blitted at, rounded to whole pixels
    pub fn origin(&self) -> (i32, i32) {
        (
            (self.x - self.width / 2.0).round() as i32,
            (self.y - self.height / 2.0).round() as i32,
        )
    }

    /// Blit the texture centered on the sprite position
    pub fn render<S: DrawSurface + ?Sized>(&self, target: &mut S) {
        let (x, y) = self.origin();
        target.blit_image(self.texture.as_buffer(), x, y);
    }

    /// Move by (dx, dy), then wrap around a `surface_w` x `surface_h` surface.
    ///
    /// A sprite is re-entered on the opposite side once it is a full
    /// width (height) past the edge it is moving toward. Only the axis
    /// direction of motion is tested, so a sprite sitting off-screen against
    /// the wind stays put.
    pub(crate) fn drift(&mut self, dx: f32, dy: f32, surface_w: f32, surface_h: f32) {
        self.x += dx;
        if dx > 0.0 && self.x - self.width > surface_w {
            self.x = -self.width;
        } else if dx < 0.0 && self.x + self.width < 0.0 {
            self.x = surface_w + self.width;
        }

        self.y += dy;
        if dy > 0.0 && self.y - self.height > surface_h {
            self.y = -self.height;
        } else if dy < 0.0 && self.y + self.height < 0.0 {
            self.y = surface_h + self.height;
        }
    }
}

/// Generate a cloud centered at (x, y) in a `width` x `height` box.
///
/// `disc_count` soft discs make up the blob; `speed` is only used once the
/// sprite is animated by a `CloudField`.
pub fn create_cloud<R: Rng>(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    disc_count: u32,
    color: Rgba,
    speed: f32,
    rng: &mut R,
) -> CloudSprite {
    CloudSprite {
        x,
        y,
        width,
        height,
        speed,
        color,
        texture: generate(width, height, disc_count, color, rng),
    }
}

/// Draw a cloud once onto any surface
pub fn draw_cloud<S: DrawSurface + ?Sized>(cloud: &CloudSprite, target: &mut S) {
    cloud.render(target);
}
