//! Two-circle radial gradients
//!
//! Same geometry as a canvas radial gradient: the gradient parameter `t` at a
//! point is the largest `t` for which the point lies on the circle
//! interpolated between the start circle (t = 0) and the end circle (t = 1),
//! with a non-negative radius. Outside [0, 1] the end stops are padded.

use crate::color::Rgba;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    x0: f32,
    y0: f32,
    r0: f32,
    x1: f32,
    y1: f32,
    r1: f32,
    stops: Vec<ColorStop>,
}

impl RadialGradient {
    pub fn new(x0: f32, y0: f32, r0: f32, x1: f32, y1: f32, r1: f32) -> Self {
        Self {
            x0,
            y0,
            r0,
            x1,
            y1,
            r1,
            stops: Vec::with_capacity(2),
        }
    }

    /// Gradient between two concentric circles
    pub fn concentric(cx: f32, cy: f32, r0: f32, r1: f32) -> Self {
        Self::new(cx, cy, r0, cx, cy, r1)
    }

    /// Add a color stop. Offsets are clamped to [0, 1]; stops at equal
    /// offsets keep insertion order.
    pub fn add_stop(&mut self, offset: f32, color: Rgba) {
        let offset = offset.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
    }

    pub fn with_stop(mut self, offset: f32, color: Rgba) -> Self {
        self.add_stop(offset, color);
        self
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Gradient parameter for a point, or None where the gradient paints nothing
    pub fn parameter(&self, x: f32, y: f32) -> Option<f32> {
        let cdx = self.x1 - self.x0;
        let cdy = self.y1 - self.y0;
        let dr = self.r1 - self.r0;
        let px = x - self.x0;
        let py = y - self.y0;

        // |p - t*cd|^2 = (r0 + t*dr)^2  =>  a t^2 - 2 b t + c = 0
        let a = cdx * cdx + cdy * cdy - dr * dr;
        let b = px * cdx + py * cdy + self.r0 * dr;
        let c = px * px + py * py - self.r0 * self.r0;

        let radius_ok = |t: f32| self.r0 + t * dr >= 0.0;

        if a.abs() < f32::EPSILON {
            if b.abs() < f32::EPSILON {
                return None;
            }
            let t = c / (2.0 * b);
            return radius_ok(t).then_some(t);
        }

        let disc = b * b - a * c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let (hi, lo) = {
            let t1 = (b + root) / a;
            let t2 = (b - root) / a;
            if t1 >= t2 {
                (t1, t2)
            } else {
                (t2, t1)
            }
        };

        if radius_ok(hi) {
            Some(hi)
        } else if radius_ok(lo) {
            Some(lo)
        } else {
            None
        }
    }

    /// Color at gradient parameter `t`, interpolated in premultiplied space
    pub fn color_at(&self, t: f32) -> Rgba {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Rgba::TRANSPARENT,
        };

        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }

        let upper = self.stops.partition_point(|s| s.offset <= t);
        let lo = self.stops[upper - 1];
        let hi = self.stops[upper];
        let span = hi.offset - lo.offset;
        if span <= 0.0 {
            return hi.color;
        }
        lerp_premultiplied(lo.color, hi.color, (t - lo.offset) / span)
    }

    /// Color of the gradient at a point
    #[inline]
    pub fn sample(&self, x: f32, y: f32) -> Rgba {
        self.parameter(x, y).map_or(Rgba::TRANSPARENT, |t| self.color_at(t))
    }
}

fn lerp_premultiplied(c0: Rgba, c1: Rgba, t: f32) -> Rgba {
    let a0 = c0.a.clamp(0.0, 1.0);
    let a1 = c1.a.clamp(0.0, 1.0);
    let a = a0 + (a1 - a0) * t;
    if a <= 0.0 {
        return Rgba::new(c0.r, c0.g, c0.b, 0.0);
    }

    let channel = |v0: u8, v1: u8| {
        let p0 = f32::from(v0) * a0;
        let p1 = f32::from(v1) * a1;
        ((p0 + (p1 - p0) * t) / a).round().clamp(0.0, 255.0) as u8
    };

    Rgba::new(channel(c0.r, c1.r), channel(c0.g, c1.g), channel(c0.b, c1.b), a)
}
