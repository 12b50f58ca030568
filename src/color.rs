//! Colors with a straight (non-premultiplied) alpha channel

use crate::error::CloudError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGB color with a fractional alpha, as used for cloud tints and sky fills.
///
/// `r`, `g`, `b` are 0-255; `a` is opacity in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque_alpha")]
    pub a: f32,
}

fn opaque_alpha() -> f32 {
    1.0
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0.0);
    pub const WHITE: Self = Self::new(255, 255, 255, 1.0);
    pub const BLACK: Self = Self::new(0, 0, 0, 1.0);
    pub const SKY_BLUE: Self = Self::new(135, 206, 235, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Alpha quantized to a byte, clamped to 0..=255
    #[inline]
    pub fn alpha_u8(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.alpha_u8() == 0
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = CloudError;

    /// Accepts `rgba(r, g, b, a)`, `rgb(r, g, b)`, `#rrggbb`, `#rrggbbaa`
    /// and a handful of names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        let invalid = || CloudError::InvalidColor(s.to_string());

        match text.as_str() {
            "transparent" => return Ok(Self::TRANSPARENT),
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            "skyblue" => return Ok(Self::SKY_BLUE),
            _ => {},
        }

        if let Some(hex) = text.strip_prefix('#') {
            let channel = |i: usize| {
                hex.get(i..i + 2)
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(invalid)
            };
            return match hex.len() {
                6 => Ok(Self::opaque(channel(0)?, channel(2)?, channel(4)?)),
                8 => Ok(Self::new(
                    channel(0)?,
                    channel(2)?,
                    channel(4)?,
                    f32::from(channel(6)?) / 255.0,
                )),
                _ => Err(invalid()),
            };
        }

        let (body, expects_alpha) = if let Some(rest) = text.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = text.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(invalid());
        };
        let body = body.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();

        let expected = if expects_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(invalid());
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
        let a = if expects_alpha {
            parts[3].parse::<f32>().map_err(|_| invalid())?.clamp(0.0, 1.0)
        } else {
            1.0
        };

        Ok(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, a))
    }
}
