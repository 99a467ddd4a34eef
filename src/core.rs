use crate::error::{PostweaveError, PostweaveResult};

pub use kurbo::{Rect, Vec2};

/// Straight-alpha RGBA color as configured by the caller (hex strings in
/// job files, sliders in a UI). Converted to premultiplied form at the
/// point it touches pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::opaque(0, 0, 0);
    pub const WHITE: Color = Color::opaque(255, 255, 255);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> PostweaveResult<Self> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| PostweaveError::validation(format!("color '{s}' must start with '#'")))?;
        if hex.len() != 6 && hex.len() != 8 {
            return Err(PostweaveError::validation(format!(
                "color '{s}' must be #rrggbb or #rrggbbaa"
            )));
        }

        let byte_at = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| PostweaveError::validation(format!("color '{s}' has non-hex digits")))
        };

        Ok(Self {
            r: byte_at(0)?,
            g: byte_at(2)?,
            b: byte_at(4)?,
            a: if hex.len() == 8 { byte_at(6)? } else { 255 },
        })
    }

    pub fn to_premul(self) -> [u8; 4] {
        crate::composite::premultiply([self.r, self.g, self.b, self.a])
    }
}
