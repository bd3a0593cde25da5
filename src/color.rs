//! Colours and the fixed palette.
//!
//! Shapes carry an opaque [`Rgb`] triple; transparency is decided per frame by
//! the fade-in and attached at draw time as an [`Rgba`] with an alpha in the
//! `0..=255` range.

use serde::{Deserialize, Serialize};

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Attach a fade alpha (`0.0..=255.0`, the same range the fill uses).
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            r: self.r as f32,
            g: self.g as f32,
            b: self.b as f32,
            a: alpha,
        }
    }

    /// Normalised `[r, g, b]` in `0.0..=1.0`.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// A fill colour with every channel in `0.0..=255.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Alpha rounded to the nearest 8-bit value.
    pub fn alpha_u8(&self) -> u8 {
        self.a.round().clamp(0.0, 255.0) as u8
    }

    /// Normalised `[r, g, b, a]` in `0.0..=1.0`, ready for a uniform.
    pub fn to_unit(self) -> [f32; 4] {
        [
            self.r / 255.0,
            self.g / 255.0,
            self.b / 255.0,
            (self.a / 255.0).clamp(0.0, 1.0),
        ]
    }
}

/// The sketch palette.
pub mod palette {
    use super::Rgb;

    pub const BACKGROUND: Rgb = Rgb::new(0xF1, 0xF2, 0xED);
    pub const RED: Rgb = Rgb::new(0xA0, 0x32, 0x25);
    pub const BLUE: Rgb = Rgb::new(0x48, 0x6F, 0xBE);
    pub const GREY: Rgb = Rgb::new(0xD8, 0xD6, 0xC7);
    pub const YELLOW: Rgb = Rgb::new(0xEB, 0xD4, 0x2B);
    pub const LINE: Rgb = Rgb::new(0x60, 0x60, 0x60);

    /// Colours a scattered box may be painted with.
    pub const BOX_COLORS: [Rgb; 4] = [RED, BLUE, GREY, YELLOW];
}
