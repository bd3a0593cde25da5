//! Renderable primitives with a delayed fade-in.
//!
//! Plates, support lines and scattered boxes are all boxes underneath; they
//! only differ in how their logical anchor maps onto the box centre and in
//! which extents they pass to the surface. [`ShapeKind`] captures that
//! difference so the delay gate and the fade live in one place.

use glam::Vec3;

use crate::color::Rgb;
use crate::surface::{scoped, RenderSurface};

/// Milliseconds a shape takes to fade from transparent to opaque.
pub const FADE_DURATION_MS: f32 = 1000.0;

/// Largest alpha value, fully opaque.
pub const MAX_ALPHA: f32 = 255.0;

/// Re-map `value` from one range onto another, without clamping.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

/// Fade-in alpha for a shape at group-local time `t`.
///
/// Linear over the first [`FADE_DURATION_MS`] after `delay`, held at
/// [`MAX_ALPHA`] afterwards and never below zero.
pub fn fade_alpha(t: f32, delay: f32) -> f32 {
    map_range(t - delay, 0.0, FADE_DURATION_MS, 0.0, MAX_ALPHA).clamp(0.0, MAX_ALPHA)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Flat box centred on its position.
    Plate,
    /// Thin column whose base sits on its position and which grows along -z.
    VerticalLine,
}

/// Box dimensions. For a vertical line `width` is the square cross-section,
/// `height` the length and `depth` is unused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    position: Vec3,
    extent: Extent,
    color: Rgb,
    delay: f32,
}

impl Shape {
    pub fn plate(position: Vec3, width: f32, height: f32, depth: f32, color: Rgb, delay: f32) -> Self {
        Self {
            kind: ShapeKind::Plate,
            position,
            extent: Extent { width, height, depth },
            color,
            delay,
        }
    }

    pub fn vertical_line(base: Vec3, height: f32, width: f32, color: Rgb, delay: f32) -> Self {
        Self {
            kind: ShapeKind::VerticalLine,
            position: base,
            extent: Extent { width, height, depth: width },
            color,
            delay,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Whether the shape is past its reveal delay at group-local time `t`.
    pub fn is_revealed(&self, t: f32) -> bool {
        t > self.delay
    }

    /// Centre of the drawn box for a given group offset.
    pub fn draw_origin(&self, offset: Vec3) -> Vec3 {
        let anchored = self.position + offset;
        match self.kind {
            ShapeKind::Plate => anchored,
            ShapeKind::VerticalLine => anchored - Vec3::new(0.0, 0.0, self.extent.height / 2.0),
        }
    }

    /// Box extents handed to the surface, as (x, y, z).
    pub fn box_size(&self) -> Vec3 {
        let Extent { width, height, depth } = self.extent;
        match self.kind {
            // Footprint lies on x/y; the plate's thickness runs along z.
            ShapeKind::Plate => Vec3::new(width, depth, height),
            ShapeKind::VerticalLine => Vec3::new(width, width, height),
        }
    }

    /// Draw the shape displaced by `offset` at group-local time `t` (ms).
    ///
    /// Nothing is issued while `t <= delay`.
    pub fn render_with_offset<S>(&self, surface: &mut S, offset: Vec3, t: f32)
    where
        S: RenderSurface + ?Sized,
    {
        if !self.is_revealed(t) {
            return;
        }

        let alpha = fade_alpha(t, self.delay);
        let origin = self.draw_origin(offset);
        let size = self.box_size();

        scoped(surface, |s| {
            s.translate(origin);
            s.set_fill(self.color.with_alpha(alpha));
            s.no_stroke();
            s.draw_box(size.x, size.y, size.z);
        });
    }
}
