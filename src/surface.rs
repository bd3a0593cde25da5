//! The draw-call boundary between the animation and whatever rasterizes it.
//!
//! Shapes never touch the GPU directly. They issue immediate-mode calls
//! against a [`RenderSurface`] (translate, fill, box) inside a saved/restored
//! state scope, much like a canvas API. The [`DisplayList`](crate::display_list::DisplayList)
//! implementation turns those calls into world-space box draws for the
//! renderer.

use glam::Vec3;

use crate::color::{Rgb, Rgba};

/// Immediate-mode drawing target.
pub trait RenderSurface {
    /// Clear the frame to a solid colour.
    fn set_background(&mut self, color: Rgb);

    /// Save the current transform and fill state.
    fn push(&mut self);

    /// Restore the state saved by the matching [`push`](Self::push).
    fn pop(&mut self);

    /// Translate the current transform.
    fn translate(&mut self, offset: Vec3);

    /// Set the fill used by subsequent boxes.
    fn set_fill(&mut self, color: Rgba);

    /// Disable outlines for subsequent boxes.
    fn no_stroke(&mut self);

    /// Draw an axis-aligned box centred on the current origin.
    fn draw_box(&mut self, width: f32, height: f32, depth: f32);
}

/// Run `draw` between a `push` and a `pop`.
///
/// The pop is issued however `draw` returns, so transform and fill changes
/// never leak into the next sibling.
pub fn scoped<S, R>(surface: &mut S, draw: impl FnOnce(&mut S) -> R) -> R
where
    S: RenderSurface + ?Sized,
{
    surface.push();
    let result = draw(surface);
    surface.pop();
    result
}
