//! Recording render surface.
//!
//! `DisplayList` resolves the immediate-mode calls issued by shapes into a
//! flat list of world-space box draws that the GPU renderer can upload in one
//! go. It also keeps the raw call log, which makes it a convenient spy in
//! tests.

use glam::{Mat4, Vec3};

use crate::color::{palette, Rgb, Rgba};
use crate::surface::RenderSurface;

/// A raw call received by the display list.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(Rgb),
    Push,
    Pop,
    Translate(Vec3),
    Fill(Rgba),
    NoStroke,
    Box { size: Vec3 },
}

/// A resolved box: where it is, how big, and in which colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDraw {
    /// World transform at the time of the draw.
    pub model: Mat4,
    /// Full extents along x, y and z.
    pub size: Vec3,
    pub color: Rgba,
    pub stroke: bool,
}

impl BoxDraw {
    /// World-space centre of the box.
    pub fn center(&self) -> Vec3 {
        self.model.transform_point3(Vec3::ZERO)
    }

    /// Model matrix with the box extents folded in, for a unit cube mesh.
    pub fn scaled_model(&self) -> Mat4 {
        self.model * Mat4::from_scale(self.size)
    }
}

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Mat4,
    fill: Rgba,
    stroke: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            fill: Rgb::new(255, 255, 255).with_alpha(255.0),
            stroke: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayList {
    background: Rgb,
    current: DrawState,
    stack: Vec<DrawState>,
    boxes: Vec<BoxDraw>,
    commands: Vec<DrawCommand>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayList {
    pub fn new() -> Self {
        Self {
            background: palette::BACKGROUND,
            current: DrawState::default(),
            stack: Vec::new(),
            boxes: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Forget everything recorded so far, keeping allocations for the next frame.
    pub fn clear(&mut self) {
        self.current = DrawState::default();
        self.stack.clear();
        self.boxes.clear();
        self.commands.clear();
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn boxes(&self) -> &[BoxDraw] {
        &self.boxes
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Current nesting depth of `push` calls.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Current translation of the active transform.
    pub fn origin(&self) -> Vec3 {
        self.current.transform.transform_point3(Vec3::ZERO)
    }
}

impl RenderSurface for DisplayList {
    fn set_background(&mut self, color: Rgb) {
        self.background = color;
        self.commands.push(DrawCommand::Background(color));
    }

    fn push(&mut self) {
        self.stack.push(self.current);
        self.commands.push(DrawCommand::Push);
    }

    fn pop(&mut self) {
        match self.stack.pop() {
            Some(state) => self.current = state,
            None => log::warn!("display list pop without matching push"),
        }
        self.commands.push(DrawCommand::Pop);
    }

    fn translate(&mut self, offset: Vec3) {
        self.current.transform *= Mat4::from_translation(offset);
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn set_fill(&mut self, color: Rgba) {
        self.current.fill = color;
        self.commands.push(DrawCommand::Fill(color));
    }

    fn no_stroke(&mut self) {
        self.current.stroke = false;
        self.commands.push(DrawCommand::NoStroke);
    }

    fn draw_box(&mut self, width: f32, height: f32, depth: f32) {
        let size = Vec3::new(width, height, depth);
        self.boxes.push(BoxDraw {
            model: self.current.transform,
            size,
            color: self.current.fill,
            stroke: self.current.stroke,
        });
        self.commands.push(DrawCommand::Box { size });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::scoped;

    #[test]
    fn test_scoped_translate_does_not_leak() {
        let mut list = DisplayList::new();
        scoped(&mut list, |s| {
            s.translate(Vec3::new(10.0, 0.0, 0.0));
            s.draw_box(1.0, 2.0, 3.0);
        });
        list.draw_box(1.0, 1.0, 1.0);

        assert_eq!(list.depth(), 0);
        assert_eq!(list.boxes().len(), 2);
        assert_eq!(list.boxes()[0].center(), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(list.boxes()[1].center(), Vec3::ZERO);
    }

    #[test]
    fn test_nested_translations_accumulate() {
        let mut list = DisplayList::new();
        list.push();
        list.translate(Vec3::new(1.0, 2.0, 3.0));
        list.push();
        list.translate(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(list.origin(), Vec3::new(2.0, 3.0, 4.0));
        list.pop();
        assert_eq!(list.origin(), Vec3::new(1.0, 2.0, 3.0));
        list.pop();
        assert_eq!(list.origin(), Vec3::ZERO);
    }

    #[test]
    fn test_fill_and_stroke_restored_after_pop() {
        let mut list = DisplayList::new();
        list.push();
        list.set_fill(palette::RED.with_alpha(10.0));
        list.no_stroke();
        list.pop();
        list.draw_box(1.0, 1.0, 1.0);

        let drawn = list.boxes()[0];
        assert!(drawn.stroke);
        assert_eq!(drawn.color.a, 255.0);
    }

    #[test]
    fn test_clear_keeps_background() {
        let mut list = DisplayList::new();
        list.set_background(palette::LINE);
        list.draw_box(1.0, 1.0, 1.0);
        list.clear();
        assert!(list.boxes().is_empty());
        assert!(list.commands().is_empty());
        assert_eq!(list.background(), palette::LINE);
    }

    #[test]
    fn test_scaled_model_spans_extents() {
        let mut list = DisplayList::new();
        list.translate(Vec3::new(5.0, 0.0, 0.0));
        list.draw_box(2.0, 4.0, 6.0);
        let corner = list.boxes()[0].scaled_model().transform_point3(Vec3::splat(0.5));
        assert_eq!(corner, Vec3::new(6.0, 2.0, 3.0));
    }
}
