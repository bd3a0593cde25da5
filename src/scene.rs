//! The hand-authored scene and its three-act reveal.
//!
//! Plates come from a fixed table, two support lines are derived from the
//! footprint corners of every plate, and a handful of small boxes are
//! scattered around random lines at construction time. Every frame the wall
//! clock is folded into a 9 second phase; each group that the reveal cycle
//! has unlocked is drawn with its own oscillating offset and its own local
//! time, which feeds the per-shape delay gate.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::color::{palette, Rgb};
use crate::cycle::{phase_of, CyclePolicy, CycleTracker};
use crate::shape::Shape;
use crate::surface::RenderSurface;

/// Delay between consecutive plates (and their lines), in ms.
pub const PLATE_STAGGER_MS: f32 = 300.0;

/// Delay between consecutive scattered boxes, in ms.
pub const BOX_STAGGER_MS: f32 = 150.0;

pub const LINE_HEIGHT: f32 = 300.0;
pub const LINE_WIDTH: f32 = 5.0;

/// Number of scattered boxes in the reference layout.
pub const DEFAULT_BOX_COUNT: usize = 20;

const BOX_SIZE_RANGE: (f32, f32) = (10.0, 30.0);
const BOX_JITTER: f32 = 10.0;
const BOX_Z_RANGE: (f32, f32) = (-300.0, -40.0);

/// Divisor applied to the phase inside the oscillators.
const WOBBLE_RATE_MS: f32 = 300.0;

/// One entry of the plate table.
#[derive(Debug, Clone, Copy)]
pub struct PlateSpec {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
    pub h: f32,
    pub d: f32,
    pub color: Rgb,
}

const fn plate(x: f32, y: f32, z: f32, w: f32, h: f32, d: f32, color: Rgb) -> PlateSpec {
    PlateSpec { x, y, z, w, h, d, color }
}

pub const PLATES: [PlateSpec; 8] = [
    // Long grey plates
    plate(-200.0, -130.0, -40.0, 200.0, 10.0, 80.0, palette::GREY),
    plate(-50.0, 200.0, -20.0, 200.0, 10.0, 80.0, palette::GREY),
    // Coloured blocks
    plate(100.0, 0.0, -15.0, 120.0, 10.0, 100.0, palette::BLUE),
    plate(-150.0, 50.0, -30.0, 80.0, 10.0, 80.0, palette::RED),
    plate(-10.0, -50.0, -25.0, 80.0, 10.0, 80.0, palette::RED),
    plate(200.0, 100.0, -10.0, 80.0, 10.0, 180.0, palette::YELLOW),
    plate(-250.0, 30.0, -20.0, 80.0, 10.0, 200.0, palette::YELLOW),
    plate(130.0, -150.0, 0.0, 200.0, 10.0, 80.0, palette::YELLOW),
];

/// The three shape collections, in reveal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupId {
    Plates,
    Lines,
    Boxes,
}

impl GroupId {
    pub const ALL: [GroupId; 3] = [GroupId::Plates, GroupId::Lines, GroupId::Boxes];

    /// Cycle count from which the group is drawn.
    pub fn threshold(self) -> u8 {
        match self {
            GroupId::Plates => 1,
            GroupId::Lines => 2,
            GroupId::Boxes => 3,
        }
    }

    /// Phase at which the group's local clock reads zero.
    pub fn start_ms(self) -> f32 {
        match self {
            GroupId::Plates => 0.0,
            GroupId::Lines => 3000.0,
            GroupId::Boxes => 6000.0,
        }
    }

    pub fn local_time(self, phase: f32) -> f32 {
        phase - self.start_ms()
    }

    /// Group-wide displacement at `phase`.
    pub fn offset(self, phase: f32) -> Vec3 {
        let angle = self.local_time(phase) / WOBBLE_RATE_MS;
        match self {
            GroupId::Plates => Vec3::new(angle.sin() * 20.0, 0.0, 0.0),
            GroupId::Lines => Vec3::new(0.0, angle.cos() * 15.0, 0.0),
            GroupId::Boxes => Vec3::new(0.0, 0.0, angle.sin() * 50.0),
        }
    }
}

/// What a call to [`Scene::render`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub phase: f32,
    pub cycle_count: u8,
}

pub struct Scene {
    plates: Vec<Shape>,
    lines: Vec<Shape>,
    boxes: Vec<Shape>,
    background: Rgb,
    tracker: CycleTracker,
}

impl Scene {
    /// Build the scene, scattering `box_count` boxes with `rng`.
    pub fn new<R: Rng>(box_count: usize, policy: CyclePolicy, rng: &mut R) -> Self {
        let plates = build_plates(&PLATES);
        let lines = build_lines(&PLATES);
        let boxes = scatter_boxes(&lines, box_count, rng);

        log::info!(
            "scene built: {} plates, {} lines, {} boxes ({:?} cycle policy)",
            plates.len(),
            lines.len(),
            boxes.len(),
            policy
        );

        Self {
            plates,
            lines,
            boxes,
            background: palette::BACKGROUND,
            tracker: CycleTracker::new(policy),
        }
    }

    /// Reproducible layout for a given seed.
    pub fn from_seed(box_count: usize, policy: CyclePolicy, seed: u64) -> Self {
        log::debug!("seeding scene layout with {}", seed);
        Self::new(box_count, policy, &mut StdRng::seed_from_u64(seed))
    }

    /// Layout drawn from the thread RNG; differs on every run.
    pub fn unseeded(box_count: usize, policy: CyclePolicy) -> Self {
        Self::new(box_count, policy, &mut rand::thread_rng())
    }

    pub fn plates(&self) -> &[Shape] {
        &self.plates
    }

    pub fn lines(&self) -> &[Shape] {
        &self.lines
    }

    pub fn boxes(&self) -> &[Shape] {
        &self.boxes
    }

    pub fn group(&self, group: GroupId) -> &[Shape] {
        match group {
            GroupId::Plates => &self.plates,
            GroupId::Lines => &self.lines,
            GroupId::Boxes => &self.boxes,
        }
    }

    pub fn cycle_count(&self) -> u8 {
        self.tracker.count()
    }

    /// Advance the reveal for the wall-clock time `now_ms` and draw the frame.
    pub fn render<S>(&mut self, surface: &mut S, now_ms: f64) -> FrameInfo
    where
        S: RenderSurface + ?Sized,
    {
        let phase = phase_of(now_ms);
        let cycle_count = self.tracker.observe(now_ms);
        self.draw_groups(surface, phase, cycle_count);
        FrameInfo { phase, cycle_count }
    }

    /// Draw every group unlocked by `cycle_count` at `phase`. Mutates nothing.
    pub fn draw_groups<S>(&self, surface: &mut S, phase: f32, cycle_count: u8)
    where
        S: RenderSurface + ?Sized,
    {
        surface.set_background(self.background);

        for group in GroupId::ALL {
            if cycle_count < group.threshold() {
                continue;
            }
            let offset = group.offset(phase);
            let local = group.local_time(phase);
            for shape in self.group(group) {
                shape.render_with_offset(surface, offset, local);
            }
        }
    }
}

fn build_plates(specs: &[PlateSpec]) -> Vec<Shape> {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            Shape::plate(
                Vec3::new(spec.x, spec.y, spec.z),
                spec.w,
                spec.h,
                spec.d,
                spec.color,
                index as f32 * PLATE_STAGGER_MS,
            )
        })
        .collect()
}

/// Two lines per plate, standing on opposite corners of its footprint.
fn build_lines(specs: &[PlateSpec]) -> Vec<Shape> {
    let mut lines = Vec::with_capacity(specs.len() * 2);
    for (index, spec) in specs.iter().enumerate() {
        let delay = index as f32 * PLATE_STAGGER_MS;
        let corners = [
            (spec.x - spec.w / 2.0, spec.y - spec.d / 2.0),
            (spec.x + spec.w / 2.0, spec.y + spec.d / 2.0),
        ];
        for (x, y) in corners {
            lines.push(Shape::vertical_line(
                Vec3::new(x, y, spec.z),
                LINE_HEIGHT,
                LINE_WIDTH,
                palette::LINE,
                delay,
            ));
        }
    }
    lines
}

fn scatter_boxes<R: Rng>(lines: &[Shape], count: usize, rng: &mut R) -> Vec<Shape> {
    let mut boxes = Vec::with_capacity(count);
    for i in 0..count {
        let color = palette::BOX_COLORS.choose(rng).copied().unwrap_or(palette::GREY);
        let size = rng.gen_range(BOX_SIZE_RANGE.0..=BOX_SIZE_RANGE.1);
        let Some(anchor) = lines.choose(rng) else {
            log::warn!("no support lines to scatter boxes around");
            break;
        };
        let base = anchor.position();
        let x = base.x + rng.gen_range(-BOX_JITTER..=BOX_JITTER);
        let y = base.y + rng.gen_range(-BOX_JITTER..=BOX_JITTER);
        let z = rng.gen_range(BOX_Z_RANGE.0..=BOX_Z_RANGE.1);

        boxes.push(Shape::plate(
            Vec3::new(x, y, z),
            size,
            size,
            size,
            color,
            i as f32 * BOX_STAGGER_MS,
        ));
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_list::{DisplayList, DrawCommand};
    use crate::shape::ShapeKind;

    fn seeded() -> Scene {
        Scene::from_seed(DEFAULT_BOX_COUNT, CyclePolicy::Wraparound, 7)
    }

    #[test]
    fn test_line_count_is_twice_plate_count() {
        let scene = seeded();
        assert_eq!(scene.plates().len(), PLATES.len());
        assert_eq!(scene.lines().len(), 2 * scene.plates().len());
        assert!(scene.lines().iter().all(|l| l.kind() == ShapeKind::VerticalLine));
    }

    #[test]
    fn test_lines_sit_on_plate_corners() {
        let scene = seeded();
        // Blue plate (index 2): x=100, y=0, w=120, d=100, z=-15.
        let lines = &scene.lines()[4..6];
        assert_eq!(lines[0].position(), Vec3::new(40.0, -50.0, -15.0));
        assert_eq!(lines[1].position(), Vec3::new(160.0, 50.0, -15.0));
        assert!(lines.iter().all(|l| l.delay() == 600.0));
    }

    #[test]
    fn test_plate_delays_are_staggered() {
        let scene = seeded();
        for (i, plate) in scene.plates().iter().enumerate() {
            assert_eq!(plate.delay(), i as f32 * 300.0);
        }
    }

    #[test]
    fn test_boxes_follow_generation_ranges() {
        let scene = seeded();
        assert_eq!(scene.boxes().len(), DEFAULT_BOX_COUNT);

        for (i, shape) in scene.boxes().iter().enumerate() {
            assert_eq!(shape.delay(), i as f32 * 150.0);
            assert_eq!(shape.kind(), ShapeKind::Plate);

            let extent = shape.extent();
            assert!((10.0..=30.0).contains(&extent.width));
            assert_eq!(extent.width, extent.height);
            assert_eq!(extent.width, extent.depth);

            let p = shape.position();
            assert!((-300.0..=-40.0).contains(&p.z));
            let near_line = scene.lines().iter().any(|l| {
                let base = l.position();
                (p.x - base.x).abs() <= 10.0 && (p.y - base.y).abs() <= 10.0
            });
            assert!(near_line);

            let palette_color: Rgb = shape.color();
            assert!(palette::BOX_COLORS.contains(&palette_color));
        }
    }

    #[test]
    fn test_seeded_layout_is_reproducible() {
        let a = Scene::from_seed(12, CyclePolicy::Window, 42);
        let b = Scene::from_seed(12, CyclePolicy::Window, 42);
        assert_eq!(a.boxes(), b.boxes());
    }

    #[test]
    fn test_first_frame_in_window_reveals_plates_only() {
        let mut scene = seeded();
        let mut list = DisplayList::new();
        let info = scene.render(&mut list, 50.0);

        assert_eq!(info.cycle_count, 1);
        assert_eq!(list.commands().first(), Some(&DrawCommand::Background(palette::BACKGROUND)));
        // Only the first plate (delay 0) is past its delay at t=50.
        assert_eq!(list.boxes().len(), 1);
        let expected_x = -200.0 + (50.0f32 / 300.0).sin() * 20.0;
        assert!((list.boxes()[0].center().x - expected_x).abs() < 1e-3);
    }

    #[test]
    fn test_stalled_redraws_still_reveal_every_group() {
        let mut scene = seeded();
        let mut list = DisplayList::new();
        assert_eq!(scene.render(&mut list, 50.0).cycle_count, 1);

        list.clear();
        let info = scene.render(&mut list, 18_150.0);
        assert_eq!(info.cycle_count, 3);
        assert_eq!(info.phase, 150.0);
    }

    #[test]
    fn test_nothing_drawn_before_first_cycle() {
        let mut scene = seeded();
        let mut list = DisplayList::new();
        let info = scene.render(&mut list, 4000.0);

        assert_eq!(info.cycle_count, 0);
        assert!(list.boxes().is_empty());
        assert_eq!(list.commands().len(), 1);
    }

    #[test]
    fn test_full_cycle_at_phase_3200() {
        let scene = seeded();
        let mut list = DisplayList::new();
        scene.draw_groups(&mut list, 3200.0, 3);

        let drawn = list.boxes();
        // All eight plates, plus the two lines of plate 0 (delay 0 < t=200).
        assert_eq!(drawn.len(), PLATES.len() + 2);

        let plate_dx = (3200.0f32 / 300.0).sin() * 20.0;
        for (shape, draw) in scene.plates().iter().zip(drawn) {
            let expected = shape.position() + Vec3::new(plate_dx, 0.0, 0.0);
            assert!((draw.center() - expected).length() < 1e-3);
        }

        let line_dy = (200.0f32 / 300.0).cos() * 15.0;
        let line = &scene.lines()[0];
        let line_draw = drawn[PLATES.len()];
        let expected = line.position() + Vec3::new(0.0, line_dy, -LINE_HEIGHT / 2.0);
        assert!((line_draw.center() - expected).length() < 1e-3);

        assert_eq!(GroupId::Lines.local_time(3200.0), 200.0);
        assert_eq!(GroupId::Boxes.local_time(3200.0), -2800.0);
    }

    #[test]
    fn test_boxes_appear_in_third_act() {
        let scene = seeded();
        let mut list = DisplayList::new();
        scene.draw_groups(&mut list, 8999.0, 3);

        // t=2999 for boxes: delays 0..=2850 are all past.
        let box_draws = list.boxes().len() - PLATES.len() - scene.lines().len();
        assert_eq!(box_draws, DEFAULT_BOX_COUNT);

        let mut list = DisplayList::new();
        scene.draw_groups(&mut list, 8999.0, 2);
        assert_eq!(list.boxes().len(), PLATES.len() + scene.lines().len());
    }

    #[test]
    fn test_group_offsets() {
        assert_eq!(GroupId::Plates.offset(0.0), Vec3::ZERO);
        assert!((GroupId::Lines.offset(3000.0).y - 15.0).abs() < 1e-6);
        let boxes = GroupId::Boxes.offset(6000.0 + 300.0 * std::f32::consts::FRAC_PI_2);
        assert!((boxes.z - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_draw_groups_leaves_surface_balanced() {
        let scene = seeded();
        let mut list = DisplayList::new();
        scene.draw_groups(&mut list, 7000.0, 3);
        assert_eq!(list.depth(), 0);
        assert_eq!(list.origin(), Vec3::ZERO);
    }

    #[test]
    fn test_zero_boxes() {
        let scene = Scene::from_seed(0, CyclePolicy::Wraparound, 1);
        assert!(scene.boxes().is_empty());
    }
}
