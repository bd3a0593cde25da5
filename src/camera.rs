//! Orbit camera.
//!
//! The camera looks at a fixed target from an eye position that can be
//! dragged around the target (azimuth about the up axis, elevation towards
//! it) and pulled in or out with the scroll wheel.

use glam::{Mat4, Quat, Vec3};

use crate::config::CameraSettings;

/// Radians of rotation per dragged pixel.
const ORBIT_SENSITIVITY: f32 = 0.005;

/// Fractional change of the orbit radius per scroll unit.
const ZOOM_SENSITIVITY: f32 = 0.1;

const MIN_RADIUS: f32 = 50.0;
const MAX_RADIUS: f32 = 5000.0;

/// Closest the eye may get to the up axis, in radians.
const POLE_MARGIN: f32 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

impl OrbitCamera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            eye: Vec3::from_array(settings.eye),
            target: Vec3::from_array(settings.target),
            up: Vec3::from_array(settings.up).try_normalize().unwrap_or(Vec3::NEG_Z),
            fov: settings.fov_degrees,
            near: 1.0,
            far: 10_000.0,
        }
    }

    /// Distance from eye to target.
    pub fn radius(&self) -> f32 {
        (self.eye - self.target).length()
    }

    /// Rotate the eye around the target by a mouse drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let offset = self.eye - self.target;
        if offset.length_squared() <= f32::EPSILON {
            return;
        }

        let azimuth = Quat::from_axis_angle(self.up, -dx * ORBIT_SENSITIVITY);
        let mut offset = azimuth * offset;

        let right = offset.cross(self.up);
        if right.length_squared() > f32::EPSILON {
            let current = offset.angle_between(self.up);
            let wanted = (current - dy * ORBIT_SENSITIVITY)
                .clamp(POLE_MARGIN, std::f32::consts::PI - POLE_MARGIN);
            let elevation = Quat::from_axis_angle(right.normalize(), current - wanted);
            offset = elevation * offset;
        }

        self.eye = self.target + offset;
    }

    /// Move the eye along the view ray; positive `delta` moves closer.
    pub fn zoom(&mut self, delta: f32) {
        let offset = self.eye - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let scaled = (radius * (1.0 - delta * ZOOM_SENSITIVITY)).clamp(MIN_RADIUS, MAX_RADIUS);
        self.eye = self.target + offset * (scaled / radius);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Perspective projection with screen y pointing down, like the 2D canvas
    /// the scene coordinates were authored against.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let flip_y = Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0));
        flip_y * Mat4::perspective_rh(self.fov.to_radians(), aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}
