//! Runtime configuration.
//!
//! Everything is optional in the JSON file; missing fields fall back to the
//! reference sketch. Geometry and timing are not configurable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cycle::CyclePolicy;
use crate::scene::{Scene, DEFAULT_BOX_COUNT};

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    800
}

fn default_fps() -> f32 {
    60.0
}

fn default_box_count() -> usize {
    DEFAULT_BOX_COUNT
}

/// Camera placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraSettings {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            eye: [-800.0, 800.0, 600.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 0.0, -1.0],
            fov_degrees: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchConfig {
    /// Window or frame width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Window or frame height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Seed for the scattered boxes. None picks a fresh layout each run.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Number of scattered boxes.
    #[serde(default = "default_box_count")]
    pub box_count: usize,

    #[serde(default)]
    pub cycle_policy: CyclePolicy,

    /// Frame rate used for offline rendering.
    #[serde(default = "default_fps")]
    pub fps: f32,

    #[serde(default)]
    pub camera: CameraSettings,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: None,
            box_count: default_box_count(),
            cycle_policy: CyclePolicy::default(),
            fps: default_fps(),
            camera: CameraSettings::default(),
        }
    }
}

impl SketchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid sketch config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json(&contents)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Build the scene this config describes.
    pub fn build_scene(&self) -> Scene {
        match self.seed {
            Some(seed) => Scene::from_seed(self.box_count, self.cycle_policy, seed),
            None => Scene::unseeded(self.box_count, self.cycle_policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = SketchConfig::from_json("{}").unwrap();
        assert_eq!(config, SketchConfig::default());
        assert_eq!(config.box_count, 20);
        assert_eq!(config.camera.eye, [-800.0, 800.0, 600.0]);
        assert_eq!(config.camera.up, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_partial_json_overrides() {
        let json = r#"{
            "seed": 9,
            "boxCount": 5,
            "cyclePolicy": "window",
            "camera": { "fovDegrees": 45.0 }
        }"#;
        let config = SketchConfig::from_json(json).unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.box_count, 5);
        assert_eq!(config.cycle_policy, CyclePolicy::Window);
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.camera.eye, [-800.0, 800.0, 600.0]);
        assert_eq!(config.width, 1280);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(SketchConfig::from_json("{\"boxCount\": -1}").is_err());
    }

    #[test]
    fn test_build_scene_respects_seed() {
        let config = SketchConfig {
            seed: Some(3),
            box_count: 4,
            ..SketchConfig::default()
        };
        let a = config.build_scene();
        let b = config.build_scene();
        assert_eq!(a.boxes().len(), 4);
        assert_eq!(a.boxes(), b.boxes());
    }
}
