//! Simulator configuration: built-in scene presets plus optional TOML overrides

use anyhow::{ensure, Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timing and motion of the transition labels
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LabelConfig {
    /// Label turns transparent after this long
    pub fade_after_ms: u64,
    /// Label is dropped after this long
    pub remove_after_ms: u64,
    /// Upward drift in pixels per frame
    pub rise_per_frame: f32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            fade_after_ms: 1000,
            remove_after_ms: 1500,
            rise_per_frame: 0.5,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Maximum number of live particles
    pub capacity: usize,
    /// Minimum time between two spawns
    pub spawn_interval_ms: u64,
    /// Where new particles appear
    pub origin: [f32; 3],
    /// Per-tick displacement of a new particle
    pub velocity: [f32; 3],
    /// Position along x at which the tunnel/reflect trial happens
    pub barrier_x: f32,
    /// How far past `barrier_x` a tunneling particle is placed
    pub tunnel_offset: f32,
    /// Particles with |x| beyond this are removed
    pub exit_distance: f32,
    /// Chance of tunneling at the barrier
    pub tunnel_probability: f32,
    /// Duration of the blue-to-green blend after tunneling
    pub color_blend_ms: u64,
    /// Half-extent of the uniform spawn scatter on y and z
    #[serde(default)]
    pub spawn_jitter: [f32; 2],
    #[serde(default = "default_trail_length")]
    pub trail_length: usize,
    /// Seed for the spawn scatter RNG (barrier trials use their own source)
    #[serde(default)]
    pub scatter_seed: u64,
    #[serde(default)]
    pub labels: LabelConfig,
}

fn default_trail_length() -> usize {
    20
}

impl SimulatorConfig {
    /// The 3D scene: ten particles crossing a thin barrier box at the origin
    pub fn scene_3d() -> Self {
        Self {
            capacity: 10,
            spawn_interval_ms: 1000,
            origin: [-3.0, 0.0, 0.0],
            velocity: [0.05, 0.0, 0.0],
            barrier_x: -0.25,
            tunnel_offset: 0.5,
            exit_distance: 3.0,
            tunnel_probability: 0.1,
            color_blend_ms: 1000,
            spawn_jitter: [0.5, 0.5],
            trail_length: default_trail_length(),
            scatter_seed: 0,
            labels: LabelConfig::default(),
        }
    }

    /// The 2D strip: five particles on a 400 px track, barrier in the middle
    pub fn scroll_demo() -> Self {
        Self {
            capacity: 5,
            spawn_interval_ms: 1000,
            origin: [-150.0, 0.0, 0.0],
            velocity: [2.0, 0.0, 0.0],
            barrier_x: 0.0,
            tunnel_offset: 10.0,
            exit_distance: 200.0,
            tunnel_probability: 0.1,
            color_blend_ms: 1000,
            spawn_jitter: [50.0, 0.0],
            trail_length: 0,
            scatter_seed: 0,
            labels: LabelConfig::default(),
        }
    }

    /// Load a configuration from a TOML file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        log::info!("Loaded simulator config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.capacity > 0, "capacity must be at least 1");
        ensure!(
            self.exit_distance > 0.0,
            "exit_distance must be positive, got {}",
            self.exit_distance
        );
        ensure!(
            self.velocity[0] != 0.0,
            "velocity must have a non-zero x component"
        );
        ensure!(
            self.origin[0].abs() <= self.exit_distance,
            "origin x ({}) lies beyond exit_distance ({})",
            self.origin[0],
            self.exit_distance
        );
        ensure!(
            (0.0..=1.0).contains(&self.tunnel_probability),
            "tunnel_probability must lie in [0, 1], got {}",
            self.tunnel_probability
        );
        ensure!(self.color_blend_ms > 0, "color_blend_ms must be positive");
        ensure!(
            self.labels.remove_after_ms >= self.labels.fade_after_ms,
            "labels.remove_after_ms ({}) is earlier than labels.fade_after_ms ({})",
            self.labels.remove_after_ms,
            self.labels.fade_after_ms
        );
        ensure!(
            self.spawn_jitter.iter().all(|j| *j >= 0.0),
            "spawn_jitter must not be negative"
        );
        Ok(())
    }

    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }

    pub fn velocity(&self) -> Vec3 {
        Vec3::from_array(self.velocity)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn color_blend(&self) -> Duration {
        Duration::from_millis(self.color_blend_ms)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::scene_3d()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        SimulatorConfig::scene_3d().validate().unwrap();
        SimulatorConfig::scroll_demo().validate().unwrap();
    }

    #[test]
    fn presets_share_the_trial_constants() {
        let scene = SimulatorConfig::scene_3d();
        let strip = SimulatorConfig::scroll_demo();
        assert_eq!(scene.capacity, 10);
        assert_eq!(strip.capacity, 5);
        for config in [&scene, &strip] {
            assert_eq!(config.tunnel_probability, 0.1);
            assert_eq!(config.spawn_interval(), Duration::from_millis(1000));
            assert_eq!(config.color_blend(), Duration::from_secs(1));
        }
    }

    #[test]
    fn toml_round_trip_preserves_values() {
        let config = SimulatorConfig::scroll_demo();
        let text = config.to_toml().unwrap();
        assert_eq!(SimulatorConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn optional_fields_fall_back_to_defaults() {
        let text = r#"
            capacity = 3
            spawn_interval_ms = 500
            origin = [-1.0, 0.0, 0.0]
            velocity = [0.1, 0.0, 0.0]
            barrier_x = 0.0
            tunnel_offset = 0.2
            exit_distance = 2.0
            tunnel_probability = 0.5
            color_blend_ms = 250
        "#;
        let config = SimulatorConfig::from_toml(text).unwrap();
        assert_eq!(config.trail_length, 20);
        assert_eq!(config.spawn_jitter, [0.0, 0.0]);
        assert_eq!(config.labels, LabelConfig::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = SimulatorConfig::scene_3d();
        config.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::scene_3d();
        config.tunnel_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::scene_3d();
        config.labels.remove_after_ms = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_geometry_that_never_clears() {
        let mut config = SimulatorConfig::scene_3d();
        config.velocity = [0.0, 0.1, 0.0];
        assert!(config.validate().is_err());

        let mut config = SimulatorConfig::scroll_demo();
        config.origin = [-250.0, 0.0, 0.0];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("beyond exit_distance"));

        let mut config = SimulatorConfig::scene_3d();
        config.origin = [-3.0, 0.0, 0.0];
        config.exit_distance = 3.0;
        config.validate().unwrap();
    }

    #[test]
    fn bundled_config_parses() {
        let config =
            SimulatorConfig::from_toml(include_str!("../../configs/high_tunneling.toml")).unwrap();
        assert_eq!(config.tunnel_probability, 0.5);
        assert_eq!(config.trail_length, 30);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SimulatorConfig::load("/nonexistent/tunneling.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
