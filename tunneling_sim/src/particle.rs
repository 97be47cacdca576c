//! Particle entity and its presentation colors

use glam::Vec3;
use std::collections::VecDeque;
use std::time::Duration;

/// Stable identifier, unique within one simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

/// Where a particle stands relative to the barrier.
///
/// The only legal moves are `Approaching -> Tunneled` and
/// `Approaching -> Reflected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleState {
    Approaching,
    Tunneled,
    Reflected,
}

impl ParticleState {
    pub fn is_resolved(self) -> bool {
        self != ParticleState::Approaching
    }
}

/// Blue of an incoming particle (#60a5fa)
pub const APPROACHING_COLOR: [f32; 4] = [0.376, 0.647, 0.980, 1.0];
/// Green a tunneled particle blends towards (#34d399)
pub const TUNNELED_COLOR: [f32; 4] = [0.204, 0.827, 0.600, 1.0];
/// Red of a reflected particle (#f87171)
pub const REFLECTED_COLOR: [f32; 4] = [0.973, 0.443, 0.443, 1.0];

#[derive(Debug, Clone)]
pub struct Particle {
    pub(crate) id: ParticleId,
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) state: ParticleState,
    pub(crate) spawn_time: Duration,
    pub(crate) transition_time: Option<Duration>,
    pub(crate) color_progress: f32,
    pub(crate) trail: VecDeque<Vec3>,
}

impl Particle {
    pub(crate) fn new(id: ParticleId, position: Vec3, velocity: Vec3, spawn_time: Duration) -> Self {
        Self {
            id,
            position,
            velocity,
            state: ParticleState::Approaching,
            spawn_time,
            transition_time: None,
            color_progress: 0.0,
            trail: VecDeque::new(),
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn state(&self) -> ParticleState {
        self.state
    }

    pub fn spawn_time(&self) -> Duration {
        self.spawn_time
    }

    /// When the barrier trial resolved, if it has
    pub fn transition_time(&self) -> Option<Duration> {
        self.transition_time
    }

    /// Blend factor from blue to green, only moves for tunneled particles
    pub fn color_progress(&self) -> f32 {
        self.color_progress
    }

    /// Previous positions, newest first
    pub fn trail(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.trail.iter().copied()
    }

    /// Render color for the current state
    pub fn color(&self) -> [f32; 4] {
        match self.state {
            ParticleState::Approaching => APPROACHING_COLOR,
            ParticleState::Tunneled => lerp_color(APPROACHING_COLOR, TUNNELED_COLOR, self.color_progress),
            ParticleState::Reflected => REFLECTED_COLOR,
        }
    }

    pub(crate) fn record_trail(&mut self, max_len: usize) {
        if max_len == 0 {
            return;
        }
        self.trail.push_front(self.position);
        self.trail.truncate(max_len);
    }
}

/// Linear interpolation between two RGBA colors
pub fn lerp_color(from: [f32; 4], to: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        from[0] + (to[0] - from[0]) * t,
        from[1] + (to[1] - from[1]) * t,
        from[2] + (to[2] - from[2]) * t,
        from[3] + (to[3] - from[3]) * t,
    ]
}
