//! Transient text labels reacting to barrier transitions
//!
//! The board observes `TickReport`s. It never touches the simulator, and
//! the simulator never knows labels exist.

use crate::config::LabelConfig;
use crate::particle::{ParticleId, ParticleState};
use crate::simulator::TickReport;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub particle: ParticleId,
    pub text: &'static str,
    pub color: [u8; 3],
    pub created_at: Duration,
    /// Upward drift in pixels accumulated so far
    pub rise: f32,
}

impl Label {
    fn for_state(particle: ParticleId, state: ParticleState, created_at: Duration) -> Option<Self> {
        let (text, color) = match state {
            ParticleState::Tunneled => ("Tunneled!", [0x00, 0xff, 0x00]),
            ParticleState::Reflected => ("Reflected", [0xf8, 0x71, 0x71]),
            ParticleState::Approaching => return None,
        };
        Some(Self {
            particle,
            text,
            color,
            created_at,
            rise: 0.0,
        })
    }

    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.created_at)
    }
}

#[derive(Debug, Default)]
pub struct LabelBoard {
    config: LabelConfig,
    labels: Vec<Label>,
}

impl LabelBoard {
    pub fn new(config: LabelConfig) -> Self {
        Self {
            config,
            labels: Vec::new(),
        }
    }

    /// React to one simulator tick. Call once per frame, after `tick`.
    pub fn observe(&mut self, report: &TickReport, now: Duration) {
        // Labels created this frame are drawn at rise 0 first
        let remove_after = Duration::from_millis(self.config.remove_after_ms);
        let rise = self.config.rise_per_frame;
        self.labels.retain_mut(|label| {
            if label.age(now) > remove_after {
                return false;
            }
            label.rise += rise;
            true
        });

        for transition in &report.transitions {
            // One label per particle; a transition only ever happens once anyway
            self.labels.retain(|label| label.particle != transition.id);
            if let Some(label) = Label::for_state(transition.id, transition.state, transition.at) {
                self.labels.push(label);
            }
        }

        // A particle may transition and leave in the same tick
        if !report.exited.is_empty() {
            self.labels.retain(|label| !report.exited.contains(&label.particle));
        }
    }

    /// 1.0 while fresh, 0.0 once past the fade threshold
    pub fn opacity(&self, label: &Label, now: Duration) -> f32 {
        if label.age(now) > Duration::from_millis(self.config.fade_after_ms) {
            0.0
        } else {
            1.0
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Drop every label; used on reset and teardown
    pub fn clear(&mut self) {
        if !self.labels.is_empty() {
            log::debug!("Dropping {} labels", self.labels.len());
        }
        self.labels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::Transition;
    use glam::Vec3;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn transition(id: u64, state: ParticleState, at: u64) -> TickReport {
        TickReport {
            transitions: vec![Transition {
                id: ParticleId(id),
                state,
                position: Vec3::ZERO,
                at: ms(at),
            }],
            exited: Vec::new(),
        }
    }

    #[test]
    fn creates_label_per_transition() {
        let mut board = LabelBoard::new(LabelConfig::default());
        board.observe(&transition(0, ParticleState::Tunneled, 100), ms(100));
        board.observe(&transition(1, ParticleState::Reflected, 116), ms(116));

        let texts: Vec<_> = board.labels().iter().map(|l| l.text).collect();
        assert_eq!(texts, vec!["Tunneled!", "Reflected"]);
        assert_eq!(board.labels()[1].color, [0xf8, 0x71, 0x71]);
    }

    #[test]
    fn fades_then_expires() {
        let mut board = LabelBoard::new(LabelConfig::default());
        board.observe(&transition(0, ParticleState::Tunneled, 0), ms(0));

        let label = board.labels()[0].clone();
        assert_eq!(board.opacity(&label, ms(1000)), 1.0);
        assert_eq!(board.opacity(&label, ms(1001)), 0.0);

        board.observe(&TickReport::default(), ms(1500));
        assert_eq!(board.len(), 1);
        board.observe(&TickReport::default(), ms(1501));
        assert!(board.is_empty());
    }

    #[test]
    fn rises_each_frame() {
        let mut board = LabelBoard::new(LabelConfig::default());
        board.observe(&transition(0, ParticleState::Reflected, 0), ms(0));
        assert_eq!(board.labels()[0].rise, 0.0);
        for frame in 1..=4 {
            board.observe(&TickReport::default(), ms(frame * 16));
        }
        assert_eq!(board.labels()[0].rise, 2.0);
    }

    #[test]
    fn no_label_for_particle_that_leaves_on_its_transition_tick() {
        use crate::config::SimulatorConfig;
        use crate::simulator::ParticleSimulator;
        use crate::source::{ManualClock, SequenceSource};

        let config = SimulatorConfig {
            capacity: 1,
            spawn_interval_ms: 1000,
            origin: [-1.0, 0.0, 0.0],
            velocity: [1.0, 0.0, 0.0],
            barrier_x: 0.0,
            tunnel_offset: 2.5,
            exit_distance: 3.0,
            tunnel_probability: 0.1,
            color_blend_ms: 1000,
            spawn_jitter: [0.0, 0.0],
            trail_length: 0,
            scatter_seed: 0,
            labels: LabelConfig::default(),
        };
        let mut sim =
            ParticleSimulator::new(config, SequenceSource::new(vec![0.05]), ManualClock::new());
        let mut board = LabelBoard::new(LabelConfig::default());

        sim.spawn();
        let report = sim.tick(ms(0));
        board.observe(&report, ms(0));
        assert!(report.transitions.is_empty());
        assert!(board.is_empty());

        // x = 0 triggers the trial, the nudge to 2.5 plus one step lands past 3.0
        let report = sim.tick(ms(16));
        assert_eq!(report.transitions.len(), 1);
        assert_eq!(report.exited, vec![ParticleId(0)]);
        board.observe(&report, ms(16));
        assert!(sim.live_particles().is_empty());
        assert!(board.is_empty());

        board.observe(&sim.tick(ms(32)), ms(32));
        assert!(board.is_empty());
    }

    #[test]
    fn dropped_with_its_particle() {
        let mut board = LabelBoard::new(LabelConfig::default());
        board.observe(&transition(0, ParticleState::Tunneled, 0), ms(0));
        board.observe(&transition(1, ParticleState::Reflected, 0), ms(0));

        let report = TickReport {
            transitions: Vec::new(),
            exited: vec![ParticleId(0)],
        };
        board.observe(&report, ms(16));
        assert_eq!(board.len(), 1);
        assert_eq!(board.labels()[0].particle, ParticleId(1));
    }

    #[test]
    fn clear_empties_the_board() {
        let mut board = LabelBoard::new(LabelConfig::default());
        board.observe(&transition(0, ParticleState::Tunneled, 0), ms(0));
        board.clear();
        assert!(board.is_empty());
    }
}
