//! Particle lifecycle simulation
//!
//! Particles leave a fixed origin, travel along +x and hit a barrier. At the
//! barrier each one makes a single Bernoulli trial with a fixed probability:
//! it either tunnels (keeps going, placed just past the barrier) or reflects
//! (velocity reversed). The probability is a constant of the scene, not a
//! transmission coefficient derived from the barrier or the particle energy.

use crate::config::SimulatorConfig;
use crate::particle::{Particle, ParticleId, ParticleState};
use crate::source::{Clock, RandomSource};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// A particle resolved its barrier trial during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub id: ParticleId,
    pub state: ParticleState,
    pub position: Vec3,
    pub at: Duration,
}

/// What changed during one tick, for observers such as the label board
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub transitions: Vec<Transition>,
    /// Particles that left the live set
    pub exited: Vec<ParticleId>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty() && self.exited.is_empty()
    }
}

/// Running totals since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub spawned: u64,
    pub tunneled: u64,
    pub reflected: u64,
    pub exited: u64,
}

impl SimulationStats {
    /// Observed fraction of resolved trials that tunneled
    pub fn tunnel_ratio(&self) -> Option<f32> {
        let resolved = self.tunneled + self.reflected;
        (resolved > 0).then(|| self.tunneled as f32 / resolved as f32)
    }
}

pub struct ParticleSimulator<R, C> {
    config: SimulatorConfig,
    particles: Vec<Particle>,
    random: R,
    clock: C,
    scatter: StdRng,
    next_id: u64,
    last_spawn: Option<Duration>,
    stats: SimulationStats,
}

impl<R: RandomSource, C: Clock> ParticleSimulator<R, C> {
    pub fn new(config: SimulatorConfig, random: R, clock: C) -> Self {
        let scatter = StdRng::seed_from_u64(config.scatter_seed);
        Self {
            particles: Vec::with_capacity(config.capacity),
            config,
            random,
            clock,
            scatter,
            next_id: 0,
            last_spawn: None,
            stats: SimulationStats::default(),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn random_source(&self) -> &R {
        &self.random
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// Current live set in insertion order
    pub fn live_particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Add a particle at the origin if there is room and the spawn interval
    /// has passed. Saturation is not an error; the call just does nothing.
    pub fn spawn(&mut self) -> Option<ParticleId> {
        let now = self.clock.now();

        if self.particles.len() >= self.config.capacity {
            log::trace!("Spawn skipped: {} particles live", self.particles.len());
            return None;
        }
        if let Some(last) = self.last_spawn {
            if now.saturating_sub(last) < self.config.spawn_interval() {
                return None;
            }
        }

        let id = ParticleId(self.next_id);
        self.next_id += 1;

        let [jitter_y, jitter_z] = self.config.spawn_jitter;
        let offset = Vec3::new(
            0.0,
            scatter(&mut self.scatter, jitter_y),
            scatter(&mut self.scatter, jitter_z),
        );

        self.particles.push(Particle::new(
            id,
            self.config.origin() + offset,
            self.config.velocity(),
            now,
        ));
        self.last_spawn = Some(now);
        self.stats.spawned += 1;
        log::debug!("Spawned particle {} at {:?}", id.0, now);

        Some(id)
    }

    /// Advance every live particle by one frame
    pub fn tick(&mut self, now: Duration) -> TickReport {
        let mut report = TickReport::default();
        let config = &self.config;

        for particle in &mut self.particles {
            if particle.state == ParticleState::Approaching && particle.position.x >= config.barrier_x {
                let sample = self.random.next_unit();
                if sample < config.tunnel_probability {
                    particle.state = ParticleState::Tunneled;
                    particle.position.x = config.barrier_x + config.tunnel_offset;
                    self.stats.tunneled += 1;
                } else {
                    particle.state = ParticleState::Reflected;
                    particle.velocity = -particle.velocity;
                    self.stats.reflected += 1;
                }
                particle.transition_time = Some(now);
                log::debug!(
                    "Particle {} {:?} (sample {:.3})",
                    particle.id.0,
                    particle.state,
                    sample
                );
                report.transitions.push(Transition {
                    id: particle.id,
                    state: particle.state,
                    position: particle.position,
                    at: now,
                });
            }

            if particle.state == ParticleState::Tunneled {
                if let Some(since) = particle.transition_time {
                    let elapsed = now.saturating_sub(since).as_secs_f32();
                    particle.color_progress =
                        (elapsed / config.color_blend().as_secs_f32()).clamp(0.0, 1.0);
                }
            }

            particle.record_trail(config.trail_length);
            particle.position += particle.velocity;
        }

        let exit_distance = config.exit_distance;
        let stats = &mut self.stats;
        self.particles.retain(|particle| {
            let alive = particle.position.x.abs() <= exit_distance;
            if !alive {
                report.exited.push(particle.id);
                stats.exited += 1;
            }
            alive
        });

        report
    }

    /// Spawn (if allowed) and tick against the injected clock
    pub fn advance(&mut self) -> TickReport {
        let now = self.clock.now();
        self.spawn();
        self.tick(now)
    }

    /// Drop every live particle and start counting from scratch
    pub fn reset(&mut self) {
        log::info!("Resetting simulator ({} live particles dropped)", self.particles.len());
        self.particles.clear();
        self.last_spawn = None;
        self.stats = SimulationStats::default();
        self.scatter = StdRng::seed_from_u64(self.config.scatter_seed);
    }
}

fn scatter(rng: &mut StdRng, half_extent: f32) -> f32 {
    if half_extent > 0.0 {
        rng.gen_range(-half_extent..half_extent)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ManualClock, SequenceSource};
    use std::collections::HashMap;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn line_config() -> SimulatorConfig {
        SimulatorConfig {
            capacity: 4,
            spawn_interval_ms: 1000,
            origin: [-1.0, 0.0, 0.0],
            velocity: [1.0, 0.0, 0.0],
            barrier_x: 0.0,
            tunnel_offset: 0.5,
            exit_distance: 100.0,
            tunnel_probability: 0.1,
            color_blend_ms: 1000,
            spawn_jitter: [0.0, 0.0],
            trail_length: 4,
            scatter_seed: 0,
            labels: Default::default(),
        }
    }

    fn simulator(
        config: SimulatorConfig,
        samples: Vec<f32>,
    ) -> ParticleSimulator<SequenceSource, ManualClock> {
        ParticleSimulator::new(config, SequenceSource::new(samples), ManualClock::new())
    }

    #[test]
    fn spawn_respects_interval() {
        let mut sim = simulator(line_config(), vec![0.5]);
        assert!(sim.spawn().is_some());
        sim.clock().set(ms(999));
        assert!(sim.spawn().is_none());
        sim.clock().set(ms(1000));
        assert!(sim.spawn().is_some());
        assert!(sim.spawn().is_none());
        assert_eq!(sim.live_particles().len(), 2);
    }

    #[test]
    fn spawn_never_exceeds_capacity() {
        let mut config = line_config();
        config.exit_distance = 1.0e6;
        config.barrier_x = 1.0e5;
        let capacity = config.capacity;
        let mut sim = simulator(config, vec![0.5]);

        for second in 0..20 {
            sim.clock().set(ms(second * 1000));
            sim.spawn();
            assert!(sim.live_particles().len() <= capacity);
        }
        assert_eq!(sim.live_particles().len(), capacity);
        assert_eq!(sim.stats().spawned, capacity as u64);
    }

    #[test]
    fn spawned_particles_start_at_origin() {
        let mut sim = simulator(line_config(), vec![0.5]);
        sim.spawn();
        let particle = &sim.live_particles()[0];
        assert_eq!(particle.position(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(particle.velocity(), Vec3::X);
        assert_eq!(particle.state(), ParticleState::Approaching);
        assert_eq!(particle.spawn_time(), Duration::ZERO);
    }

    #[test]
    fn tunneling_keeps_velocity_and_jumps_the_barrier() {
        let mut sim = simulator(line_config(), vec![0.05]);
        sim.spawn();
        sim.tick(ms(0));
        let report = sim.tick(ms(16));

        assert_eq!(report.transitions.len(), 1);
        assert_eq!(report.transitions[0].state, ParticleState::Tunneled);
        assert_eq!(report.transitions[0].position.x, 0.5);

        let particle = &sim.live_particles()[0];
        assert_eq!(particle.state(), ParticleState::Tunneled);
        assert_eq!(particle.velocity(), Vec3::X);
        assert_eq!(particle.position().x, 1.5);
        assert_eq!(particle.transition_time(), Some(ms(16)));
    }

    #[test]
    fn reflection_inverts_velocity_once() {
        let mut sim = simulator(line_config(), vec![0.9]);
        sim.spawn();
        sim.tick(ms(0));
        let report = sim.tick(ms(16));
        assert_eq!(report.transitions[0].state, ParticleState::Reflected);

        for frame in 2..50 {
            let report = sim.tick(ms(frame * 16));
            assert!(report.transitions.is_empty());
        }
        let particle = &sim.live_particles()[0];
        assert_eq!(particle.state(), ParticleState::Reflected);
        assert_eq!(particle.velocity(), -Vec3::X);
        assert_eq!(sim.random_source().draws(), 1);
    }

    #[test]
    fn velocity_flips_iff_reflected() {
        let mut config = line_config();
        config.capacity = 10;
        config.spawn_interval_ms = 0;
        let mut sim = simulator(config, vec![0.05, 0.7, 0.09, 0.1, 0.99]);
        for _ in 0..5 {
            sim.spawn();
        }
        sim.tick(ms(0));
        sim.tick(ms(16));

        for particle in sim.live_particles() {
            let flipped = particle.velocity().x < 0.0;
            assert_eq!(flipped, particle.state() == ParticleState::Reflected);
        }
        let states: Vec<_> = sim.live_particles().iter().map(|p| p.state()).collect();
        assert_eq!(
            states,
            vec![
                ParticleState::Tunneled,
                ParticleState::Reflected,
                ParticleState::Tunneled,
                ParticleState::Reflected,
                ParticleState::Reflected,
            ]
        );
    }

    #[test]
    fn color_progress_ramps_over_one_second() {
        let mut config = line_config();
        config.tunnel_probability = 1.0;
        let mut sim = simulator(config, vec![0.99]);
        sim.spawn();
        sim.tick(ms(0));
        sim.tick(ms(500));
        assert_eq!(sim.live_particles()[0].color_progress(), 0.0);

        let mut previous = 0.0;
        for t in [600, 750, 1000, 1200, 1499] {
            sim.tick(ms(t));
            let progress = sim.live_particles()[0].color_progress();
            assert!(progress >= previous);
            assert!(progress < 1.0);
            previous = progress;
        }
        sim.tick(ms(1500));
        assert_eq!(sim.live_particles()[0].color_progress(), 1.0);
        sim.tick(ms(4000));
        assert_eq!(sim.live_particles()[0].color_progress(), 1.0);
    }

    #[test]
    fn reflected_particles_keep_base_color_progress() {
        let mut sim = simulator(line_config(), vec![0.5]);
        sim.spawn();
        for frame in 0..10 {
            sim.tick(ms(frame * 500));
        }
        assert_eq!(sim.live_particles()[0].color_progress(), 0.0);
    }

    #[test]
    fn removal_happens_exactly_past_the_bound() {
        let mut config = line_config();
        config.origin = [0.0, 0.0, 0.0];
        config.barrier_x = 1000.0;
        config.exit_distance = 5.0;
        let mut sim = simulator(config, vec![0.5]);
        sim.spawn();

        for step in 1..=5 {
            let report = sim.tick(ms(step));
            assert!(report.exited.is_empty());
            assert_eq!(sim.live_particles()[0].position().x, step as f32);
        }
        let report = sim.tick(ms(6));
        assert_eq!(report.exited, vec![ParticleId(0)]);
        assert!(sim.live_particles().is_empty());
        assert_eq!(sim.stats().exited, 1);
    }

    #[test]
    fn reflected_particles_exit_behind_the_origin() {
        let mut config = line_config();
        config.exit_distance = 3.0;
        let mut sim = simulator(config, vec![0.5]);
        sim.spawn();
        let mut exited = Vec::new();
        for frame in 0..20 {
            exited.extend(sim.tick(ms(frame)).exited);
        }
        assert_eq!(exited, vec![ParticleId(0)]);
    }

    #[test]
    fn same_sequence_same_outcome() {
        let run = || {
            let mut config = SimulatorConfig::scene_3d();
            config.scatter_seed = 42;
            let mut sim = simulator(config, vec![0.3, 0.02, 0.8, 0.07]);
            let mut history = Vec::new();
            for frame in 0..600u64 {
                sim.clock().set(ms(frame * 16));
                let report = sim.advance();
                history.extend(report.transitions.iter().map(|t| (t.id, t.state)));
            }
            (history, sim.stats())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn spawn_scatter_stays_within_jitter() {
        let mut config = SimulatorConfig::scene_3d();
        config.spawn_interval_ms = 0;
        let mut sim = simulator(config, vec![0.5]);
        for _ in 0..10 {
            sim.spawn();
        }
        for particle in sim.live_particles() {
            let p = particle.position();
            assert_eq!(p.x, -3.0);
            assert!((-0.5..0.5).contains(&p.y));
            assert!((-0.5..0.5).contains(&p.z));
        }
    }

    #[test]
    fn three_particle_scenario() {
        let mut sim = simulator(SimulatorConfig::scene_3d(), vec![0.05, 0.5, 0.2]);
        let mut outcome: HashMap<ParticleId, ParticleState> = HashMap::new();
        let mut spawned = Vec::new();

        for frame in 0..400u64 {
            let now = ms(frame * 20);
            sim.clock().set(now);
            if matches!(now.as_millis(), 0 | 1000 | 2000) {
                spawned.push(sim.spawn().expect("spawn allowed"));
            }
            let report = sim.tick(now);
            for transition in report.transitions {
                assert!(outcome.insert(transition.id, transition.state).is_none());
            }
        }

        assert_eq!(spawned, vec![ParticleId(0), ParticleId(1), ParticleId(2)]);
        let states: Vec<_> = spawned.iter().map(|id| outcome[id]).collect();
        assert_eq!(
            states,
            vec![
                ParticleState::Tunneled,
                ParticleState::Reflected,
                ParticleState::Reflected,
            ]
        );
        assert_eq!(sim.random_source().draws(), 3);
        assert!(sim.live_particles().is_empty());
        assert_eq!(
            sim.stats(),
            SimulationStats {
                spawned: 3,
                tunneled: 1,
                reflected: 2,
                exited: 3,
            }
        );
    }

    #[test]
    fn reset_clears_particles_and_spawn_timer() {
        let mut sim = simulator(line_config(), vec![0.5]);
        sim.spawn();
        sim.reset();
        assert!(sim.live_particles().is_empty());
        assert_eq!(sim.stats(), SimulationStats::default());
        assert!(sim.spawn().is_some());
    }

    #[test]
    fn tunnel_ratio() {
        let stats = SimulationStats {
            tunneled: 1,
            reflected: 3,
            ..Default::default()
        };
        assert_eq!(stats.tunnel_ratio(), Some(0.25));
        assert_eq!(SimulationStats::default().tunnel_ratio(), None);
    }
}
