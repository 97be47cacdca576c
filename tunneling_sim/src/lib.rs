//! Quantum Tunneling Particle Visualization
//!
//! Particles fly at a barrier and, at the barrier, either tunnel through or
//! bounce back. The decision is a single draw against a fixed probability.
//!
//! - [`simulator`]: the headless particle lifecycle (spawn, tick, live set)
//! - [`labels`]: transient "Tunneled!"/"Reflected" labels observing ticks
//! - [`source`]: injectable random source and clock
//! - [`config`]: scene presets and TOML loading
//! - [`scene`], [`renderer`], [`overlay`], [`equations_ui`]: presentation

pub mod config;
pub mod particle;
pub mod source;
pub mod simulator;
pub mod labels;
pub mod scene;
pub mod renderer;
pub mod overlay;
pub mod equations_ui;

pub use config::{LabelConfig, SimulatorConfig};
pub use labels::{Label, LabelBoard};
pub use particle::{Particle, ParticleId, ParticleState};
pub use simulator::{ParticleSimulator, SimulationStats, TickReport, Transition};
pub use source::{Clock, ManualClock, RandomSource, SequenceSource, SystemClock};

/// Load the config named by the first CLI argument, or fall back to `preset`
pub fn config_from_args(preset: SimulatorConfig) -> anyhow::Result<SimulatorConfig> {
    match std::env::args().nth(1) {
        Some(path) => SimulatorConfig::load(path),
        None => {
            log::info!("No config file given, using built-in preset");
            Ok(preset)
        }
    }
}

/// Logger setup shared by the binaries; `RUST_LOG` overrides the default
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
