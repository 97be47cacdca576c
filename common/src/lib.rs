//! Common utilities for the tunneling visualization
//!
//! Shared graphics setup and camera controls used by both the 3D scene and
//! the 2D strip.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
