//! Per-tick solver stages: forces, collisions, integration and the settle test.

pub mod collision;
pub mod convergence;
pub mod force;
pub mod integrate;

pub use convergence::ConvergenceDetector;
pub use force::ForceModel;
pub use integrate::Integrator;

/// Fixed simulation step per tick.
pub const TICK_DT: f64 = 1.0 / 60.0;

/// Floor for pair distances so coincident rooms never divide by zero.
pub const DISTANCE_EPSILON: f64 = 1e-4;
