use crate::config::SimulationParams;
use crate::graph::store::NodeStore;
use crate::graph::{Node, Vec2};

/// Update rate the solver coefficients were tuned against.
///
/// Positions advance by `velocity * dt * CALIBRATION_HZ` even though velocities already carry
/// `dt`. Keep it: the default coefficients only behave at this coupling.
pub const CALIBRATION_HZ: f64 = 60.0;

/// Rescales `v` down to `max` when it is faster, keeping its direction.
pub fn clamp_speed(v: Vec2, max: f64) -> Vec2 {
    let speed = v.norm();
    if speed > max && speed > 0.0 {
        v * (max / speed)
    } else {
        v
    }
}

/// Semi-implicit Euler step: damp, clamp, then move.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    damping: f64,
    max_speed: f64,
}

impl Integrator {
    pub fn new(params: &SimulationParams) -> Self {
        Self {
            damping: params.damping,
            max_speed: params.max_speed,
        }
    }

    pub fn integrate(&self, store: &mut NodeStore, dt: f64) {
        for node in store.nodes_mut() {
            self.integrate_node(node, dt);
        }
    }

    pub fn integrate_node(&self, node: &mut Node, dt: f64) {
        node.velocity = clamp_speed(node.velocity * self.damping, self.max_speed);
        node.position += node.velocity * (dt * CALIBRATION_HZ);
    }
}
