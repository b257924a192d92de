use super::collision::overlaps;
use crate::config::SimulationParams;
use crate::graph::Node;
use crate::graph::store::NodeStore;

/// Slack on the distance targets, absorbing integration jitter around the spring rest length.
pub const SETTLE_TOLERANCE: f64 = 4.0;

#[derive(Debug, Clone, Copy)]
pub struct ConvergenceDetector {
    params: SimulationParams,
}

impl ConvergenceDetector {
    pub fn new(params: SimulationParams) -> Self {
        Self { params }
    }

    /// Settled: every room slower than `stop_vel` and every pair within its distance band
    /// without overlapping. An empty store is trivially settled.
    pub fn is_settled(&self, store: &NodeStore) -> bool {
        if store.nodes().any(|n| n.speed() >= self.params.stop_vel) {
            return false;
        }
        store.all_pairs(|a, b, connected| self.pair_settled(a, b, connected))
    }

    pub fn pair_settled(&self, a: &Node, b: &Node, connected: bool) -> bool {
        if overlaps(a, b) {
            return false;
        }
        let dist = (b.position - a.position).norm();
        let radii = a.radius() + b.radius();
        if connected {
            dist <= radii + self.params.target_gap + SETTLE_TOLERANCE
        } else {
            dist >= radii + self.params.min_gap - SETTLE_TOLERANCE
        }
    }
}
