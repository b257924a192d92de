use super::DISTANCE_EPSILON;
use super::collision::resolve_overlap;
use crate::config::SimulationParams;
use crate::graph::Node;
use crate::graph::store::NodeStore;

/// Pairwise spring/repulsion plus a pull toward the origin, applied as velocity deltas.
#[derive(Debug, Clone, Copy)]
pub struct ForceModel {
    params: SimulationParams,
}

impl ForceModel {
    /// Collision passes per pair per tick.
    pub const COLLISION_ITERATIONS: usize = 2;

    pub fn new(params: SimulationParams) -> Self {
        Self { params }
    }

    pub fn apply(&self, store: &mut NodeStore, dt: f64) {
        store.for_each_pair_mut(|a, b, connected| {
            self.apply_pair(a, b, connected, dt);
            for _ in 0..Self::COLLISION_ITERATIONS {
                if !resolve_overlap(a, b) {
                    break;
                }
            }
        });

        let pull = self.params.center_k * dt;
        for node in store.nodes_mut() {
            node.velocity -= node.position * pull;
        }
    }

    /// Connected rooms spring toward `radius(a) + radius(b) + target_gap`; unconnected rooms
    /// repel with `repel_k / dist²`.
    pub fn apply_pair(&self, a: &mut Node, b: &mut Node, connected: bool, dt: f64) {
        let delta = b.position - a.position;
        let dist = delta.norm().max(DISTANCE_EPSILON);
        let dir = delta / dist;

        if connected {
            let target = a.radius() + b.radius() + self.params.target_gap;
            let force = self.params.attract_k * (dist - target) * dt;
            a.velocity += dir * force;
            b.velocity -= dir * force;
        } else {
            let force = self.params.repel_k / (dist * dist) * dt;
            a.velocity -= dir * force;
            b.velocity += dir * force;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::TICK_DT;
    use crate::graph::Vec2;

    fn room(x: f64, y: f64) -> Node {
        Node::new("r", Vec2::new(x, y), 60.0, 80.0)
    }

    #[test]
    fn stretched_spring_pulls_together() {
        let model = ForceModel::new(SimulationParams::default());
        let mut a = room(0.0, 0.0);
        let mut b = room(300.0, 0.0);
        model.apply_pair(&mut a, &mut b, true, TICK_DT);

        let p = SimulationParams::default();
        let expected = p.attract_k * (300.0 - (100.0 + p.target_gap)) * TICK_DT;
        assert!((a.velocity.x - expected).abs() < 1e-12);
        assert!((b.velocity.x + expected).abs() < 1e-12);
        assert_eq!(a.velocity.y, 0.0);
    }

    #[test]
    fn compressed_spring_pushes_apart() {
        let model = ForceModel::new(SimulationParams::default());
        let mut a = room(0.0, 0.0);
        let mut b = room(0.0, 90.0);
        model.apply_pair(&mut a, &mut b, true, TICK_DT);
        assert!(a.velocity.y < 0.0);
        assert!(b.velocity.y > 0.0);
    }

    #[test]
    fn unconnected_rooms_repel_with_inverse_square() {
        let p = SimulationParams::default();
        let model = ForceModel::new(p);
        let mut a = room(0.0, 0.0);
        let mut b = room(-200.0, 0.0);
        model.apply_pair(&mut a, &mut b, false, TICK_DT);
        let expected = p.repel_k / (200.0 * 200.0) * TICK_DT;
        assert!((a.velocity.x - expected).abs() < 1e-12);
        assert!((b.velocity.x + expected).abs() < 1e-12);
    }

    #[test]
    fn coincident_rooms_do_not_produce_nan() {
        let model = ForceModel::new(SimulationParams::default());
        let mut a = room(5.0, 5.0);
        let mut b = room(5.0, 5.0);
        model.apply_pair(&mut a, &mut b, false, TICK_DT);
        assert!(a.velocity.iter().all(|v| v.is_finite()));
        assert!(b.velocity.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn apply_resolves_overlap_and_centers() {
        let mut store = NodeStore::default();
        store.reconcile(&["A".to_string(), "B".to_string()], 800.0, 600.0);
        store.node_mut("A").expect("A").position = Vec2::new(100.0, 0.0);
        store.node_mut("B").expect("B").position = Vec2::new(100.0, 10.0);

        ForceModel::new(SimulationParams::default()).apply(&mut store, TICK_DT);

        let a = store.node("A").expect("A");
        let b = store.node("B").expect("B");
        assert!(!crate::algo::collision::overlaps(a, b));
        // Both sit right of the origin, so the centering pull points left.
        assert!(a.velocity.x < 0.0);
        assert!(b.velocity.x < 0.0);
    }
}
