//! Minimal-translation separation of overlapping rooms.

use crate::graph::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Penetration depth of two rooms along each axis, or `None` when they do not overlap.
///
/// Touching edges (zero depth) do not count as overlap.
pub fn overlap(a: &Node, b: &Node) -> Option<(f64, f64)> {
    let delta = b.position - a.position;
    let overlap_x = a.half_width() + b.half_width() - delta.x.abs();
    let overlap_y = a.half_height() + b.half_height() - delta.y.abs();
    (overlap_x > 0.0 && overlap_y > 0.0).then_some((overlap_x, overlap_y))
}

pub fn overlaps(a: &Node, b: &Node) -> bool {
    overlap(a, b).is_some()
}

/// Pushes an overlapping pair apart along the axis of least penetration, half the depth each,
/// and halves both velocity components on that axis. Returns whether anything moved.
pub fn resolve_overlap(a: &mut Node, b: &mut Node) -> bool {
    let Some((overlap_x, overlap_y)) = overlap(a, b) else {
        return false;
    };

    let delta = b.position - a.position;
    let (axis, depth) = if overlap_x < overlap_y {
        (Axis::X, overlap_x)
    } else {
        (Axis::Y, overlap_y)
    };
    let component = match axis {
        Axis::X => 0,
        Axis::Y => 1,
    };
    let sign = if delta[component] < 0.0 { -1.0 } else { 1.0 };
    let push = sign * depth / 2.0;

    a.position[component] -= push;
    b.position[component] += push;
    a.velocity[component] *= 0.5;
    b.velocity[component] *= 0.5;
    true
}
