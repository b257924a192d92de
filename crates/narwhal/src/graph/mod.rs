use nalgebra::Vector2;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

pub mod relations;
pub mod store;

/// Simulation-space vector: origin at the viewport center, Y pointing up.
pub type Vec2 = Vector2<f64>;

/// A directed relation `from => to`. Only connectivity matters to the solver; the direction is
/// kept for renderers that draw arrows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A room: a named axis-aligned rectangle centered on `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f64,
    pub height: f64,
}

impl Node {
    pub fn new(name: impl Into<String>, position: Vec2, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            position,
            velocity: Vec2::zeros(),
            width,
            height,
        }
    }

    /// Half the rectangle's diagonal, used as a size stand-in by distance-based forces.
    pub fn radius(&self) -> f64 {
        0.5 * self.width.hypot(self.height)
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Inclusive point-in-rectangle test.
    pub fn contains(&self, point: Vec2) -> bool {
        (point.x - self.position.x).abs() <= self.half_width()
            && (point.y - self.position.y).abs() <= self.half_height()
    }
}

/// Unordered pairs of node indices joined by at least one edge.
///
/// Self-edges and edges naming an absent room are dropped here, which is what makes dangling
/// relations inert for the solver.
#[derive(Debug, Clone, Default)]
pub struct Connections {
    pairs: FxHashSet<(usize, usize)>,
}

impl Connections {
    pub fn build(edges: &[Edge], index_of: impl Fn(&str) -> Option<usize>) -> Self {
        let mut pairs = FxHashSet::default();
        for edge in edges {
            let (Some(a), Some(b)) = (index_of(&edge.from), index_of(&edge.to)) else {
                continue;
            };
            if a != b {
                pairs.insert((a.min(b), a.max(b)));
            }
        }
        Self { pairs }
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.pairs.contains(&(a.min(b), a.max(b)))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
