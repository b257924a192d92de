use std::f64::consts::{FRAC_PI_2, TAU};

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};

use super::{Connections, Edge, Node, Vec2};
use crate::config::{DEFAULT_ROOM_HEIGHT, DEFAULT_ROOM_WIDTH, MIN_ROOM_DIMENSION};

const MIN_SEED_RADIUS: f64 = 60.0;
const SEED_RADIUS_FRACTION: f64 = 0.35;

/// Every endpoint of `edges`, once, in first-seen order.
pub fn unique_names(edges: &[Edge]) -> Vec<String> {
    let mut seen: IndexSet<&str> = IndexSet::new();
    for edge in edges {
        seen.insert(edge.from.as_str());
        seen.insert(edge.to.as_str());
    }
    seen.into_iter().map(str::to_string).collect()
}

/// Radius of the circle new rooms are seeded on, for a viewport of `width` × `height`.
pub fn seed_radius(width: f64, height: f64) -> f64 {
    (SEED_RADIUS_FRACTION * width.min(height)).max(MIN_SEED_RADIUS)
}

/// Seed position of the `index`-th of `count` names: evenly spaced, the first at angle -π/2.
pub fn seed_position(index: usize, count: usize, radius: f64) -> Vec2 {
    let angle = index as f64 * TAU / count.max(1) as f64 - FRAC_PI_2;
    Vec2::new(radius * angle.cos(), radius * angle.sin())
}

fn clamp_dimension(value: f64) -> f64 {
    if value.is_finite() {
        value.max(MIN_ROOM_DIMENSION)
    } else {
        MIN_ROOM_DIMENSION
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Owns the rooms and the current relation list.
///
/// Rooms are kept in insertion order so pairwise iteration (and therefore every tick) is
/// reproducible.
#[derive(Debug, Clone)]
pub struct NodeStore {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    connections: Connections,
    room_width: f64,
    room_height: f64,
    /// Size edits for names that have no room yet.
    pending_sizes: FxHashMap<String, (f64, f64)>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM_WIDTH, DEFAULT_ROOM_HEIGHT)
    }
}

impl NodeStore {
    pub fn new(room_width: f64, room_height: f64) -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: Vec::new(),
            connections: Connections::default(),
            room_width: clamp_dimension(room_width),
            room_height: clamp_dimension(room_height),
            pending_sizes: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.get_mut(name)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges whose endpoints both have a room.
    pub fn drawable_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|e| self.nodes.contains_key(&e.from) && self.nodes.contains_key(&e.to))
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    /// Whether any edge joins the two named rooms, in either direction.
    pub fn is_connected(&self, a: &str, b: &str) -> bool {
        match (self.nodes.get_index_of(a), self.nodes.get_index_of(b)) {
            (Some(a), Some(b)) => self.connections.contains(a, b),
            _ => false,
        }
    }

    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
        self.rebuild_connections();
    }

    /// Brings the room set in line with `names`: seeds a room for every new name on the
    /// viewport-sized circle and drops rooms whose name is gone. Surviving rooms are untouched.
    pub fn reconcile(&mut self, names: &[String], width: f64, height: f64) -> ReconcileReport {
        let keep: FxHashSet<&str> = names.iter().map(String::as_str).collect();
        let mut report = ReconcileReport::default();

        self.nodes.retain(|name, _| {
            let kept = keep.contains(name.as_str());
            if !kept {
                report.removed.push(name.clone());
            }
            kept
        });

        let radius = seed_radius(width, height);
        for (index, name) in names.iter().enumerate() {
            if self.nodes.contains_key(name) {
                continue;
            }
            let (w, h) = self
                .pending_sizes
                .remove(name)
                .unwrap_or((self.room_width, self.room_height));
            let position = seed_position(index, names.len(), radius);
            self.nodes
                .insert(name.clone(), Node::new(name.clone(), position, w, h));
            report.added.push(name.clone());
        }

        if !report.is_empty() {
            tracing::debug!(
                added = report.added.len(),
                removed = report.removed.len(),
                rooms = self.nodes.len(),
                "reconciled rooms"
            );
        }
        self.rebuild_connections();
        report
    }

    /// Applies a size edit, clamping each dimension to [`MIN_ROOM_DIMENSION`].
    ///
    /// Returns `false` when the room does not exist yet; the size is then applied when it
    /// appears.
    pub fn set_size(&mut self, name: &str, width: f64, height: f64) -> bool {
        let (width, height) = (clamp_dimension(width), clamp_dimension(height));
        match self.nodes.get_mut(name) {
            Some(node) => {
                node.width = width;
                node.height = height;
                true
            }
            None => {
                self.pending_sizes.insert(name.to_string(), (width, height));
                false
            }
        }
    }

    /// The room under `point`; overlapping candidates resolve to the smallest area.
    pub fn room_at(&self, point: Vec2) -> Option<&Node> {
        self.nodes
            .values()
            .filter(|n| n.contains(point))
            .fold(None, |best: Option<&Node>, n| match best {
                Some(b) if b.area() <= n.area() => Some(b),
                _ => Some(n),
            })
    }

    /// Visits every unordered pair `(i, j)`, `i < j`, in insertion order with mutable access to
    /// both rooms and whether they are connected.
    pub fn for_each_pair_mut(&mut self, mut f: impl FnMut(&mut Node, &mut Node, bool)) {
        let connections = &self.connections;
        let mut nodes: Vec<&mut Node> = self.nodes.values_mut().collect();
        for i in 0..nodes.len() {
            let (head, tail) = nodes.split_at_mut(i + 1);
            let a: &mut Node = &mut *head[i];
            for (k, b) in tail.iter_mut().enumerate() {
                f(&mut *a, &mut **b, connections.contains(i, i + 1 + k));
            }
        }
    }

    /// `true` when `pred` holds for every unordered pair; stops at the first failure.
    pub fn all_pairs(&self, mut pred: impl FnMut(&Node, &Node, bool) -> bool) -> bool {
        let nodes: Vec<&Node> = self.nodes.values().collect();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if !pred(nodes[i], nodes[j], self.connections.contains(i, j)) {
                    return false;
                }
            }
        }
        true
    }

    fn rebuild_connections(&mut self) {
        let nodes = &self.nodes;
        self.connections = Connections::build(&self.edges, |name| nodes.get_index_of(name));
    }
}
