use serde::Serialize;

use crate::graph::Edge;
use crate::graph::store::NodeStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSnapshot {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Read-only view of the layout for a renderer: room rectangles (centers) in simulation space,
/// plus the edges whose endpoints both exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub rooms: Vec<RoomSnapshot>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn capture(store: &NodeStore) -> Self {
        Self {
            rooms: store
                .nodes()
                .map(|n| RoomSnapshot {
                    name: n.name.clone(),
                    x: n.position.x,
                    y: n.position.y,
                    width: n.width,
                    height: n.height,
                })
                .collect(),
            edges: store.drawable_edges().cloned().collect(),
        }
    }

    pub fn room(&self, name: &str) -> Option<&RoomSnapshot> {
        self.rooms.iter().find(|r| r.name == name)
    }
}
