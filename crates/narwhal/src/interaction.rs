//! Pointer handling: pick, drag override, hover.

use crate::controller::SimulationController;
use crate::graph::Vec2;
use crate::graph::store::NodeStore;
use crate::ticker::TickCallback;

/// Host viewport: current size and the device → simulation coordinate transform.
pub trait Viewport {
    fn size(&self) -> (f64, f64);

    /// Maps device coordinates (origin top-left, Y down) into simulation space (origin
    /// centered, Y up).
    fn to_simulation(&self, device: Vec2) -> Vec2;
}

/// A plain screen viewport with a uniform zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenViewport {
    pub width: f64,
    pub height: f64,
    /// Device pixels per simulation unit.
    pub scale: f64,
}

impl ScreenViewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Inverse of [`Viewport::to_simulation`].
    pub fn to_device(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x * self.scale + self.width / 2.0,
            self.height / 2.0 - point.y * self.scale,
        )
    }
}

impl Viewport for ScreenViewport {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn to_simulation(&self, device: Vec2) -> Vec2 {
        Vec2::new(
            (device.x - self.width / 2.0) / self.scale,
            (self.height / 2.0 - device.y) / self.scale,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Drag {
    room: String,
    /// Room center minus the pointer at grab time.
    offset: Vec2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerMove {
    /// The dragged room was moved.
    Dragged,
    /// Hover target changed (to `None` when leaving every room).
    HoverChanged(Option<String>),
    Ignored,
}

/// Turns pointer events into picks, drag overrides and hover feedback.
#[derive(Debug, Default)]
pub struct InteractionController {
    drag: Option<Drag>,
    hover: Option<String>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn dragged(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.room.as_str())
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hover.as_deref()
    }

    /// Grabs the smallest room under the pointer and pauses the solver. Returns the grabbed
    /// room's name, or `None` when the pointer hit nothing.
    pub fn pointer_down(
        &mut self,
        store: &NodeStore,
        controller: &mut SimulationController,
        viewport: &dyn Viewport,
        device: Vec2,
    ) -> Option<String> {
        let point = viewport.to_simulation(device);
        let node = store.room_at(point)?;
        let name = node.name.clone();

        self.drag = Some(Drag {
            room: name.clone(),
            offset: node.position - point,
        });
        controller.stop();
        tracing::debug!(room = %name, "drag started");
        Some(name)
    }

    /// While dragging, pins the room to `pointer + offset` with zero velocity. Otherwise only
    /// updates the hover target.
    pub fn pointer_move(
        &mut self,
        store: &mut NodeStore,
        viewport: &dyn Viewport,
        device: Vec2,
    ) -> PointerMove {
        let point = viewport.to_simulation(device);

        if let Some(drag) = &self.drag {
            let Some(node) = store.node_mut(&drag.room) else {
                return PointerMove::Ignored;
            };
            node.position = point + drag.offset;
            node.velocity = Vec2::zeros();
            return PointerMove::Dragged;
        }

        let hovered = store.room_at(point).map(|n| n.name.clone());
        if hovered == self.hover {
            return PointerMove::Ignored;
        }
        self.hover = hovered.clone();
        PointerMove::HoverChanged(hovered)
    }

    /// Ends an active drag and re-arms the solver with `on_tick`. Returns whether a drag ended;
    /// without one this is a no-op.
    pub fn pointer_up(
        &mut self,
        controller: &mut SimulationController,
        on_tick: TickCallback,
    ) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        tracing::debug!(room = %drag.room, "drag released");
        controller.start(on_tick);
        true
    }

    /// Forgets hover state, e.g. when the pointer leaves the surface.
    pub fn clear_hover(&mut self) -> bool {
        self.hover.take().is_some()
    }
}
