//! Host-facing facade.
//!
//! A [`Planner`] owns the room graph, the solver state machine and the pointer state behind one
//! `Rc<RefCell<_>>`. The tick callback it subscribes only holds a weak handle, so dropping the
//! planner (or tearing it down) is enough to silence it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::LayoutConfig;
use crate::controller::{Settled, SimulationController, StepOutcome, settle};
use crate::error::{Error, Result};
use crate::graph::relations::parse_edges;
use crate::graph::store::{NodeStore, ReconcileReport, unique_names};
use crate::graph::{Node, Vec2};
use crate::interaction::{InteractionController, PointerMove, Viewport};
use crate::snapshot::Snapshot;
use crate::teardown::{Teardown, TeardownReport};
use crate::ticker::{TickCallback, TickSource};

/// Receives frames and pointer feedback. Every method defaults to doing nothing.
pub trait FrameSink {
    fn redraw(&mut self, _snapshot: &Snapshot) {}

    /// `true` while a room is grabbed.
    fn grab_changed(&mut self, _grabbing: bool) {}

    fn hover_changed(&mut self, _room: Option<&str>) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FrameSink for NullSink {}

struct Shared {
    store: NodeStore,
    controller: SimulationController,
    interaction: InteractionController,
    viewport: Box<dyn Viewport>,
    sink: Box<dyn FrameSink>,
    last_outcome: Option<StepOutcome>,
    torn_down: bool,
}

impl Shared {
    fn redraw(&mut self) {
        let snapshot = Snapshot::capture(&self.store);
        self.sink.redraw(&snapshot);
    }

    fn on_tick(&mut self) {
        if self.torn_down {
            return;
        }
        let Shared {
            store,
            controller,
            sink,
            ..
        } = self;
        let outcome = controller.step(store, |store| sink.redraw(&Snapshot::capture(store)));
        self.last_outcome = Some(outcome);
    }
}

fn tick_callback(shared: &Rc<RefCell<Shared>>) -> TickCallback {
    let weak: Weak<RefCell<Shared>> = Rc::downgrade(shared);
    Box::new(move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let Ok(mut shared) = shared.try_borrow_mut() else {
            tracing::warn!("tick delivered while the planner is busy; skipped");
            return;
        };
        shared.on_tick();
    })
}

pub struct Planner {
    shared: Rc<RefCell<Shared>>,
    teardown: Teardown,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("Planner")
            .field("rooms", &shared.store.len())
            .field("controller", &shared.controller)
            .field("interaction", &shared.interaction)
            .field("torn_down", &shared.torn_down)
            .finish()
    }
}

impl Planner {
    pub fn new(
        config: LayoutConfig,
        ticks: Rc<dyn TickSource>,
        viewport: Box<dyn Viewport>,
    ) -> Result<Self> {
        config.validate()?;
        let shared = Rc::new(RefCell::new(Shared {
            store: NodeStore::new(config.room_width, config.room_height),
            controller: SimulationController::new(ticks, config.params, config.preview),
            interaction: InteractionController::new(),
            viewport,
            sink: Box::new(NullSink),
            last_outcome: None,
            torn_down: false,
        }));

        let mut teardown = Teardown::new();
        let weak = Rc::downgrade(&shared);
        teardown.push("tick subscription", move || {
            let Some(shared) = weak.upgrade() else {
                return Ok(());
            };
            let mut shared = shared.try_borrow_mut().map_err(|_| Error::Teardown {
                step: String::new(),
                message: "planner state is borrowed".to_string(),
            })?;
            shared.controller.stop();
            Ok(())
        });

        Ok(Self { shared, teardown })
    }

    pub fn with_sink(self, sink: Box<dyn FrameSink>) -> Self {
        self.shared.borrow_mut().sink = sink;
        self
    }

    pub fn set_viewport(&mut self, viewport: Box<dyn Viewport>) {
        self.shared.borrow_mut().viewport = viewport;
    }

    /// Re-parses the whole relation text, reconciles the room set against it, redraws and
    /// re-arms the solver unless a room is being dragged.
    pub fn set_relations(&mut self, text: &str) -> ReconcileReport {
        let report = {
            let mut shared = self.shared.borrow_mut();
            if shared.torn_down {
                return ReconcileReport::default();
            }
            let edges = parse_edges(text);
            let names = unique_names(&edges);
            let (width, height) = shared.viewport.size();
            shared.store.set_edges(edges);
            let report = shared.store.reconcile(&names, width, height);
            shared.redraw();
            report
        };
        self.rearm();
        report
    }

    /// Overrides one room's size. A name without a room keeps the size until it appears.
    pub fn set_room_size(&mut self, name: &str, width: f64, height: f64) -> bool {
        let applied = {
            let mut shared = self.shared.borrow_mut();
            if shared.torn_down {
                return false;
            }
            let applied = shared.store.set_size(name, width, height);
            if applied {
                shared.redraw();
            }
            applied
        };
        self.rearm();
        applied
    }

    fn rearm(&mut self) {
        if !self.is_dragging() {
            self.start();
        }
    }

    /// Idle → Running. No-op when already running, in preview mode, or after teardown.
    pub fn start(&mut self) -> bool {
        let callback = tick_callback(&self.shared);
        let mut shared = self.shared.borrow_mut();
        if shared.torn_down {
            return false;
        }
        shared.controller.start(callback)
    }

    pub fn stop(&mut self) -> bool {
        self.shared.borrow_mut().controller.stop()
    }

    pub fn is_running(&self) -> bool {
        self.shared.borrow().controller.is_running()
    }

    pub fn last_outcome(&self) -> Option<StepOutcome> {
        self.shared.borrow().last_outcome
    }

    /// Relaxes the layout synchronously, without waiting for ticks. The solver is left idle.
    pub fn settle(&mut self, max_ticks: u64) -> Settled {
        let mut shared = self.shared.borrow_mut();
        shared.controller.stop();
        let params = *shared.controller.params();
        let settled = settle(&mut shared.store, &params, max_ticks);
        shared.redraw();
        settled
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.shared.borrow().store)
    }

    pub fn room(&self, name: &str) -> Option<Node> {
        self.shared.borrow().store.node(name).cloned()
    }

    /// Read access to the room graph.
    pub fn inspect<R>(&self, f: impl FnOnce(&NodeStore) -> R) -> R {
        f(&self.shared.borrow().store)
    }

    pub fn is_dragging(&self) -> bool {
        self.shared.borrow().interaction.is_dragging()
    }

    pub fn hovered(&self) -> Option<String> {
        self.shared.borrow().interaction.hovered().map(str::to_string)
    }

    pub fn pointer_down(&mut self, device: Vec2) -> Option<String> {
        let mut guard = self.shared.borrow_mut();
        let shared = &mut *guard;
        if shared.torn_down {
            return None;
        }
        let grabbed = shared.interaction.pointer_down(
            &shared.store,
            &mut shared.controller,
            shared.viewport.as_ref(),
            device,
        );
        if grabbed.is_some() {
            shared.sink.grab_changed(true);
        }
        grabbed
    }

    pub fn pointer_move(&mut self, device: Vec2) -> PointerMove {
        let mut guard = self.shared.borrow_mut();
        let shared = &mut *guard;
        if shared.torn_down {
            return PointerMove::Ignored;
        }
        let moved = shared.interaction.pointer_move(
            &mut shared.store,
            shared.viewport.as_ref(),
            device,
        );
        match &moved {
            PointerMove::Dragged => shared.redraw(),
            PointerMove::HoverChanged(room) => shared.sink.hover_changed(room.as_deref()),
            PointerMove::Ignored => {}
        }
        moved
    }

    /// Releases the dragged room and resumes the solver. No-op without a drag.
    pub fn pointer_up(&mut self) -> bool {
        let callback = tick_callback(&self.shared);
        let mut guard = self.shared.borrow_mut();
        let shared = &mut *guard;
        if shared.torn_down {
            return false;
        }
        let released = shared
            .interaction
            .pointer_up(&mut shared.controller, callback);
        if released {
            shared.sink.grab_changed(false);
        }
        released
    }

    /// The pointer left the surface: ends any drag and clears hover.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
        let mut shared = self.shared.borrow_mut();
        if shared.interaction.clear_hover() {
            shared.sink.hover_changed(None);
        }
    }

    /// Adds a release step run by [`teardown`](Self::teardown), after the tick subscription.
    pub fn register_cleanup(
        &mut self,
        name: impl Into<String>,
        step: impl FnOnce() -> Result<()> + 'static,
    ) {
        self.teardown.push(name, step);
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.borrow().torn_down
    }

    /// Releases the tick subscription and every registered cleanup, once. Afterwards edits,
    /// pointer events and `start` are ignored.
    pub fn teardown(&mut self) -> TeardownReport {
        if let Ok(mut shared) = self.shared.try_borrow_mut() {
            shared.torn_down = true;
        }
        self.teardown.run()
    }
}

impl Drop for Planner {
    fn drop(&mut self) {
        if !self.teardown.is_done() {
            self.teardown();
        }
    }
}
