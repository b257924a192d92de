#![forbid(unsafe_code)]

//! Headless interactive room-adjacency layout engine.
//!
//! `narwhal` arranges named rectangles ("rooms") from free-text relations such as
//! `Kitchen => Dining`, relaxes them with a spring/repulsion/collision solver, and lets a host
//! drag a room while the solver is paused. It never draws: hosts read a [`Snapshot`] per tick.
//!
//! The host supplies the frame loop through [`TickSource`]; [`ManualTicker`] is a deterministic
//! implementation for tests and headless drivers.

pub mod algo;
pub mod config;
pub mod controller;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod planner;
pub mod snapshot;
pub mod teardown;
pub mod ticker;

pub use algo::{ConvergenceDetector, ForceModel, Integrator};
pub use config::{LayoutConfig, SimulationParams};
pub use controller::{RunState, Settled, SimulationController, StepOutcome};
pub use error::{Error, Result};
pub use graph::relations::{DroppedLine, parse_edges, parse_edges_with_diagnostics};
pub use graph::store::{NodeStore, ReconcileReport, unique_names};
pub use graph::{Edge, Node, Vec2};
pub use interaction::{InteractionController, PointerMove, ScreenViewport, Viewport};
pub use planner::{FrameSink, NullSink, Planner};
pub use snapshot::{RoomSnapshot, Snapshot};
pub use teardown::{Teardown, TeardownReport};
pub use ticker::{ManualTicker, Subscription, TickCallback, TickSource};
