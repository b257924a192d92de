use std::rc::Rc;

use crate::algo::{ConvergenceDetector, ForceModel, Integrator, TICK_DT};
use crate::config::SimulationParams;
use crate::graph::store::NodeStore;
use crate::ticker::{Subscription, TickCallback, TickSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// The layout settled after `ticks` steps since the last start.
    Converged { ticks: u64 },
    /// No rooms left.
    Empty,
}

/// Result of a synchronous [`settle`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub converged: bool,
    pub ticks: u64,
}

/// One solver step: forces (with collision passes), then integration.
pub fn advance(store: &mut NodeStore, params: &SimulationParams) {
    ForceModel::new(*params).apply(store, TICK_DT);
    Integrator::new(params).integrate(store, TICK_DT);
}

/// Relaxes `store` in place without a tick source, up to `max_ticks` steps.
pub fn settle(store: &mut NodeStore, params: &SimulationParams, max_ticks: u64) -> Settled {
    let detector = ConvergenceDetector::new(*params);
    if store.is_empty() {
        return Settled {
            converged: true,
            ticks: 0,
        };
    }
    for tick in 1..=max_ticks {
        advance(store, params);
        if detector.is_settled(store) {
            return Settled {
                converged: true,
                ticks: tick,
            };
        }
    }
    Settled {
        converged: false,
        ticks: max_ticks,
    }
}

/// Idle/Running state machine owning the tick subscription.
///
/// Nothing else subscribes to or unsubscribes from the tick source on the solver's behalf.
pub struct SimulationController {
    ticks: Rc<dyn TickSource>,
    subscription: Option<Subscription>,
    params: SimulationParams,
    preview: bool,
    elapsed: u64,
}

impl std::fmt::Debug for SimulationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationController")
            .field("state", &self.state())
            .field("params", &self.params)
            .field("preview", &self.preview)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

impl SimulationController {
    pub fn new(ticks: Rc<dyn TickSource>, params: SimulationParams, preview: bool) -> Self {
        Self {
            ticks,
            subscription: None,
            params,
            preview,
            elapsed: 0,
        }
    }

    pub fn state(&self) -> RunState {
        if self.subscription.is_some() {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Subscribes `on_tick` and becomes Running. Returns `false` (dropping `on_tick`) when
    /// already running or in preview mode.
    pub fn start(&mut self, on_tick: TickCallback) -> bool {
        if self.preview || self.is_running() {
            return false;
        }
        self.elapsed = 0;
        self.subscription = Some(self.ticks.subscribe(on_tick));
        tracing::debug!("simulation started");
        true
    }

    /// Releases the tick subscription. Safe to call in any state; returns whether it was running.
    pub fn stop(&mut self) -> bool {
        match self.subscription.take() {
            Some(subscription) => {
                subscription.unsubscribe();
                tracing::debug!(ticks = self.elapsed, "simulation stopped");
                true
            }
            None => false,
        }
    }

    /// Runs one tick: advance, `redraw`, then stop if the layout settled or emptied.
    pub fn step(&mut self, store: &mut NodeStore, redraw: impl FnOnce(&NodeStore)) -> StepOutcome {
        if store.is_empty() {
            self.stop();
            return StepOutcome::Empty;
        }

        advance(store, &self.params);
        self.elapsed += 1;
        redraw(store);

        if ConvergenceDetector::new(self.params).is_settled(store) {
            let ticks = self.elapsed;
            tracing::info!(ticks, rooms = store.len(), "layout converged");
            self.stop();
            return StepOutcome::Converged { ticks };
        }
        StepOutcome::Continue
    }
}
