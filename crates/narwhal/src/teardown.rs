//! Best-effort disposal.
//!
//! Each step releases one resource (a tick subscription, a host listener, ...). Steps run in
//! registration order, exactly once; a failing or panicking step is reported and the rest
//! still run.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::{Error, Result};

type Step = Box<dyn FnOnce() -> Result<()>>;

#[derive(Debug, Default)]
pub struct TeardownReport {
    /// Steps that completed.
    pub released: usize,
    pub failures: Vec<Error>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
pub struct Teardown {
    steps: Vec<(String, Step)>,
    done: bool,
}

impl std::fmt::Debug for Teardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Teardown")
            .field("pending", &self.steps.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("done", &self.done)
            .finish()
    }
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn pending(&self) -> usize {
        self.steps.len()
    }

    /// Registers a release step. After [`run`](Self::run) the step executes immediately and its
    /// outcome is only logged.
    pub fn push(&mut self, name: impl Into<String>, step: impl FnOnce() -> Result<()> + 'static) {
        let name = name.into();
        if self.done {
            if let Err(err) = run_step(&name, Box::new(step)) {
                tracing::warn!(error = %err, "late teardown step failed");
            }
            return;
        }
        self.steps.push((name, Box::new(step)));
    }

    /// Runs every pending step once. Later calls return an empty report.
    pub fn run(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        if self.done {
            return report;
        }
        self.done = true;

        for (name, step) in self.steps.drain(..) {
            match run_step(&name, step) {
                Ok(()) => report.released += 1,
                Err(err) => {
                    tracing::warn!(error = %err, "teardown step failed");
                    report.failures.push(err);
                }
            }
        }
        tracing::debug!(
            released = report.released,
            failed = report.failures.len(),
            "teardown finished"
        );
        report
    }
}

fn run_step(name: &str, step: Step) -> Result<()> {
    match catch_unwind(AssertUnwindSafe(step)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(Error::Teardown { message, .. })) => Err(Error::Teardown {
            step: name.to_string(),
            message,
        }),
        Ok(Err(err)) => Err(Error::Teardown {
            step: name.to_string(),
            message: err.to_string(),
        }),
        Err(payload) => Err(Error::Teardown {
            step: name.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
