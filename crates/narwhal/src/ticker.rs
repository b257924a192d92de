//! Frame-loop abstraction.
//!
//! Hosts hand the engine a [`TickSource`] instead of the engine reaching for a global animation
//! loop. [`ManualTicker`] delivers ticks only when asked, which makes stepping deterministic.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub type TickCallback = Box<dyn FnMut()>;

/// Handle to an active tick subscription. Releasing happens once, on [`unsubscribe`] or drop.
///
/// [`unsubscribe`]: Subscription::unsubscribe
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Per-frame callback registry supplied by the host render loop.
///
/// Implementations must never invoke a callback while a previous invocation of the same
/// callback is still running.
pub trait TickSource {
    fn subscribe(&self, callback: TickCallback) -> Subscription;
}

struct Slot {
    id: u64,
    /// `None` while the callback is executing.
    callback: Option<TickCallback>,
}

#[derive(Default)]
struct TickerInner {
    next_id: u64,
    slots: Vec<Slot>,
}

/// A [`TickSource`] driven by explicit [`tick`](ManualTicker::tick) calls.
///
/// Callbacks may unsubscribe themselves (or others) while running. Subscriptions made during a
/// tick first fire on the next one.
#[derive(Clone, Default)]
pub struct ManualTicker {
    inner: Rc<RefCell<TickerInner>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Delivers one tick to every current subscriber; returns how many callbacks ran.
    pub fn tick(&self) -> usize {
        let ids: Vec<u64> = self.inner.borrow().slots.iter().map(|s| s.id).collect();
        let mut ran = 0;
        for id in ids {
            let callback = {
                let mut inner = self.inner.borrow_mut();
                inner
                    .slots
                    .iter_mut()
                    .find(|s| s.id == id)
                    .and_then(|s| s.callback.take())
            };
            let Some(mut callback) = callback else {
                continue;
            };

            callback();
            ran += 1;

            // Unsubscribed while running: the callback must be dropped outside the borrow.
            let orphaned = {
                let mut inner = self.inner.borrow_mut();
                match inner.slots.iter_mut().find(|s| s.id == id) {
                    Some(slot) => {
                        slot.callback = Some(callback);
                        None
                    }
                    None => Some(callback),
                }
            };
            drop(orphaned);
        }
        ran
    }

    /// Ticks up to `max` times, stopping early once nobody is subscribed. Returns ticks delivered.
    pub fn run(&self, max: usize) -> usize {
        let mut delivered = 0;
        while delivered < max && self.subscriber_count() > 0 {
            self.tick();
            delivered += 1;
        }
        delivered
    }
}

impl TickSource for ManualTicker {
    fn subscribe(&self, callback: TickCallback) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.slots.push(Slot {
                id,
                callback: Some(callback),
            });
            id
        };

        let inner: Weak<RefCell<TickerInner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().slots.retain(|s| s.id != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn ticks_reach_subscribers_until_unsubscribed() {
        let ticker = ManualTicker::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = ticker.subscribe(Box::new(move || c.set(c.get() + 1)));

        assert_eq!(ticker.tick(), 1);
        assert_eq!(ticker.tick(), 1);
        sub.unsubscribe();
        assert_eq!(ticker.tick(), 0);
        assert_eq!(count.get(), 2);
        assert_eq!(ticker.subscriber_count(), 0);
    }

    #[test]
    fn dropping_the_subscription_releases_it() {
        let ticker = ManualTicker::new();
        {
            let _sub = ticker.subscribe(Box::new(|| {}));
            assert_eq!(ticker.subscriber_count(), 1);
        }
        assert_eq!(ticker.subscriber_count(), 0);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let ticker = ManualTicker::new();
        let holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let h = holder.clone();
        let sub = ticker.subscribe(Box::new(move || {
            h.borrow_mut().take();
        }));
        *holder.borrow_mut() = Some(sub);

        assert_eq!(ticker.tick(), 1);
        assert_eq!(ticker.subscriber_count(), 0);
        assert_eq!(ticker.tick(), 0);
    }

    #[test]
    fn nested_tick_does_not_reenter_a_running_callback() {
        let ticker = ManualTicker::new();
        let depth = Rc::new(Cell::new(0));
        let max_depth = Rc::new(Cell::new(0));
        let (t, d, m) = (ticker.clone(), depth.clone(), max_depth.clone());
        let _sub = ticker.subscribe(Box::new(move || {
            d.set(d.get() + 1);
            m.set(m.get().max(d.get()));
            t.tick();
            d.set(d.get() - 1);
        }));

        ticker.tick();
        assert_eq!(max_depth.get(), 1);
    }

    #[test]
    fn run_stops_when_idle() {
        let ticker = ManualTicker::new();
        assert_eq!(ticker.run(10), 0);
        let _sub = ticker.subscribe(Box::new(|| {}));
        assert_eq!(ticker.run(10), 10);
    }
}
