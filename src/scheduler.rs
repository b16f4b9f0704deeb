//! Delayed transitions with scope-based cancellation.
//!
//! A [`Scheduler`] turns "deliver this event after that delay" into a
//! spawned tokio sleep. Fired events land on a channel owned by the
//! coordinator, which applies them one at a time, so state is only ever
//! mutated from one place. Every timer belongs to a scope; cancelling the
//! scope (or dropping the scheduler) aborts its pending timers. Scopes whose
//! timers have all fired are forgotten on the next [`Scheduler::schedule`].

use core::hash::Hash;
use core::time::Duration;
use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Schedules events for delivery after a delay.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Scheduler<K, E> {
    /// Sender side of the event channel.
    events: mpsc::UnboundedSender<E>,
    /// Pending timers grouped by owning scope.
    scopes: HashMap<K, Vec<AbortHandle>>,
}

impl<K, E> Scheduler<K, E>
where
    K: Hash + Eq + Clone + core::fmt::Debug,
    E: Send + 'static,
{
    /// Creates a scheduler and the receiver its events are delivered to.
    #[inline]
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<E>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                events,
                scopes: HashMap::new(),
            },
            receiver,
        )
    }

    /// Delivers `event` after `delay`, unless `scope` is cancelled first.
    ///
    /// Timers in one scope with increasing delays fire in schedule order.
    #[inline]
    pub fn schedule(&mut self, scope: K, delay: Duration, event: E) {
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(event).is_err() {
                tracing::trace!("event receiver dropped before timer fired");
            }
        });
        self.prune();
        self.scopes
            .entry(scope)
            .or_default()
            .push(handle.abort_handle());
    }

    /// Forgets fired timers and the scopes left empty by them.
    #[inline]
    pub fn prune(&mut self) {
        self.scopes.retain(|_, timers| {
            timers.retain(|timer| !timer.is_finished());
            !timers.is_empty()
        });
    }

    /// Number of scopes currently tracked.
    #[inline]
    #[must_use]
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Aborts every pending timer in `scope`, returning how many were live.
    #[inline]
    pub fn cancel(&mut self, scope: &K) -> usize {
        let Some(timers) = self.scopes.remove(scope) else {
            return 0;
        };
        let live = timers.iter().filter(|timer| !timer.is_finished()).count();
        for timer in &timers {
            timer.abort();
        }
        tracing::debug!(scope = ?scope, cancelled = live, "cancelled scope timers");
        live
    }

    /// Number of timers in `scope` that have not fired yet.
    #[inline]
    #[must_use]
    pub fn pending(&self, scope: &K) -> usize {
        self.scopes.get(scope).map_or(0, |timers| {
            timers.iter().filter(|timer| !timer.is_finished()).count()
        })
    }

    /// Number of timers across all scopes that have not fired yet.
    #[inline]
    #[must_use]
    pub fn pending_total(&self) -> usize {
        self.scopes
            .values()
            .flatten()
            .filter(|timer| !timer.is_finished())
            .count()
    }
}

impl<K, E> Drop for Scheduler<K, E> {
    #[inline]
    fn drop(&mut self) {
        for timer in self.scopes.values().flatten() {
            timer.abort();
        }
    }
}
