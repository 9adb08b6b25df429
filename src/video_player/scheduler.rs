// SPDX-License-Identifier: MPL-2.0
//! Process-wide registry of live video instances and the global tick.
//!
//! The scheduler keeps an ordered table of weak references. Registration
//! order is iteration order. Instances are never kept alive by the table:
//! once every owner drops an instance, the next pass reaps its slot.
//!
//! # Locking
//!
//! - `pass` serialises whole `update_all` passes
//! - `slots` is held only to register, unregister or snapshot the table,
//!   never while an instance is stepped
//!
//! An instance's own lock is taken inside [`Tickable::advance`], after the
//! table lock has been released, so a caller holding an instance lock can
//! still register or unregister without deadlocking a concurrent pass.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use super::clock::TickOutcome;
use crate::config::PlaybackConfig;

static GLOBAL: OnceLock<Scheduler> = OnceLock::new();

/// Something the scheduler can advance by a time delta.
pub trait Tickable: Send + Sync {
    /// Advances by `dt_secs` if playing. Must not call back into the scheduler.
    fn advance(&self, dt_secs: f64) -> TickOutcome;
}

/// Registry slot identity of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Summary of one `update_all` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Live instances visited.
    pub visited: usize,
    /// Instances that were playing and advanced.
    pub ticked: usize,
    /// Instances that reached end-of-stream and stopped.
    pub finished: usize,
    /// Instances that wrapped around to the start.
    pub looped: usize,
    /// Dead slots removed before the pass.
    pub reaped: usize,
    /// Instances released between the snapshot and their step.
    pub missed: usize,
}

impl UpdateReport {
    fn record(&mut self, outcome: TickOutcome) {
        self.visited += 1;
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Advanced => self.ticked += 1,
            TickOutcome::Looped => {
                self.ticked += 1;
                self.looped += 1;
            }
            TickOutcome::Finished => {
                self.ticked += 1;
                self.finished += 1;
            }
        }
    }
}

struct Slot {
    id: InstanceId,
    instance: Weak<dyn Tickable>,
}

struct SchedulerInner {
    slots: Mutex<Vec<Slot>>,
    pass: Mutex<()>,
    next_id: AtomicU64,
    tick_interval_secs: f64,
}

/// Handle to an instance registry. Clones share the same table.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("instances", &self.instance_count())
            .field("tick_interval_secs", &self.inner.tick_interval_secs)
            .finish()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates an empty registry ticking at the default rate.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&PlaybackConfig::default())
    }

    /// Creates an empty registry whose `tick()` advances by `tick_interval_secs`.
    ///
    /// Non-finite or non-positive intervals fall back to the default rate.
    #[must_use]
    pub fn with_tick_interval(tick_interval_secs: f64) -> Self {
        let tick_interval_secs = if tick_interval_secs.is_finite() && tick_interval_secs > 0.0 {
            tick_interval_secs
        } else {
            PlaybackConfig::default().tick_interval_secs()
        };

        Self {
            inner: Arc::new(SchedulerInner {
                slots: Mutex::new(Vec::new()),
                pass: Mutex::new(()),
                next_id: AtomicU64::new(1),
                tick_interval_secs,
            }),
        }
    }

    /// Creates an empty registry from the `[playback]` settings.
    #[must_use]
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::with_tick_interval(config.tick_interval_secs())
    }

    /// Returns the process-wide scheduler, creating it with defaults on first use.
    pub fn global() -> &'static Scheduler {
        GLOBAL.get_or_init(Scheduler::new)
    }

    /// Configures the process-wide scheduler.
    ///
    /// Returns false if it already exists (first use wins).
    pub fn init_global(config: &PlaybackConfig) -> bool {
        GLOBAL.set(Scheduler::from_config(config)).is_ok()
    }

    /// Returns the interval `tick()` advances by, in seconds.
    #[must_use]
    pub fn tick_interval_secs(&self) -> f64 {
        self.inner.tick_interval_secs
    }

    /// Returns true if both handles point at the same table.
    #[must_use]
    pub fn same_as(&self, other: &Scheduler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn slots(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `instance` to the table and returns its id.
    ///
    /// Registering an instance that is already in the table returns its
    /// existing id.
    pub fn register<T>(&self, instance: &Arc<T>) -> InstanceId
    where
        T: Tickable + 'static,
    {
        let weak: Weak<T> = Arc::downgrade(instance);
        let weak: Weak<dyn Tickable> = weak;
        let mut slots = self.slots();

        if let Some(slot) = slots.iter().find(|slot| Weak::ptr_eq(&slot.instance, &weak)) {
            return slot.id;
        }

        let id = InstanceId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        slots.push(Slot { id, instance: weak });
        log::debug!("scheduler: registered instance {id} ({} live)", slots.len());
        id
    }

    /// Removes `id` from the table. Returns false if it was not registered.
    pub fn unregister(&self, id: InstanceId) -> bool {
        let mut slots = self.slots();
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        let removed = slots.len() != before;
        if removed {
            log::debug!("scheduler: unregistered instance {id}");
        }
        removed
    }

    /// Returns true if `id` is still in the table.
    #[must_use]
    pub fn is_registered(&self, id: InstanceId) -> bool {
        self.slots().iter().any(|slot| slot.id == id)
    }

    /// Returns the number of slots, including dead ones not yet reaped.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.slots().len()
    }

    /// Advances every live instance by `dt_secs`, exactly once, in
    /// registration order.
    ///
    /// Dead slots are reaped first. An instance released while the pass
    /// runs is counted as missed. Concurrent passes are serialised.
    pub fn update_all(&self, dt_secs: f64) -> UpdateReport {
        let _pass = self
            .inner
            .pass
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut report = UpdateReport::default();
        let snapshot: Vec<(InstanceId, Weak<dyn Tickable>)> = {
            let mut slots = self.slots();
            let before = slots.len();
            slots.retain(|slot| slot.instance.strong_count() > 0);
            report.reaped = before - slots.len();
            slots
                .iter()
                .map(|slot| (slot.id, Weak::clone(&slot.instance)))
                .collect()
        };

        for (id, weak) in snapshot {
            match weak.upgrade() {
                Some(instance) => report.record(instance.advance(dt_secs)),
                None => {
                    log::trace!("scheduler: instance {id} released mid-pass");
                    report.missed += 1;
                }
            }
        }

        if report.reaped > 0 {
            log::debug!("scheduler: reaped {} released instance(s)", report.reaped);
        }
        log::trace!("scheduler: pass dt={dt_secs:.6} {report:?}");
        report
    }

    /// Runs `update_all` with the configured tick interval.
    pub fn tick(&self) -> UpdateReport {
        self.update_all(self.inner.tick_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    /// Records every step into a shared journal.
    struct Probe {
        name: &'static str,
        journal: Arc<Mutex<Vec<(&'static str, f64)>>>,
        outcome: TickOutcome,
    }

    impl Tickable for Probe {
        fn advance(&self, dt_secs: f64) -> TickOutcome {
            self.journal.lock().unwrap().push((self.name, dt_secs));
            self.outcome
        }
    }

    fn probe(
        name: &'static str,
        journal: &Arc<Mutex<Vec<(&'static str, f64)>>>,
        outcome: TickOutcome,
    ) -> Arc<Probe> {
        Arc::new(Probe {
            name,
            journal: Arc::clone(journal),
            outcome,
        })
    }

    #[test]
    fn update_all_visits_in_registration_order_once() {
        let journal = Arc::default();
        let scheduler = Scheduler::new();
        let a = probe("a", &journal, TickOutcome::Advanced);
        let b = probe("b", &journal, TickOutcome::Idle);
        let c = probe("c", &journal, TickOutcome::Finished);
        for instance in [&a, &b, &c] {
            scheduler.register(instance);
        }

        let report = scheduler.update_all(0.5);

        assert_eq!(
            *journal.lock().unwrap(),
            vec![("a", 0.5), ("b", 0.5), ("c", 0.5)]
        );
        assert_eq!(report.visited, 3);
        assert_eq!(report.ticked, 2);
        assert_eq!(report.finished, 1);
    }

    #[test]
    fn register_is_idempotent() {
        let journal = Arc::default();
        let scheduler = Scheduler::new();
        let a = probe("a", &journal, TickOutcome::Advanced);

        let first = scheduler.register(&a);
        let second = scheduler.register(&a);

        assert_eq!(first, second);
        assert_eq!(scheduler.instance_count(), 1);
        scheduler.update_all(0.1);
        assert_eq!(journal.lock().unwrap().len(), 1);
    }

    #[test]
    fn dropped_instances_are_reaped_lazily() {
        let journal = Arc::default();
        let scheduler = Scheduler::new();
        let a = probe("a", &journal, TickOutcome::Advanced);
        let b = probe("b", &journal, TickOutcome::Advanced);
        scheduler.register(&a);
        scheduler.register(&b);

        drop(a);
        assert_eq!(scheduler.instance_count(), 2);

        let report = scheduler.update_all(0.1);
        assert_eq!(report.reaped, 1);
        assert_eq!(report.visited, 1);
        assert_eq!(scheduler.instance_count(), 1);
        assert_eq!(*journal.lock().unwrap(), vec![("b", 0.1)]);
    }

    #[test]
    fn unregister_removes_slot() {
        let journal = Arc::default();
        let scheduler = Scheduler::new();
        let a = probe("a", &journal, TickOutcome::Advanced);
        let id = scheduler.register(&a);

        assert!(scheduler.is_registered(id));
        assert!(scheduler.unregister(id));
        assert!(!scheduler.unregister(id));
        assert!(!scheduler.is_registered(id));

        let report = scheduler.update_all(0.1);
        assert_eq!(report.visited, 0);
        assert!(journal.lock().unwrap().is_empty());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let journal = Arc::default();
        let scheduler = Scheduler::new();
        let a = scheduler.register(&probe("a", &journal, TickOutcome::Idle));
        let b = scheduler.register(&probe("b", &journal, TickOutcome::Idle));
        assert!(b > a);
    }

    #[test]
    fn tick_uses_configured_interval() {
        let journal = Arc::default();
        let scheduler = Scheduler::with_tick_interval(0.25);
        let a = probe("a", &journal, TickOutcome::Advanced);
        scheduler.register(&a);

        scheduler.tick();
        assert_eq!(*journal.lock().unwrap(), vec![("a", 0.25)]);
    }

    #[test]
    fn invalid_interval_falls_back_to_default() {
        let scheduler = Scheduler::with_tick_interval(0.0);
        assert_abs_diff_eq!(scheduler.tick_interval_secs(), 1.0 / 90.0);
        let scheduler = Scheduler::with_tick_interval(f64::NAN);
        assert_abs_diff_eq!(scheduler.tick_interval_secs(), 1.0 / 90.0);
    }

    #[test]
    fn separate_schedulers_are_isolated() {
        let journal = Arc::default();
        let first = Scheduler::new();
        let second = Scheduler::new();
        let a = probe("a", &journal, TickOutcome::Advanced);
        first.register(&a);

        assert_eq!(second.update_all(0.1).visited, 0);
        assert!(!first.same_as(&second));
        assert!(first.same_as(&first.clone()));
    }

    #[test]
    fn global_is_a_single_table() {
        assert!(Scheduler::global().same_as(Scheduler::global()));
    }
}
