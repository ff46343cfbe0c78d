//! The callback table: one slot per event kind, last writer wins.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use wat_core::{EventKind, LifecycleError};
use wat_entity::{PlayerJoinEvent, SignChangeEvent};
use wat_heap::Shared;

/// A registered handler. It receives the only host stake in a freshly
/// built record and may mutate it in place, clone it, or deep copy it.
pub type Callback<E> = Arc<dyn Fn(&mut Shared<E>) + Send + Sync>;

/// One registration slot.
pub type Slot<E> = RwLock<Option<Callback<E>>>;

/// A record type that can be dispatched to a callback.
pub trait Event: Sized + 'static {
    /// Which slot of the registry serves this event.
    const KIND: EventKind;

    /// The registry slot for this event.
    fn slot(registry: &Registry) -> &Slot<Self>;
}

impl Event for SignChangeEvent {
    const KIND: EventKind = EventKind::SignChange;

    fn slot(registry: &Registry) -> &Slot<Self> {
        &registry.sign_change
    }
}

impl Event for PlayerJoinEvent {
    const KIND: EventKind = EventKind::PlayerJoin;

    fn slot(registry: &Registry) -> &Slot<Self> {
        &registry.player_join
    }
}

/// Event kind to callback table.
///
/// Registration takes the write lock; dispatch copies the callback out
/// under the read lock and invokes it unlocked, so a callback may register
/// or unregister handlers (including its own) while it runs.
pub struct Registry {
    sign_change: Slot<SignChangeEvent>,
    player_join: Slot<PlayerJoinEvent>,
}

impl Registry {
    /// An empty registry.
    pub const fn new() -> Self {
        Self {
            sign_change: RwLock::new(None),
            player_join: RwLock::new(None),
        }
    }

    /// Install `callback` for `E`, or clear the slot with `None`.
    ///
    /// Returns `true` if a previous callback was replaced or cleared.
    pub fn set<E: Event>(&self, callback: Option<Callback<E>>) -> bool {
        let installing = callback.is_some();
        let previous = {
            let mut slot = E::slot(self).write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, callback)
        };
        let replaced = previous.is_some();
        tracing::debug!(kind = %E::KIND, installing, replaced, "event callback slot updated");
        replaced
    }

    /// Install `callback` for `E`, replacing any previous one.
    pub fn register<E, F>(&self, callback: F) -> bool
    where
        E: Event,
        F: Fn(&mut Shared<E>) + Send + Sync + 'static,
    {
        self.set::<E>(Some(Arc::new(callback)))
    }

    /// Clear the slot for `E`.
    pub fn unregister<E: Event>(&self) -> bool {
        self.set::<E>(None)
    }

    /// `true` if a callback is installed for `E`.
    pub fn is_registered<E: Event>(&self) -> bool {
        self.callback::<E>().is_some()
    }

    /// Clear every slot.
    pub fn clear(&self) {
        self.unregister::<SignChangeEvent>();
        self.unregister::<PlayerJoinEvent>();
    }

    fn callback<E: Event>(&self) -> Option<Callback<E>> {
        E::slot(self)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Raise an event.
    ///
    /// With no callback for `E` nothing is built and `Ok(None)` is returned.
    /// Otherwise `build` produces the record, which is placed in a new cell
    /// (`ref_count == 1`) and handed to the callback. After the callback
    /// returns, `inspect` reads the outcome and the host stake is released.
    pub fn dispatch<E, R>(
        &self,
        build: impl FnOnce() -> Result<E, LifecycleError>,
        inspect: impl FnOnce(&E) -> Result<R, LifecycleError>,
    ) -> Result<Option<R>, LifecycleError>
    where
        E: Event,
    {
        let Some(callback) = self.callback::<E>() else {
            tracing::trace!(kind = %E::KIND, "no callback registered");
            return Ok(None);
        };
        let mut record = Shared::try_new(build()?)?;
        tracing::trace!(kind = %E::KIND, "dispatching event");
        callback(&mut record);
        let outcome = inspect(&record)?;
        if record.ref_count() > 1 {
            tracing::trace!(kind = %E::KIND, retained = record.ref_count() - 1, "callback retained event");
        }
        Ok(Some(outcome))
    }

    /// Raise an event without reading anything back.
    ///
    /// Returns `true` if a callback ran.
    pub fn fire<E: Event>(
        &self,
        build: impl FnOnce() -> Result<E, LifecycleError>,
    ) -> Result<bool, LifecycleError> {
        Ok(self.dispatch(build, |_| Ok(()))?.is_some())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("sign_change", &self.is_registered::<SignChangeEvent>())
            .field("player_join", &self.is_registered::<PlayerJoinEvent>())
            .finish()
    }
}

static GLOBAL: Registry = Registry::new();

/// The process-wide registry used by the C boundary.
pub fn global() -> &'static Registry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wat_heap::alloc::stats;

    #[test]
    fn empty_registry_dispatches_nothing() {
        let registry = Registry::new();
        let mut built = false;
        let result = registry.dispatch::<SignChangeEvent, ()>(
            || {
                built = true;
                Ok(SignChangeEvent::default())
            },
            |_| Ok(()),
        );
        assert_eq!(result, Ok(None));
        assert!(!built);
    }

    #[test]
    fn register_replaces_previous() {
        let registry = Registry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        assert!(!registry.register::<SignChangeEvent, _>(|_| {}));
        let counter = hits.clone();
        assert!(registry.register::<SignChangeEvent, _>(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
        registry.fire(|| Ok(SignChangeEvent::default())).unwrap();
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unregister_clears_slot() {
        let registry = Registry::new();
        registry.register::<PlayerJoinEvent, _>(|_| {});
        assert!(registry.is_registered::<PlayerJoinEvent>());
        assert!(registry.unregister::<PlayerJoinEvent>());
        assert!(!registry.is_registered::<PlayerJoinEvent>());
        assert!(!registry.unregister::<PlayerJoinEvent>());
    }

    #[test]
    fn slots_are_independent() {
        let registry = Registry::new();
        registry.register::<SignChangeEvent, _>(|_| {});
        assert!(!registry.is_registered::<PlayerJoinEvent>());
        registry.clear();
        assert!(!registry.is_registered::<SignChangeEvent>());
    }

    #[test]
    fn callback_holds_only_stake() {
        let registry = Registry::new();
        registry.register::<SignChangeEvent, _>(|event| {
            assert_eq!(event.ref_count(), 1);
            assert!(!event.cancel);
            event.get_mut().unwrap().cancel = true;
        });
        let cancelled = registry
            .dispatch(|| Ok(SignChangeEvent::default()), |e| Ok(e.cancel))
            .unwrap();
        assert_eq!(cancelled, Some(true));
    }

    #[test]
    fn host_stake_released_after_dispatch() {
        let registry = Registry::new();
        let before = stats();
        registry.register::<SignChangeEvent, _>(|_| {});
        registry.fire(|| Ok(SignChangeEvent::default())).unwrap();
        registry.clear();
        assert_eq!(stats().since(before).live(), 0);
    }

    #[test]
    fn retained_event_outlives_dispatch() {
        let registry = Registry::new();
        let kept: Arc<RwLock<Option<Shared<SignChangeEvent>>>> = Arc::new(RwLock::new(None));
        let sink = kept.clone();
        registry.register::<SignChangeEvent, _>(move |event| {
            *sink.write().unwrap() = Some(event.clone());
        });
        registry.fire(|| Ok(SignChangeEvent::default())).unwrap();
        let held = kept.write().unwrap().take().unwrap();
        assert_eq!(held.ref_count(), 1);
    }

    #[test]
    fn callback_may_reregister_itself() {
        let registry = Arc::new(Registry::new());
        let inner = registry.clone();
        registry.register::<SignChangeEvent, _>(move |_| {
            inner.unregister::<SignChangeEvent>();
        });
        assert!(registry.fire(|| Ok(SignChangeEvent::default())).unwrap());
        assert!(!registry.fire(|| Ok(SignChangeEvent::default())).unwrap());
    }

    #[test]
    fn build_failure_is_reported() {
        let registry = Registry::new();
        registry.register::<SignChangeEvent, _>(|_| panic!("must not run"));
        let err = registry
            .fire::<SignChangeEvent>(|| Err(LifecycleError::AllocationFailed { bytes: 8 }))
            .unwrap_err();
        assert_eq!(err, LifecycleError::AllocationFailed { bytes: 8 });
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn last_writer_wins(ops in proptest::collection::vec(0u8..4, 0..32)) {
                let registry = Registry::new();
                let hits = Arc::new(AtomicUsize::new(0));
                let mut expect_sign = false;
                let mut expect_join = false;
                for op in ops {
                    match op {
                        0 => {
                            let counter = hits.clone();
                            registry.register::<SignChangeEvent, _>(move |_| {
                                counter.fetch_add(1, Ordering::Relaxed);
                            });
                            expect_sign = true;
                        }
                        1 => {
                            registry.unregister::<SignChangeEvent>();
                            expect_sign = false;
                        }
                        2 => {
                            registry.register::<PlayerJoinEvent, _>(|_| {});
                            expect_join = true;
                        }
                        _ => {
                            registry.unregister::<PlayerJoinEvent>();
                            expect_join = false;
                        }
                    }
                }
                prop_assert_eq!(registry.is_registered::<SignChangeEvent>(), expect_sign);
                prop_assert_eq!(registry.is_registered::<PlayerJoinEvent>(), expect_join);
                let fired = registry.fire(|| Ok(SignChangeEvent::default())).unwrap();
                prop_assert_eq!(fired, expect_sign);
                prop_assert_eq!(hits.load(Ordering::Relaxed), usize::from(expect_sign));
            }
        }
    }
}
