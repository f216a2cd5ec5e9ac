//! Signal/slot system for picklist.
//!
//! Signals carry state-change notifications from the selection core to its
//! views. The core owns one [`Signal`] per event kind; a view connects a
//! slot (closure) to each signal it cares about and re-renders from the
//! payloads it receives.
//!
//! Dispatch is direct: the widget model is single-threaded and cooperative,
//! so every slot runs to completion inside the `emit` call that triggered
//! it, before the next operation is processed.
//!
//! ```
//! use picklist_core::Signal;
//!
//! // announces a finished filter pass: keyword and match count
//! let search_filtered = Signal::<(String, usize)>::new();
//!
//! let conn_id = search_filtered.connect(|(keyword, count)| {
//!     println!("{count} matches for {keyword:?}");
//! });
//!
//! search_filtered.emit(("apples".to_string(), 3));
//! search_filtered.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Identifies one signal-slot connection.
    ///
    /// Returned by [`Signal::connect`] and passed back to
    /// [`Signal::disconnect`]. Stays valid until the connection is removed
    /// or the signal is dropped.
    pub struct ConnectionId;
}

/// One connected slot.
struct Connection<Args> {
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

/// A typed signal with any number of connected slots.
///
/// Emitting invokes every connected slot with a reference to the payload,
/// in connection order. `Args` is the payload type; use `()` for signals
/// that carry no data and a tuple for several values at once.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether emission is temporarily suppressed.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// A signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot. The returned id removes exactly this connection when
    /// handed to [`disconnect`](Self::disconnect).
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let connection = Connection {
            slot: Arc::new(slot),
        };
        self.connections.lock().insert(connection)
    }

    /// Remove one connection. Returns whether it was still registered.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Remove every connection.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Suppress or resume emission. While blocked, `emit` does nothing;
    /// useful around batch updates that would otherwise cascade.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Whether emission is currently suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Invoke every connected slot with `&args`, unless blocked.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "picklist_core::signal", "signal blocked, skipping emit");
            return;
        }

        // Clone the slot handles out so a slot can connect/disconnect
        // without deadlocking on the connection table.
        let slots: Vec<Arc<dyn Fn(&Args) + Send + Sync>> = {
            let connections = self.connections.lock();
            tracing::trace!(
                target: "picklist_core::signal",
                connection_count = connections.len(),
                "emitting signal"
            );
            connections.iter().map(|(_, conn)| conn.slot.clone()).collect()
        };

        for slot in slots {
            slot(&args);
        }
    }

    /// Connect a slot that disconnects itself when the returned guard is
    /// dropped.
    ///
    /// # Safety
    ///
    /// The guard holds a raw pointer to this signal, which must outlive the
    /// guard. Keep the signal in an `Arc` when ownership is shared.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            signal: self as *const Signal<Args>,
            id,
        }
    }
}

/// RAII handle over one connection; dropping it disconnects.
///
/// Created via [`Signal::connect_scoped`]. Ties a subscription to the
/// lifetime of the receiver that holds the guard.
///
/// ```
/// use picklist_core::Signal;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let opened = Signal::<()>::new();
/// let seen = Arc::new(AtomicUsize::new(0));
/// {
///     let seen = seen.clone();
///     let _guard = opened.connect_scoped(move |_| {
///         seen.fetch_add(1, Ordering::SeqCst);
///     });
///     opened.emit(());
/// }
/// opened.emit(()); // the connection went with the guard
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
/// ```
pub struct ConnectionGuard<Args> {
    signal: *const Signal<Args>,
    id: ConnectionId,
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        // SAFETY: the guard's contract requires the signal to outlive it.
        unsafe {
            if !self.signal.is_null() {
                let _ = (*self.signal).disconnect(self.id);
            }
        }
    }
}

// SAFETY: the raw pointer is only dereferenced in drop(), the Signal itself
// is Send + Sync (connections live behind a Mutex), and the guard's contract
// requires the signal to outlive the guard.
unsafe impl<Args> Send for ConnectionGuard<Args> {}
unsafe impl<Args> Sync for ConnectionGuard<Args> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink = collected.clone();
        signal.connect(move |value: &T| sink.lock().push(value.clone()));
        collected
    }

    #[test]
    fn test_emit_reaches_connected_slot() {
        let signal = Signal::<usize>::new();
        let received = collector(&signal);

        signal.emit(4);
        signal.emit(7);

        assert_eq!(*received.lock(), vec![4, 7]);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let signal = Signal::<usize>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = received.clone();
        let conn_id = signal.connect(move |&value| sink.lock().push(value));

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        signal.emit(2);

        assert_eq!(*received.lock(), vec![1]);
        // a second disconnect of the same id finds nothing
        assert!(!signal.disconnect(conn_id));
    }

    #[test]
    fn test_blocked_emission_is_dropped() {
        let signal = Signal::<usize>::new();
        let received = collector(&signal);

        signal.emit(1);
        signal.set_blocked(true);
        assert!(signal.is_blocked());
        signal.emit(2); // suppressed, not queued
        signal.set_blocked(false);
        signal.emit(3);

        assert_eq!(*received.lock(), vec![1, 3]);
    }

    #[test]
    fn test_every_slot_runs_in_connection_order() {
        let signal = Signal::<usize>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let sink = received.clone();
            signal.connect(move |&v: &usize| sink.lock().push((name, v)));
        }
        assert_eq!(signal.connection_count(), 3);

        signal.emit(9);
        assert_eq!(
            *received.lock(),
            vec![("first", 9), ("second", 9), ("third", 9)]
        );
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<()>::new();
        for _ in 0..5 {
            signal.connect(|_| {});
        }

        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_guard_disconnects_on_drop() {
        let signal = Signal::<usize>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        {
            let sink = received.clone();
            let _guard = signal.connect_scoped(move |&value| sink.lock().push(value));
            signal.emit(1);
        }
        signal.emit(2); // the connection went with the guard

        assert_eq!(*received.lock(), vec![1]);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_unit_payload() {
        let signal = Signal::<()>::new();
        let fired = Arc::new(AtomicBool::new(false));

        let flag = fired.clone();
        signal.connect(move |_| flag.store(true, Ordering::SeqCst));

        signal.emit(());
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_tuple_payload() {
        let signal = Signal::<(String, usize)>::new();
        let received = collector(&signal);

        signal.emit(("apples".to_string(), 2));
        assert_eq!(*received.lock(), vec![("apples".to_string(), 2)]);
    }

    #[test]
    fn test_slot_can_disconnect_other_connections() {
        // a slot that tears down every connection must not deadlock the emit
        let signal = Arc::new(Signal::<()>::new());

        let handle = signal.clone();
        signal.connect(move |_| handle.disconnect_all());

        signal.emit(());
        assert_eq!(signal.connection_count(), 0);
    }
}
