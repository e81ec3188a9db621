//! Ordered listener sets with per-callback failure isolation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

/// Callbacks subscribed to one feature category's additions.
///
/// Registration is append-only: there is no de-duplication and no
/// unsubscribe, so registrations live until the engine is dropped.
/// Notification walks added entities first, then registered callbacks, so
/// every callback observes additions in the same deterministic order.
pub struct ListenerSet<H> {
    callbacks: RwLock<Vec<Arc<dyn Fn(H) + Send + Sync>>>,
}

impl<H: Clone> ListenerSet<H> {
    /// Create an empty listener set.
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// Append a callback to the notification order.
    pub fn register<F>(&self, callback: F)
    where
        F: Fn(H) + Send + Sync + 'static,
    {
        self.callbacks.write().push(Arc::new(callback));
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }

    /// Invoke every registered callback once per handle.
    ///
    /// The callback list is copied out before anything is invoked; no lock
    /// is held across a callback, so a callback may itself register new
    /// listeners without deadlocking (they only take effect for later
    /// notifications). A panicking callback is caught and logged; the
    /// remaining callbacks and handles are still notified.
    pub fn notify(&self, handles: &[H]) {
        if handles.is_empty() {
            return;
        }
        let callbacks: Vec<_> = self.callbacks.read().clone();

        for handle in handles {
            for (index, callback) in callbacks.iter().enumerate() {
                let handle = handle.clone();
                if catch_unwind(AssertUnwindSafe(|| callback(handle))).is_err() {
                    tracing::warn!(callback = index, "listener panicked during notification");
                }
            }
        }
    }
}

impl<H: Clone> Default for ListenerSet<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for ListenerSet<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("callbacks", &self.callbacks.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_notify_order_is_handle_then_registration() {
        let set = ListenerSet::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            set.register(move |n: u32| seen.lock().push((tag, n)));
        }

        set.notify(&[1, 2]);
        assert_eq!(
            *seen.lock(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
    }

    #[test]
    fn test_no_callbacks_is_a_no_op() {
        let set = ListenerSet::<u32>::new();
        set.notify(&[1, 2, 3]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_panicking_callback_is_isolated() {
        let set = ListenerSet::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        set.register(|_| panic!("bad listener"));
        {
            let seen = Arc::clone(&seen);
            set.register(move |n: u32| seen.lock().push(n));
        }

        set.notify(&[7, 8]);
        assert_eq!(*seen.lock(), vec![7, 8]);
    }

    #[test]
    fn test_registration_from_inside_a_callback() {
        let set = Arc::new(ListenerSet::<u32>::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_set = Arc::clone(&set);
        let inner_seen = Arc::clone(&seen);
        set.register(move |n: u32| {
            inner_seen.lock().push(n);
            let late_seen = Arc::clone(&inner_seen);
            inner_set.register(move |m: u32| late_seen.lock().push(m + 100));
        });

        // The callback registered mid-notification only fires next time.
        set.notify(&[1]);
        assert_eq!(*seen.lock(), vec![1]);

        set.notify(&[2]);
        assert_eq!(*seen.lock(), vec![1, 2, 102]);
    }
}
