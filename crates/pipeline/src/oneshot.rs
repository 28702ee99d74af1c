//! Single-assignment synchronization cell
//!
//! A `OneShot` binds one producer to any number of consumers: `set`
//! succeeds exactly once, `get` awaits the value and returns
//! immediately on every call after it exists. This is the coordination
//! primitive between the connection's control handlers (producers) and
//! the pipeline builder / input loop (consumers).

use std::sync::Arc;

use tokio::sync::watch;

use crate::OneShotError;

/// A value set exactly once and readable any number of times
pub struct OneShot<T> {
    tx: watch::Sender<Option<Arc<T>>>,
}

impl<T> OneShot<T> {
    /// Create an empty cell
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Store the value, waking all pending `get` calls
    ///
    /// Returns an error if the cell was already set; the value is
    /// dropped in that case.
    pub fn set(&self, value: T) -> Result<(), OneShotError> {
        let mut result = Ok(());
        self.tx.send_modify(|slot| {
            if slot.is_some() {
                result = Err(OneShotError);
            } else {
                *slot = Some(Arc::new(value));
            }
        });
        result
    }

    /// Await the value
    ///
    /// Suspends until `set` is called; returns immediately once the
    /// value exists.
    pub async fn get(&self) -> Arc<T> {
        let mut rx = self.tx.subscribe();
        // The cell itself holds a sender, so the channel cannot close
        // while `self` is alive, and the predicate guarantees Some.
        let slot = rx
            .wait_for(|slot| slot.is_some())
            .await
            .expect("one-shot sender alive");
        slot.as_ref().map(Arc::clone).expect("one-shot value present")
    }

    /// The value, if it has been set
    pub fn try_get(&self) -> Option<Arc<T>> {
        self.tx.borrow().as_ref().map(Arc::clone)
    }

    /// True once `set` has succeeded
    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }
}

impl<T> Clone for OneShot<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Default for OneShot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for OneShot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneShot")
            .field("is_set", &self.is_set())
            .finish()
    }
}
