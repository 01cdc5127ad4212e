// Listener registry - callbacks notified after every accepted snapshot

use futures_util::future::join_all;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::lcu::GameSnapshot;

pub type Listener = Arc<dyn Fn(Arc<GameSnapshot>) + Send + Sync + 'static>;

/// Returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
  pub fn id(&self) -> u64 {
    self.0
  }
}

#[derive(Default)]
pub struct ListenerRegistry {
  next_id: AtomicU64,
  entries: Mutex<Vec<(ListenerHandle, Listener)>>,
}

impl ListenerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn subscribe<F>(&self, listener: F) -> ListenerHandle
  where
    F: Fn(Arc<GameSnapshot>) + Send + Sync + 'static,
  {
    let handle = ListenerHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
    self.entries.lock().push((handle, Arc::new(listener)));
    handle
  }

  /// Returns false when the handle was not registered.
  pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
    let mut entries = self.entries.lock();
    let before = entries.len();
    entries.retain(|(h, _)| *h != handle);
    entries.len() != before
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }

  pub fn clear(&self) {
    self.entries.lock().clear();
  }

  /// Call every listener registered at the start of the pass.
  ///
  /// The registry lock is released before any callback runs, so listeners
  /// may subscribe or unsubscribe from inside a notification. Each callback
  /// runs on the blocking pool; one that panics or outlives `timeout` is
  /// logged and does not hold up the others. Returns how many completed.
  pub async fn notify(&self, snapshot: Arc<GameSnapshot>, timeout: Duration) -> usize {
    let listeners: Vec<(ListenerHandle, Listener)> = self.entries.lock().clone();

    let calls = listeners.into_iter().map(|(handle, listener)| {
      let snapshot = Arc::clone(&snapshot);
      async move {
        let task = tokio::task::spawn_blocking(move || listener(snapshot));
        match tokio::time::timeout(timeout, task).await {
          Ok(Ok(())) => true,
          Ok(Err(e)) => {
            warn!(listener = handle.id(), error = %e, "listener failed");
            false
          }
          Err(_) => {
            warn!(listener = handle.id(), ?timeout, "listener timed out");
            false
          }
        }
      }
    });

    join_all(calls).await.into_iter().filter(|ok| *ok).count()
  }
}
