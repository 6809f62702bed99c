//! In-flight request tracking

use std::sync::Arc;

use tokio::sync::watch;

/// Counter of outstanding operations on one service.
///
/// Clones share the same counter. The count only changes through
/// [`LoadingGuard`]s, so every increment is paired with exactly one
/// decrement, whichever way the guarded operation exits.
#[derive(Debug, Clone)]
pub struct LoadingState {
    count: Arc<watch::Sender<usize>>,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingState {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    /// Mark one operation as started; it ends when the guard is dropped
    pub fn acquire(&self) -> LoadingGuard {
        self.count.send_modify(|count| *count += 1);
        LoadingGuard {
            count: Arc::clone(&self.count),
        }
    }

    pub fn count(&self) -> usize {
        *self.count.borrow()
    }

    pub fn is_loading(&self) -> bool {
        self.count() > 0
    }

    /// Watch the counter, e.g. to await idleness
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.count.subscribe()
    }
}

/// Releases its slot in the [`LoadingState`] on drop
#[derive(Debug)]
#[must_use = "the operation is only tracked while the guard is alive"]
pub struct LoadingGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.count.send_modify(|count| {
            debug_assert!(*count > 0, "loading counter underflow");
            *count = count.saturating_sub(1);
        });
    }
}
