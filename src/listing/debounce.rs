//! Trailing-edge debounce for free-text search input
//!
//! Each keystroke reschedules the publication of the latest text. Only the
//! value typed before a pause of at least the debounce window is published;
//! earlier pending publications are cancelled, never queued.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default quiet period before search text is committed
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// A single scheduled action that can be replaced or cancelled.
///
/// Scheduling a new action aborts the previous one, and dropping the timer
/// aborts whatever is still pending.
#[derive(Debug, Default)]
pub struct CancellableTimer {
    handle: Option<JoinHandle<()>>,
}

impl CancellableTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` after `delay`, cancelling any previously scheduled action.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    /// Abort the pending action. Returns `true` if one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CancellableTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Debounces raw search input into committed search text
#[derive(Debug)]
pub struct DebouncedSearch {
    delay: Duration,
    timer: CancellableTimer,
    committed: mpsc::UnboundedSender<String>,
}

impl DebouncedSearch {
    /// Create a controller and the receiver on which committed text arrives
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let search = Self {
            delay,
            timer: CancellableTimer::new(),
            committed: tx,
        };
        (search, rx)
    }

    /// Record the current text of the search field.
    ///
    /// An empty string (cleared field) is debounced like any other value.
    pub fn input(&mut self, text: impl Into<String>) {
        let text = text.into();
        let committed = self.committed.clone();
        self.timer.schedule(self.delay, async move {
            // Receiver gone means the listing was torn down
            let _ = committed.send(text);
        });
    }

    /// Drop any pending publication
    pub fn cancel(&mut self) -> bool {
        self.timer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }
}
