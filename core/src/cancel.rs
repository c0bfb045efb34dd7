//! Caller-driven cancellation for in-flight requests.
//!
//! A `CancelHandle` fires its paired `CancelSignal`s. The client races the
//! signal against the transport and returns `ApiError::Cancelled` if the
//! signal wins. There are no internal timeouts; a deadline is a handle fired
//! from a timer.

use std::future;
use std::sync::Arc;

use tokio::sync::watch;

/// Create a connected handle/signal pair.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(Arc::new(tx)), CancelSignal(Some(rx)))
}

/// Fires every signal created from the same pair.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    /// Another signal observing this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal(Some(self.0.subscribe()))
    }
}

/// Observed by a client call; cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelSignal(Option<watch::Receiver<bool>>);

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self(None)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once the paired handle fires. Never resolves if the handle
    /// is dropped without firing.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.0 else {
            return future::pending().await;
        };
        let mut rx = rx.clone();
        let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
        if !fired {
            future::pending::<()>().await;
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::never()
    }
}
