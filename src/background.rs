// Background task executor
//
// A response is returned as soon as it is ready; work that must outlive it
// (cache stores) is handed to a BackgroundExecutor. Completion or failure of
// that work never changes the response already sent.

use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::watch;

pub trait BackgroundExecutor: Send + Sync {
    /// Run `task` detached from the current request
    fn spawn(&self, name: &'static str, task: BoxFuture<'static, ()>);
}

/// Spawns tasks on the current Tokio runtime and tracks how many are in flight
#[derive(Debug, Clone)]
pub struct TokioBackground {
    in_flight: Arc<watch::Sender<usize>>,
}

impl TokioBackground {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            in_flight: Arc::new(tx),
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Wait until every spawned task has finished
    pub async fn drain(&self) {
        let mut rx = self.in_flight.subscribe();
        // Err only if the sender is gone, which cannot happen while `self` lives
        let _ = rx.wait_for(|&count| count == 0).await;
    }
}

impl Default for TokioBackground {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight count when the task ends, even by panic
struct InFlightGuard {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

impl BackgroundExecutor for TokioBackground {
    fn spawn(&self, name: &'static str, task: BoxFuture<'static, ()>) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(task = name, error = %e, "No Tokio runtime; background task dropped");
                return;
            }
        };

        self.in_flight.send_modify(|count| *count += 1);
        let guard = InFlightGuard {
            in_flight: self.in_flight.clone(),
        };

        handle.spawn(async move {
            let _guard = guard;
            task.await;
            tracing::trace!(task = name, "Background task finished");
        });
    }
}
