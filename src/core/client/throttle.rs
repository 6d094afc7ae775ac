use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Enforces a minimum gap between the end of one call and the start of the next.
///
/// The gap is measured from completion, so slow or failed calls still count.
#[derive(Debug)]
pub(crate) struct Throttle {
    min_gap: Duration,
    last_done: Mutex<Option<Instant>>,
}

impl Throttle {
    pub(crate) fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_done: Mutex::new(None),
        }
    }

    pub(crate) fn min_gap(&self) -> Duration {
        self.min_gap
    }

    /// Runs `call` once the gap since the previous call has elapsed.
    ///
    /// The lock is held for the whole call, so requests never overlap.
    pub(crate) async fn run<F, T>(&self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut last = self.last_done.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_gap;
            let now = Instant::now();
            if ready_at > now {
                sleep(ready_at - now).await;
            }
        }
        let out = call.await;
        *last = Some(Instant::now());
        out
    }
}
