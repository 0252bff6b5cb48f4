use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// Spaces out consecutive mutating calls against one API.
///
/// This is a pacing throttle, not a retry mechanism: every write waits until
/// `delay` has passed since the previous write finished. The first write is
/// never delayed.
pub struct Throttle {
    delay: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: Mutex::new(None),
        }
    }

    /// Runs `call` once the inter-call delay has elapsed, then restarts the clock
    pub async fn run<F, T>(&self, call: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                let remaining = self.delay - elapsed;
                trace!(remaining_ms = remaining.as_millis() as u64, "Throttling destination write");
                sleep(remaining).await;
            }
        }
        let result = call.await;
        *last_call = Some(Instant::now());
        result
    }
}
