//! Fixed-interval background loops with an explicit stop handle

use std::future::Future;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Owns a running loop. Stopping (or dropping) it aborts the loop and every
/// tick still in flight, so late replies are never merged.
pub struct PollHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        debug!(poller = self.name, "Stopping poller");
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run `tick` every `period`, first after one full period.
///
/// Each tick runs as its own task: a tick stuck on a hung call does not hold
/// back the next one.
pub fn spawn_periodic<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    in_flight.spawn(tick());
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            warn!(poller = name, "Poll tick panicked: {}", e);
                        }
                    }
                }
            }
        }
    });

    debug!(poller = name, period_ms = period.as_millis() as u64, "Started poller");
    PollHandle { name, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ticks_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handle = spawn_periodic("test", Duration::from_millis(10), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(75)).await;
        assert!(handle.is_running());
        handle.stop();

        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected several ticks, got {after_stop}");
        tokio::time::sleep(Duration::from_millis(50)).await;
        // a tick spawned just before the stop may still land
        assert!(count.load(Ordering::SeqCst) <= after_stop + 1);
    }

    #[tokio::test]
    async fn test_hung_tick_does_not_block_later_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handle = spawn_periodic("hung", Duration::from_millis(10), move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    std::future::pending::<()>().await;
                }
            }
        });

        tokio::time::sleep(Duration::from_millis(75)).await;
        assert!(count.load(Ordering::SeqCst) >= 3);
        drop(handle);
    }
}
