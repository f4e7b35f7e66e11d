//! Sequential, rate-limited access to a [`RoadResolver`].
//!
//! Lookups are queued on a channel drained by a single worker task. The
//! worker runs one upstream call at a time and waits a fixed delay between
//! consecutive calls, so however many callers are waiting, the provider
//! sees at most one request per delay window.

use std::sync::Arc;
use std::time::Duration;

use pothole_admin_pothole_models::Coordinates;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{GeocodeError, RoadResolver};

/// Queue depth before callers start waiting on `send`.
const QUEUE_CAPACITY: usize = 64;

/// Extra pause after the provider answers HTTP 429.
const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);

struct Job {
    coords: Coordinates,
    reply: oneshot::Sender<Option<String>>,
}

/// Handle to the resolver worker.
pub struct ThrottledResolver {
    tx: mpsc::Sender<Job>,
    worker: JoinHandle<()>,
    delay: Duration,
}

impl ThrottledResolver {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(resolver: Arc<dyn RoadResolver>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let worker = tokio::spawn(run_worker(resolver, delay, rx));
        Self { tx, worker, delay }
    }

    /// The configured inter-call delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Queues a lookup and waits for its answer.
    ///
    /// Returns `None` when the provider knows no road, the lookup failed,
    /// or the worker has already shut down.
    pub async fn resolve(&self, coords: Coordinates) -> Option<String> {
        let (reply, answer) = oneshot::channel();
        if self.tx.send(Job { coords, reply }).await.is_err() {
            log::warn!("Road resolver worker is gone, skipping lookup");
            return None;
        }
        answer.await.ok().flatten()
    }

    /// Closes the queue and waits for the worker to drain what is left.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            log::warn!("Road resolver worker ended abnormally: {e}");
        }
    }
}

async fn run_worker(
    resolver: Arc<dyn RoadResolver>,
    delay: Duration,
    mut rx: mpsc::Receiver<Job>,
) {
    let mut next_allowed: Option<Instant> = None;

    while let Some(job) = rx.recv().await {
        if let Some(at) = next_allowed {
            tokio::time::sleep_until(at).await;
        }

        let started = Instant::now();
        let result = resolver.road_name(job.coords).await;
        next_allowed = Some(started + delay);

        let name = match result {
            Ok(Some(name)) => Some(name),
            Ok(None) => {
                log::debug!(
                    "{}: no road at {}",
                    resolver.id(),
                    job.coords.location_key()
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "{} lookup failed for {}: {e}",
                    resolver.id(),
                    job.coords.location_key()
                );
                if matches!(e, GeocodeError::RateLimited) {
                    log::warn!(
                        "Rate limited by {}, pausing {RATE_LIMIT_COOLDOWN:?}",
                        resolver.id()
                    );
                    next_allowed = Some(Instant::now() + RATE_LIMIT_COOLDOWN);
                }
                None
            }
        };

        // The caller may have gone away; its answer is simply dropped.
        let _ = job.reply.send(name);
    }

    log::debug!("{} resolver worker stopped", resolver.id());
}
