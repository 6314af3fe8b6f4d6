/*
[INPUT]:  Session status updates and the session's outbound queue
[OUTPUT]: Periodic `ping` frames while the session is open
[POS]:    WebSocket layer - keep-alive scheduling
[UPDATE]: When changing probe cadence or cancellation semantics
*/

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::codec::ClientFrame;
use crate::types::SessionStatus;

/// Default probe cadence
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);

/// Owned keep-alive task for one session.
///
/// The first probe goes out immediately, then one per interval. Stopping is
/// synchronous and also happens on drop.
#[derive(Debug)]
pub struct LivenessManager {
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl LivenessManager {
    pub fn start(
        feed: &'static str,
        interval: Duration,
        status: watch::Receiver<SessionStatus>,
        outbound: mpsc::Sender<ClientFrame>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        // Closure can race the tick; skip quietly.
                        if !status.borrow().is_open() {
                            trace!(feed, "liveness probe skipped, session not open");
                            continue;
                        }
                        match outbound.try_send(ClientFrame::Ping) {
                            Ok(()) => trace!(feed, "liveness probe queued"),
                            Err(mpsc::error::TrySendError::Full(_)) => {
                                debug!(feed, "outbound queue full, liveness probe skipped");
                            }
                            Err(mpsc::error::TrySendError::Closed(_)) => break,
                        }
                    }
                }
            }
        });

        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for LivenessManager {
    fn drop(&mut self) {
        self.stop();
    }
}
