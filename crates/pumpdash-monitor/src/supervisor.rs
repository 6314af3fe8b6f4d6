/*
[INPUT]:  Feed endpoint, session config, reconnect policy, shared store
[OUTPUT]: A continuously re-opened feed session + connection state notifications
[POS]:    Runtime layer - feed supervision (sessions themselves never reconnect)
[UPDATE]: When changing reconnection backoff or shutdown semantics
*/

use std::marker::PhantomData;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pumpdash_feed::{ClientFrame, DashboardStore, Feed, FeedSession, SessionConfig};

use crate::config::ReconnectConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected { retry_count: u32 },
    Connecting,
}

/// Handle to a running feed supervisor.
///
/// Dropping the handle shuts the supervisor down.
#[derive(Debug)]
pub struct FeedSupervisor {
    feed: &'static str,
    connection_state: watch::Receiver<ConnectionState>,
    cmd_tx: mpsc::UnboundedSender<ClientFrame>,
    shutdown: CancellationToken,
    worker_handle: Option<JoinHandle<()>>,
}

impl FeedSupervisor {
    /// Spawn a worker that keeps one `F` session bound to `store`.
    pub fn spawn<F: Feed>(
        endpoint: String,
        session_config: SessionConfig,
        reconnect: ReconnectConfig,
        store: DashboardStore,
        shutdown: CancellationToken,
    ) -> Self {
        let (state_tx, connection_state) =
            watch::channel(ConnectionState::Disconnected { retry_count: 0 });
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let worker = SupervisorWorker::<F> {
            endpoint,
            session_config,
            reconnect,
            store,
            cmd_rx,
            connection_state: state_tx,
            shutdown: shutdown.clone(),
            _feed: PhantomData,
        };

        Self {
            feed: F::NAME,
            connection_state,
            cmd_tx,
            shutdown,
            worker_handle: Some(tokio::spawn(worker.run())),
        }
    }

    pub fn feed(&self) -> &'static str {
        self.feed
    }

    /// Subscribe to connection state changes.
    pub fn subscribe_connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.connection_state.clone()
    }

    /// Forward a frame to the live session. Frames sent while connecting wait
    /// for the open; frames sent during a reconnect backoff are dropped.
    pub fn send(&self, frame: ClientFrame) {
        if self.cmd_tx.send(frame).is_err() {
            debug!(feed = self.feed, "supervisor stopped, frame dropped");
        }
    }

    /// Trigger a graceful shutdown of the worker.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Shut down and wait for the worker to exit
    pub async fn shutdown_and_wait(mut self) {
        self.shutdown();
        if let Some(handle) = self.worker_handle.take()
            && let Err(err) = handle.await
        {
            warn!(feed = self.feed, error = %err, "supervisor worker panicked");
        }
    }

    /// Wait for the worker to exit on its own (retries exhausted or reconnect disabled)
    pub async fn finished(&mut self) {
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FeedSupervisor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct SupervisorWorker<F: Feed> {
    endpoint: String,
    session_config: SessionConfig,
    reconnect: ReconnectConfig,
    store: DashboardStore,
    cmd_rx: mpsc::UnboundedReceiver<ClientFrame>,
    connection_state: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
    _feed: PhantomData<F>,
}

impl<F: Feed> SupervisorWorker<F> {
    async fn run(mut self) {
        let mut retry_count: u32 = 0;

        'run: loop {
            if self.shutdown.is_cancelled() {
                break 'run;
            }

            self.connection_state.send_replace(ConnectionState::Connecting);

            let session = match FeedSession::<F>::open(self.endpoint.clone(), self.session_config.clone()) {
                Ok(session) => session,
                Err(err) => {
                    warn!(feed = F::NAME, endpoint = %self.endpoint, error = %err, "feed session cannot be opened");
                    break 'run;
                }
            };
            session.bind_store(self.store.clone());

            let opened = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    session.close();
                    break 'run;
                }
                opened = session.opened() => opened,
            };

            match opened {
                Ok(()) => {
                    retry_count = 0;
                    self.connection_state.send_replace(ConnectionState::Connected);
                    info!(feed = F::NAME, session_id = %session.id(), "feed connected");

                    match self.stream_loop(&session).await {
                        StreamExit::Shutdown => {
                            session.close();
                            break 'run;
                        }
                        StreamExit::Disconnected => {
                            warn!(feed = F::NAME, session_id = %session.id(), "feed disconnected");
                        }
                    }
                }
                Err(err) => {
                    retry_count = retry_count.saturating_add(1);
                    warn!(feed = F::NAME, retry_count, error = %err, "feed connect failed");
                }
            }
            drop(session);

            self.connection_state
                .send_replace(ConnectionState::Disconnected { retry_count });

            if !self.reconnect.enabled {
                info!(feed = F::NAME, "reconnect disabled; feed stays down");
                return;
            }
            // Only failed connects count toward the limit; a dropped session
            // always gets at least one reconnect attempt.
            if let Some(max_retries) = self.reconnect.max_retries
                && retry_count > 0
                && retry_count >= max_retries
            {
                warn!(feed = F::NAME, retry_count, max_retries, "feed supervisor gave up reconnecting");
                return;
            }

            let backoff = backoff_duration(retry_count);
            debug!(feed = F::NAME, retry_count, ?backoff, "feed reconnect scheduled");

            let sleep = tokio::time::sleep(backoff);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break 'run,
                    _ = &mut sleep => break,
                    cmd = self.cmd_rx.recv() => {
                        match cmd {
                            Some(frame) => warn!(feed = F::NAME, ?frame, "feed disconnected, frame dropped"),
                            None => break 'run,
                        }
                    }
                }
            }
        }

        self.connection_state
            .send_replace(ConnectionState::Disconnected { retry_count });
    }

    async fn stream_loop(&mut self, session: &FeedSession<F>) -> StreamExit {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!(feed = F::NAME, "feed supervisor shutdown requested");
                    return StreamExit::Shutdown;
                }
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(frame) => {
                            if let Err(err) = session.send(frame) {
                                warn!(feed = F::NAME, error = %err, "failed to send frame");
                            }
                        }
                        None => return StreamExit::Shutdown,
                    }
                }
                _ = session.closed() => return StreamExit::Disconnected,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamExit {
    Disconnected,
    Shutdown,
}

fn backoff_duration(retry_count: u32) -> Duration {
    let exp = retry_count.saturating_sub(1).min(63);
    let secs = 1u64 << exp;
    Duration::from_secs(secs.min(30))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumpdash_feed::MarketFeed;

    #[test]
    fn backoff_clamps_at_30s() {
        assert_eq!(backoff_duration(0), Duration::from_secs(1));
        assert_eq!(backoff_duration(1), Duration::from_secs(1));
        assert_eq!(backoff_duration(2), Duration::from_secs(2));
        assert_eq!(backoff_duration(3), Duration::from_secs(4));
        assert_eq!(backoff_duration(5), Duration::from_secs(16));
        assert_eq!(backoff_duration(6), Duration::from_secs(30));
        assert_eq!(backoff_duration(40), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let mut supervisor = FeedSupervisor::spawn::<MarketFeed>(
            "ws://127.0.0.1:1/data/".to_string(),
            SessionConfig::default(),
            ReconnectConfig {
                enabled: true,
                max_retries: Some(2),
            },
            DashboardStore::new(),
            CancellationToken::new(),
        );
        let state = supervisor.subscribe_connection_state();

        tokio::time::timeout(Duration::from_secs(10), supervisor.finished())
            .await
            .expect("supervisor stops after two failed connects");
        assert_eq!(
            &*state.borrow(),
            &ConnectionState::Disconnected { retry_count: 2 }
        );
    }

    #[tokio::test]
    async fn reconnect_disabled_stops_after_first_failure() {
        let mut supervisor = FeedSupervisor::spawn::<MarketFeed>(
            "ws://127.0.0.1:1/data/".to_string(),
            SessionConfig::default(),
            ReconnectConfig {
                enabled: false,
                max_retries: None,
            },
            DashboardStore::new(),
            CancellationToken::new(),
        );
        let state = supervisor.subscribe_connection_state();

        tokio::time::timeout(Duration::from_secs(5), supervisor.finished())
            .await
            .expect("supervisor stops");
        assert_eq!(
            &*state.borrow(),
            &ConnectionState::Disconnected { retry_count: 1 }
        );
    }

    #[tokio::test]
    async fn shutdown_during_backoff_exits() {
        let shutdown = CancellationToken::new();
        let supervisor = FeedSupervisor::spawn::<MarketFeed>(
            "ws://127.0.0.1:1/data/".to_string(),
            SessionConfig::default(),
            ReconnectConfig::default(),
            DashboardStore::new(),
            shutdown.clone(),
        );

        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), supervisor.shutdown_and_wait())
            .await
            .expect("supervisor exits promptly");
    }
}
