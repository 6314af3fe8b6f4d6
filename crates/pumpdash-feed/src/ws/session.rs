/*
[INPUT]:  Feed endpoint URL, session config, caller commands
[OUTPUT]: Classified update payloads delivered to one handler, session status via `watch`
[POS]:    WebSocket layer - persistent connection lifecycle
[UPDATE]: When changing connect/close semantics or inbound dispatch
*/

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::codec::{self, ClientFrame, InboundFrame};
use super::feed::Feed;
use super::liveness::{DEFAULT_KEEPALIVE_INTERVAL, LivenessManager};
use crate::error::{FeedError, Result};
use crate::store::DashboardStore;
use crate::types::SessionStatus;

const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Consumer of classified update payloads
pub type UpdateHandler<P> = Box<dyn FnMut(P) + Send + 'static>;

/// Per-session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub keepalive_interval: Duration,
    pub outbound_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

/// One persistent connection to a feed endpoint.
///
/// `Connecting -> Open -> Closed`, or `Connecting -> Closed` when the connect
/// fails. `Closed` is terminal; open a new session to resume the feed.
/// Dropping the session closes it.
pub struct FeedSession<F: Feed> {
    endpoint: String,
    shared: Arc<SessionShared<F>>,
    outbound_tx: mpsc::Sender<ClientFrame>,
}

struct SessionShared<F: Feed> {
    id: Uuid,
    status: watch::Sender<SessionStatus>,
    liveness: Mutex<Option<LivenessManager>>,
    handler: Mutex<Option<UpdateHandler<F::Payload>>>,
    shutdown: CancellationToken,
}

impl<F: Feed> FeedSession<F> {
    /// Start connecting to `endpoint` (an absolute ws:// or wss:// URL).
    ///
    /// Returns right away in `Connecting`; must be called inside a Tokio
    /// runtime.
    pub fn open(endpoint: impl Into<String>, config: SessionConfig) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(FeedError::InvalidEndpoint("empty endpoint path".to_string()));
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(FeedError::Config(
                "FeedSession::open requires a Tokio runtime".to_string(),
            ));
        }

        let (status, _) = watch::channel(SessionStatus::Connecting);
        let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_capacity.max(1));

        let shared = Arc::new(SessionShared {
            id: Uuid::new_v4(),
            status,
            liveness: Mutex::new(None),
            handler: Mutex::new(None),
            shutdown: CancellationToken::new(),
        });

        debug!(feed = F::NAME, session_id = %shared.id, %endpoint, "opening feed session");

        let io = SessionIo {
            endpoint: endpoint.clone(),
            keepalive_interval: config.keepalive_interval,
            shared: shared.clone(),
            outbound_tx: outbound_tx.clone(),
            outbound_rx,
        };
        tokio::spawn(io.run());

        Ok(Self {
            endpoint,
            shared,
            outbound_tx,
        })
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status(&self) -> SessionStatus {
        *self.shared.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.shared.status.subscribe()
    }

    /// Queue a frame for the open channel.
    ///
    /// Never blocks. Fails with `NotOpen` unless the session is `Open`;
    /// nothing is buffered for later.
    pub fn send(&self, frame: ClientFrame) -> Result<()> {
        let status = self.status();
        if !status.is_open() {
            return Err(FeedError::NotOpen {
                status: status.to_string(),
            });
        }

        self.outbound_tx.try_send(frame).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => FeedError::SendQueueFull,
            mpsc::error::TrySendError::Closed(_) => {
                FeedError::WebSocket("session writer has stopped".to_string())
            }
        })
    }

    /// Register the consumer of update payloads, replacing any previous one.
    ///
    /// The handler runs on the session's I/O task, in frame arrival order. A
    /// handler may register its own replacement; the new one takes the next
    /// update.
    pub fn on_update<H>(&self, handler: H)
    where
        H: FnMut(F::Payload) + Send + 'static,
    {
        *lock(&self.shared.handler) = Some(Box::new(handler));
    }

    /// Route updates into `store` with this feed's merge rules
    pub fn bind_store(&self, store: DashboardStore) {
        let session_id = self.shared.id;
        self.on_update(move |payload| {
            if F::merge(&store, payload) {
                trace!(feed = F::NAME, %session_id, "store updated");
            }
        });
    }

    /// Close the session. Idempotent.
    pub fn close(&self) {
        if self.shared.mark_closed() {
            info!(feed = F::NAME, session_id = %self.shared.id, "feed session closed by caller");
        }
    }

    /// Wait until the connection is established.
    ///
    /// Errors when the session closed before ever opening.
    pub async fn opened(&self) -> Result<()> {
        let mut status = self.subscribe_status();
        let reached = status
            .wait_for(|status| *status != SessionStatus::Connecting)
            .await
            .map(|status| *status)
            .unwrap_or(SessionStatus::Closed);

        match reached {
            SessionStatus::Open => Ok(()),
            _ => Err(FeedError::WebSocket(format!(
                "{} session closed before opening",
                F::NAME
            ))),
        }
    }

    /// Wait until the session is closed, by either side
    pub async fn closed(&self) {
        let mut status = self.subscribe_status();
        let _ = status
            .wait_for(|status| *status == SessionStatus::Closed)
            .await;
    }

    pub fn liveness_running(&self) -> bool {
        lock(&self.shared.liveness)
            .as_ref()
            .is_some_and(LivenessManager::is_running)
    }
}

impl<F: Feed> Drop for FeedSession<F> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<F: Feed> fmt::Debug for FeedSession<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSession")
            .field("feed", &F::NAME)
            .field("id", &self.shared.id)
            .field("endpoint", &self.endpoint)
            .field("status", &self.status())
            .finish()
    }
}

impl<F: Feed> SessionShared<F> {
    /// `Connecting -> Open` plus liveness start, under the liveness lock so a
    /// concurrent close cannot leave a probe task behind.
    fn mark_open(&self, start_liveness: impl FnOnce() -> LivenessManager) -> bool {
        let mut liveness = lock(&self.liveness);
        if *self.status.borrow() != SessionStatus::Connecting {
            return false;
        }
        self.status.send_replace(SessionStatus::Open);
        *liveness = Some(start_liveness());
        true
    }

    /// Move to `Closed`, stop liveness, signal the I/O task. Returns whether
    /// this call did the transition.
    fn mark_closed(&self) -> bool {
        let mut liveness = lock(&self.liveness);
        let previous = self.status.send_replace(SessionStatus::Closed);
        if let Some(mut manager) = liveness.take() {
            manager.stop();
        }
        self.shutdown.cancel();
        previous != SessionStatus::Closed
    }

    fn dispatch(&self, text: &str) {
        match codec::classify_frame::<F::Payload>(F::NAME, text) {
            Some(InboundFrame::Pong) => {
                trace!(feed = F::NAME, session_id = %self.id, "pong received");
            }
            Some(InboundFrame::Update(payload)) => {
                // Run the handler outside the lock so `on_update` never waits on it.
                let taken = lock(&self.handler).take();
                let Some(mut handler) = taken else {
                    debug!(feed = F::NAME, session_id = %self.id, "update dropped, no handler");
                    return;
                };
                handler(payload);

                let mut slot = lock(&self.handler);
                if slot.is_none() {
                    *slot = Some(handler);
                }
            }
            None => {}
        }
    }
}

struct SessionIo<F: Feed> {
    endpoint: String,
    keepalive_interval: Duration,
    shared: Arc<SessionShared<F>>,
    outbound_tx: mpsc::Sender<ClientFrame>,
    outbound_rx: mpsc::Receiver<ClientFrame>,
}

impl<F: Feed> SessionIo<F> {
    async fn run(self) {
        let SessionIo {
            endpoint,
            keepalive_interval,
            shared,
            outbound_tx,
            mut outbound_rx,
        } = self;
        let session_id = shared.id;

        let connected = tokio::select! {
            _ = shared.shutdown.cancelled() => {
                shared.mark_closed();
                return;
            }
            result = connect_async(endpoint.as_str()) => result,
        };

        let ws_stream = match connected {
            Ok((ws_stream, _response)) => ws_stream,
            Err(err) => {
                warn!(feed = F::NAME, %session_id, %endpoint, error = %err, "feed connect failed");
                shared.mark_closed();
                return;
            }
        };
        let (mut write, mut read) = ws_stream.split();

        let opened = shared.mark_open(|| {
            LivenessManager::start(
                F::NAME,
                keepalive_interval,
                shared.status.subscribe(),
                outbound_tx.clone(),
            )
        });
        drop(outbound_tx);

        if !opened {
            let _ = write.send(WsMessage::Close(None)).await;
            return;
        }
        info!(feed = F::NAME, %session_id, %endpoint, "feed session open");

        loop {
            tokio::select! {
                _ = shared.shutdown.cancelled() => {
                    let _ = write.send(WsMessage::Close(None)).await;
                    break;
                }
                outbound = outbound_rx.recv() => {
                    match outbound {
                        Some(frame) => {
                            let text = match frame.encode() {
                                Ok(text) => text,
                                Err(err) => {
                                    warn!(feed = F::NAME, %session_id, error = %err, "failed to encode frame");
                                    continue;
                                }
                            };
                            if let Err(err) = write.send(WsMessage::Text(text.into())).await {
                                warn!(feed = F::NAME, %session_id, error = %err, "feed write failed");
                                break;
                            }
                        }
                        None => {
                            let _ = write.send(WsMessage::Close(None)).await;
                            break;
                        }
                    }
                }
                incoming = read.next() => {
                    match incoming {
                        Some(Ok(WsMessage::Text(text))) => shared.dispatch(text.as_str()),
                        Some(Ok(WsMessage::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                            Ok(text) => shared.dispatch(text),
                            Err(_) => debug!(feed = F::NAME, %session_id, bytes = bytes.len(), "non-utf8 binary frame dropped"),
                        },
                        Some(Ok(WsMessage::Close(frame))) => {
                            info!(feed = F::NAME, %session_id, ?frame, "feed closed by server");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            warn!(feed = F::NAME, %session_id, error = %err, "feed read failed");
                            break;
                        }
                        None => {
                            info!(feed = F::NAME, %session_id, "feed stream ended");
                            break;
                        }
                    }
                }
            }
        }

        shared.mark_closed();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
