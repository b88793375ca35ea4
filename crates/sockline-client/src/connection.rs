//! WebSocket connection manager.
//!
//! Owns the connection lifecycle: establishment, the authorization
//! handshake, outage detection, bounded automatic reconnection with a
//! fixed delay, message buffering while disconnected, and the ordered
//! flush of buffered messages on reconnect.

use crate::client::WsHandle;
use crate::config::ClientConfig;
use crate::error::{WsError, WsResult};
use crate::queue::PendingQueue;
use crate::registry::SubscriberRegistry;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use sockline_core::{codec, Message};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex as TokioMutex};
use tokio_tungstenite::tungstenite::Error as TransportError;
use tokio_tungstenite::{connect_async, tungstenite::Message as Frame};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Frame>;
type WsSource = SplitStream<WsStream>;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// WebSocket connection manager.
///
/// The transport handle, the pending queue, the reconnect-attempt
/// counter, and the connection state are owned here and mutated only
/// from the `connect` event loop; the facade reaches the manager
/// through a channel and shared read-only views.
pub struct ConnectionManager {
    config: ClientConfig,
    state: Arc<RwLock<ConnectionState>>,
    reconnect_attempts: RwLock<u32>,
    queue: Mutex<PendingQueue>,
    registry: Arc<SubscriberRegistry>,
    outbound_tx: mpsc::UnboundedSender<Message>,
    /// Consumed only by the connect loop.
    outbound_rx: TokioMutex<mpsc::UnboundedReceiver<Message>>,
    shutdown_token: CancellationToken,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new(config: ClientConfig) -> WsResult<Self> {
        config.validate()?;
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Ok(Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Closed)),
            reconnect_attempts: RwLock::new(0),
            queue: Mutex::new(PendingQueue::new()),
            registry: Arc::new(SubscriberRegistry::new()),
            outbound_tx,
            outbound_rx: TokioMutex::new(outbound_rx),
            shutdown_token: CancellationToken::new(),
        })
    }

    /// Get a handle for sending messages and registering subscribers.
    ///
    /// The handle can be cloned and shared across tasks.
    pub fn handle(&self) -> WsHandle {
        WsHandle::new(
            self.outbound_tx.clone(),
            self.state.clone(),
            self.registry.clone(),
        )
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Whether the connection is currently open.
    pub fn connection_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Number of reconnect attempts scheduled since the last open.
    pub fn reconnect_attempts(&self) -> u32 {
        *self.reconnect_attempts.read()
    }

    /// Number of messages buffered for the next open.
    pub fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }

    /// Signal graceful teardown.
    ///
    /// Closes an open transport and cancels a pending reconnect delay;
    /// no reconnect fires after this.
    pub fn shutdown(&self) {
        info!("connection manager shutdown requested");
        self.shutdown_token.cancel();
    }

    /// Check if teardown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect and run the event loop until teardown or until the
    /// reconnect budget is exhausted.
    pub async fn connect(&self) -> WsResult<()> {
        let url = self.config.ws_url();

        loop {
            if self.is_shutdown() {
                *self.state.write() = ConnectionState::Closed;
                return Ok(());
            }

            *self.state.write() = ConnectionState::Connecting;

            match self.run_connection(&url).await {
                Ok(()) => info!("connection closed"),
                Err(e) => error!(%e, "connection error"),
            }

            *self.state.write() = ConnectionState::Closed;

            if self.is_shutdown() {
                info!("shutdown requested after disconnect, not reconnecting");
                return Ok(());
            }

            // Reconnect policy: the attempt budget is checked before
            // the counter is incremented.
            let attempts = *self.reconnect_attempts.read();
            if !self.config.auto_reconnect || attempts >= self.config.max_reconnect_attempts {
                error!(
                    attempts,
                    "failed to establish connection with server; check that the server accepts \
                     websocket connections"
                );
                return Err(WsError::ReconnectExhausted { attempts });
            }
            *self.reconnect_attempts.write() = attempts + 1;

            let delay = Duration::from_millis(self.config.auto_reconnect_timeout_ms);
            if self.config.debug {
                debug!(attempt = attempts + 1, delay_ms = delay.as_millis() as u64, "reconnecting");
            }

            self.wait_reconnect_delay(delay).await;
        }
    }

    /// Sleep out the fixed reconnect delay.
    ///
    /// The delay is cancellable by teardown, and sends arriving while
    /// we wait are moved into the pending queue.
    async fn wait_reconnect_delay(&self, delay: Duration) {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            let outbound_recv = async { self.outbound_rx.lock().await.recv().await };

            tokio::select! {
                () = &mut sleep => return,
                () = self.shutdown_token.cancelled() => return,
                outbound = outbound_recv => {
                    if let Some(message) = outbound {
                        self.enqueue_pending(message);
                    }
                }
            }
        }
    }

    /// Dial the server and run the open-state event loop.
    async fn run_connection(&self, url: &str) -> WsResult<()> {
        if self.config.debug {
            debug!(url, "connecting to websocket");
        }
        let (ws_stream, _response) = connect_async(url).await?;
        let (mut write, mut read) = ws_stream.split();

        // Sends that arrived while we were not open belong in the
        // queue, ahead of anything sent after this open.
        self.drain_channel_into_queue().await;

        *self.state.write() = ConnectionState::Open;
        *self.reconnect_attempts.write() = 0;
        info!("connection opened");

        // Authorization handshake goes out before any queued message.
        if let Some(token) = &self.config.auth_token {
            self.send_frame(&mut write, Message::authorization(token.clone()))
                .await?;
        }

        self.flush_pending(&mut write).await?;

        self.open_loop(&mut write, &mut read).await
    }

    /// Event loop while the connection is open.
    async fn open_loop(&self, write: &mut WsSink, read: &mut WsSource) -> WsResult<()> {
        loop {
            let outbound_recv = async { self.outbound_rx.lock().await.recv().await };

            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("shutdown requested, closing connection");
                    if let Err(e) = write.send(Frame::Close(None)).await {
                        warn!(%e, "failed to send close frame during shutdown");
                    }
                    return Ok(());
                }

                frame = read.next() => {
                    match frame {
                        Some(Ok(Frame::Text(text))) => self.handle_frame(&text),
                        Some(Ok(Frame::Ping(data))) => {
                            write.send(Frame::Pong(data)).await?;
                        }
                        Some(Ok(Frame::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "normal close".to_string()));
                            warn!(code, %reason, "connection closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            // Transport errors are diagnostics; the
                            // teardown they cause drives the state
                            // transition.
                            error!(%e, "transport error");
                            return Err(e.into());
                        }
                        None => {
                            warn!("websocket stream ended");
                            return Err(WsError::ConnectionClosed {
                                code: 1006,
                                reason: "stream ended".to_string(),
                            });
                        }
                        _ => {}
                    }
                }

                outbound = outbound_recv => {
                    if let Some(message) = outbound {
                        self.send_frame(write, message).await?;
                    }
                }
            }
        }
    }

    /// Decode one inbound frame and fan it out to subscribers.
    ///
    /// A malformed frame is logged and discarded; it never aborts the
    /// dispatch loop or the connection.
    fn handle_frame(&self, text: &str) {
        match codec::decode(text) {
            Ok(message) => {
                if self.config.debug {
                    debug!(kind = %message.kind, "received message");
                }
                self.registry.dispatch(&message);
            }
            Err(e) => warn!(%e, "discarding malformed inbound frame"),
        }
    }

    /// Encode and transmit one message.
    ///
    /// A transport write failure re-enqueues the message at the back
    /// of the pending queue and tears the connection down into the
    /// reconnect path, so it is resent on the next open.
    async fn send_frame<S>(&self, write: &mut S, message: Message) -> WsResult<()>
    where
        S: Sink<Frame, Error = TransportError> + Unpin,
    {
        let frame = match codec::encode(&message) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(%e, kind = %message.kind, "dropping unencodable message");
                return Ok(());
            }
        };

        if let Err(e) = write.send(Frame::Text(frame)).await {
            warn!(kind = %message.kind, "send failed, message queued to send later");
            self.queue.lock().push(message);
            return Err(e.into());
        }

        if self.config.debug {
            debug!(kind = %message.kind, "sent message");
        }
        Ok(())
    }

    /// Resend the buffered messages in their original order.
    ///
    /// No-op when nothing is buffered. The queue is snapshotted and
    /// cleared before the first resend, so a message enqueued during
    /// the flush is neither lost nor double-sent from this pass.
    async fn flush_pending<S>(&self, write: &mut S) -> WsResult<()>
    where
        S: Sink<Frame, Error = TransportError> + Unpin,
    {
        let pending = {
            let mut queue = self.queue.lock();
            if queue.is_empty() {
                return Ok(());
            }
            queue.drain_all()
        };
        info!(count = pending.len(), "resending queued messages");

        let mut pending = pending.into_iter();
        while let Some(message) = pending.next() {
            if let Err(e) = self.send_frame(write, message).await {
                // The failed message is already back in the queue;
                // keep the unsent remainder behind it, in order.
                let mut queue = self.queue.lock();
                for rest in pending {
                    queue.push(rest);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Move sends that accumulated in the channel while the
    /// connection was not open into the pending queue.
    async fn drain_channel_into_queue(&self) {
        let mut rx = self.outbound_rx.lock().await;
        while let Ok(message) = rx.try_recv() {
            self.enqueue_pending(message);
        }
    }

    fn enqueue_pending(&self, message: Message) {
        warn!(kind = %message.kind, "connection isn't open, message queued to send later");
        self.queue.lock().push(message);
    }
}
