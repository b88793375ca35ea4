//! Mock WebSocket server for integration tests.
//!
//! Accepts connections, records received text frames, and can push
//! frames to connected clients or close them to trigger reconnects.

use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

enum ClientCommand {
    Send(String),
    Close,
}

/// A mock WebSocket server for testing.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    messages: Arc<Mutex<VecDeque<String>>>,
    connections: Arc<Mutex<u32>>,
    clients: Arc<Mutex<Vec<mpsc::UnboundedSender<ClientCommand>>>>,
}

impl MockWsServer {
    /// Start a new mock WebSocket server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let messages: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(VecDeque::new()));
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let clients: Arc<Mutex<Vec<mpsc::UnboundedSender<ClientCommand>>>> =
            Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let messages_clone = messages.clone();
        let connections_clone = connections.clone();
        let clients_clone = clients.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let messages = messages_clone.clone();
                        let connections = connections_clone.clone();
                        let clients = clients_clone.clone();
                        tokio::spawn(handle_connection(stream, messages, connections, clients));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            messages,
            connections,
            clients,
        }
    }

    /// Server address without a scheme, suitable for `ClientConfig`.
    pub fn server_url(&self) -> String {
        self.addr.to_string()
    }

    /// Get the number of connections received.
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Get all received text frames, in arrival order.
    pub async fn received_messages(&self) -> Vec<String> {
        self.messages.lock().await.iter().cloned().collect()
    }

    /// Push a text frame to every connected client.
    pub async fn send_to_clients(&self, text: impl Into<String>) {
        let text = text.into();
        for client in self.clients.lock().await.iter() {
            let _ = client.send(ClientCommand::Send(text.clone()));
        }
    }

    /// Close every connected client, triggering reconnect behavior.
    pub async fn close_clients(&self) {
        let mut clients = self.clients.lock().await;
        for client in clients.drain(..) {
            let _ = client.send(ClientCommand::Close);
        }
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    messages: Arc<Mutex<VecDeque<String>>>,
    connections: Arc<Mutex<u32>>,
    clients: Arc<Mutex<Vec<mpsc::UnboundedSender<ClientCommand>>>>,
) {
    {
        let mut count = connections.lock().await;
        *count += 1;
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {e}");
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();
    let (command_tx, mut command_rx) = mpsc::unbounded_channel::<ClientCommand>();
    clients.lock().await.push(command_tx);

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        messages.lock().await.push_back(text);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
            command = command_rx.recv() => {
                match command {
                    Some(ClientCommand::Send(text)) => {
                        let _ = write.send(Message::Text(text)).await;
                    }
                    Some(ClientCommand::Close) => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                    None => break,
                }
            }
        }
    }
}
