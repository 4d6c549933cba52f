//! Websocket subscriber connection

use axum::extract::ws::{Message, WebSocket};
use fanlog::Connection;
use futures_util::{SinkExt, StreamExt};
use std::io;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Lines queued for a subscriber before it counts as stalled.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// A log subscriber on the other end of a websocket.
///
/// Sends never block the logging thread: lines are queued and written as
/// text frames by a [`Forwarder`]. A send fails once the forwarder stops
/// (peer gone, socket error) or when the queue is full because the
/// subscriber stopped reading; either way the logger drops this connection.
#[derive(Debug)]
pub struct WebSocketConnection {
    lines: mpsc::Sender<String>,
}

/// Drives one websocket: writes queued lines, watches for the peer leaving.
#[derive(Debug)]
pub struct Forwarder {
    socket: WebSocket,
    lines: mpsc::Receiver<String>,
}

impl WebSocketConnection {
    /// Pair a connection with the forwarder that must be run for its lines
    /// to reach `socket`.
    pub fn new(socket: WebSocket) -> (Self, Forwarder) {
        Self::with_capacity(socket, DEFAULT_QUEUE_CAPACITY)
    }

    /// Like [`WebSocketConnection::new`], queueing at most `capacity` lines.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(socket: WebSocket, capacity: usize) -> (Self, Forwarder) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { lines: tx }, Forwarder { socket, lines: rx })
    }
}

impl Connection for WebSocketConnection {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        let text = text.strip_suffix('\n').unwrap_or(&text);

        self.lines.try_send(text.to_string()).map_err(|e| match e {
            TrySendError::Full(_) => {
                io::Error::new(io::ErrorKind::WouldBlock, "log subscriber is not keeping up")
            }
            TrySendError::Closed(_) => {
                io::Error::new(io::ErrorKind::BrokenPipe, "log subscriber disconnected")
            }
        })
    }
}

impl Forwarder {
    /// Run until the peer disconnects, the socket fails, or the connection
    /// is dropped. A dropped connection sends a close frame.
    pub async fn run(self) {
        let (mut sink, mut stream) = self.socket.split();
        let mut lines = self.lines;

        loop {
            tokio::select! {
                line = lines.recv() => {
                    let Some(line) = line else {
                        let _ = sink.send(Message::Close(None)).await;
                        debug!("Log subscriber replaced or logger dropped");
                        break;
                    };
                    if let Err(e) = sink.send(Message::Text(line.into())).await {
                        debug!("Failed to send log line: {}", e);
                        break;
                    }
                }
                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("Log subscriber closed the connection");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!("Log subscriber socket error: {}", e);
                        break;
                    }
                    // Subscribers have nothing to say.
                    Some(Ok(_)) => {}
                },
            }
        }
    }
}
