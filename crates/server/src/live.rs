// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live circulation streaming support for front-desk UIs.
//!
//! Read-only, non-authoritative change notifications over WebSocket. An
//! event says that the canonical state changed, never what a client should
//! do about it.
//!
//! # Architecture
//!
//! - Every connected client receives every event
//! - Events are informational only and never authoritative
//! - No commands are executed over WebSocket connections
//! - No audit events are emitted for streaming activity
//! - Clients must still query canonical state via HTTP for authoritative data

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Maximum number of events to buffer in the broadcast channel.
/// If clients cannot keep up, older events will be dropped.
const EVENT_BUFFER_SIZE: usize = 100;

/// Live circulation event types.
///
/// Derived from successful state transitions. The audit log, not this
/// stream, is the record of what happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A catalog item was added.
    BookAdded {
        /// The serial number.
        serial: String,
    },
    /// A catalog item's details were updated.
    BookUpdated {
        /// The serial number.
        serial: String,
    },
    /// A member was registered.
    MemberRegistered {
        /// The generated membership number.
        membership_number: String,
    },
    /// A membership was extended.
    MembershipExtended {
        /// The membership number.
        membership_number: String,
        /// The new end date (ISO 8601).
        end_date: String,
    },
    /// A membership was cancelled.
    MembershipCancelled {
        /// The membership number.
        membership_number: String,
    },
    /// An item was issued to a member.
    BookIssued {
        /// The assigned loan identifier.
        loan_id: i64,
        /// The serial number.
        serial: String,
        /// The borrower's membership number.
        membership_number: String,
    },
    /// A borrowed item was returned.
    BookReturned {
        /// The loan identifier.
        loan_id: i64,
        /// The fine assessed, if the return was late.
        fine: Option<u32>,
    },
    /// A fine was paid.
    FinePaid {
        /// The loan identifier.
        loan_id: i64,
        /// The amount collected.
        amount: u32,
    },
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
}

/// Broadcaster for live circulation events.
///
/// A thin wrapper over `tokio::sync::broadcast` fanning state change
/// notifications out to every connected WebSocket client.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    /// The broadcast channel sender.
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    /// Creates a new event broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event to all connected clients.
    ///
    /// If no clients are connected, the event is silently dropped.
    /// This is non-blocking and will not wait for clients to receive the event.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast live event");
            }
            Err(_) => {
                // No receivers, which is fine
                debug!(?event, "No receivers for live event");
            }
        }
    }

    /// Subscribes to the event stream.
    ///
    /// Returns a receiver that will receive all future events.
    /// Events sent before subscription are not received.
    fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles WebSocket upgrade requests for live event streaming.
///
/// This handler:
/// - Accepts WebSocket upgrade requests
/// - Sends a connection confirmation event
/// - Streams all future live events to the client
/// - Handles client disconnections gracefully
///
/// # Arguments
///
/// * `ws` - WebSocket upgrade request
/// * `broadcaster` - The live event broadcaster from application state
///
/// # Returns
///
/// An HTTP response that upgrades the connection to WebSocket
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(broadcaster): AxumState<Arc<LiveEventBroadcaster>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

/// Handles an individual WebSocket connection.
///
/// Sends a connection confirmation, then streams all live events until
/// the client disconnects or an error occurs.
async fn handle_socket(socket: WebSocket, broadcaster: Arc<LiveEventBroadcaster>) {
    info!("Client connected to live event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

    // Send connection confirmation
    let connected_event = LiveEvent::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected_event)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    // Task for sending events to the client
    let mut send_task = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        // Client disconnected
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize live event");
                }
            }
        }
    });

    // Task for receiving messages from the client (though we don't expect any)
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    // We don't process commands over WebSocket
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Ping/pong handled automatically by Axum
                }
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!("Client disconnected from live event stream");
}
