// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Messenger channel for customer notifications.
//!
//! Notifications dispatched on [`Channel::Messenger`] are broadcast to every
//! connected WebSocket client. Each connection only forwards the messages
//! addressed to its own customer, and a delivery fails unless the addressed
//! customer has a socket open. The socket is push-only: nothing a client
//! sends is interpreted.

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    response::Response,
};
use clark::{DeliveryError, NotificationChannel};
use clark_domain::{Channel, CustomerId, Message};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::scope::CustomerScope;

/// Maximum number of messages to buffer in the broadcast channel.
/// Slow clients lose the oldest messages.
const MESSAGE_BUFFER_SIZE: usize = 256;

/// Frames pushed to a messenger client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessengerFrame {
    /// Sent once on connect.
    Connected {
        /// Server timestamp (RFC 3339).
        timestamp: String,
    },
    /// A customer notification.
    Notification {
        /// The notification template.
        template: String,
        /// Template variables.
        payload: BTreeMap<String, String>,
    },
}

/// Open sockets per customer.
type Connections = Arc<Mutex<BTreeMap<CustomerId, usize>>>;

/// Fans messenger notifications out to connected clients.
#[derive(Clone)]
pub struct MessengerHub {
    tx: broadcast::Sender<Message>,
    connections: Connections,
}

impl MessengerHub {
    /// Creates a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(MESSAGE_BUFFER_SIZE);
        Self {
            tx,
            connections: Arc::default(),
        }
    }

    /// Registers a socket for `customer_id` and subscribes it to every
    /// future message. The socket counts as connected until the returned
    /// subscription is dropped.
    fn subscribe(&self, customer_id: CustomerId) -> Subscription {
        *lock_connections(&self.connections)
            .entry(customer_id)
            .or_insert(0) += 1;
        Subscription {
            rx: self.tx.subscribe(),
            customer_id,
            connections: Arc::clone(&self.connections),
        }
    }

    /// Returns true if `customer_id` has at least one open socket.
    fn is_connected(&self, customer_id: CustomerId) -> bool {
        lock_connections(&self.connections).contains_key(&customer_id)
    }
}

impl Default for MessengerHub {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_connections(
    connections: &Mutex<BTreeMap<CustomerId, usize>>,
) -> MutexGuard<'_, BTreeMap<CustomerId, usize>> {
    // The map holds plain counters, so a poisoned lock is still consistent.
    connections.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A customer's socket registration and its broadcast receiver.
struct Subscription {
    rx: broadcast::Receiver<Message>,
    customer_id: CustomerId,
    connections: Connections,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut connections = lock_connections(&self.connections);
        if let Some(count) = connections.get_mut(&self.customer_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                connections.remove(&self.customer_id);
            }
        }
    }
}

impl NotificationChannel for MessengerHub {
    fn channel(&self) -> Channel {
        Channel::Messenger
    }

    /// Delivery succeeds when the addressed customer has a socket open.
    fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        if !self.is_connected(message.customer_id) {
            return Err(DeliveryError {
                channel: Channel::Messenger,
                reason: format!(
                    "no messenger client connected for customer {}",
                    message.customer_id
                ),
            });
        }
        match self.tx.send(message.clone()) {
            Ok(receivers) => {
                debug!(
                    customer_id = %message.customer_id,
                    template = %message.template,
                    receivers,
                    "messenger notification broadcast"
                );
                Ok(())
            }
            Err(_) => Err(DeliveryError {
                channel: Channel::Messenger,
                reason: String::from("no messenger client connected"),
            }),
        }
    }
}

/// Upgrades `GET /api/customer/messenger` to a WebSocket.
pub async fn messenger_handler(
    ws: WebSocketUpgrade,
    CustomerScope(customer_id): CustomerScope,
    AxumState(app_state): AxumState<AppState>,
) -> Response {
    let hub: MessengerHub = app_state.messenger.as_ref().clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub, customer_id))
}

async fn handle_socket(socket: WebSocket, hub: MessengerHub, customer_id: CustomerId) {
    info!(customer_id = %customer_id, "messenger client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut subscription: Subscription = hub.subscribe(customer_id);

    let connected: MessengerFrame = MessengerFrame::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
    };
    if let Ok(json) = serde_json::to_string(&connected)
        && sender.send(WsMessage::Text(json.into())).await.is_err()
    {
        warn!(customer_id = %customer_id, "failed to send messenger greeting");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            let message: Message = match subscription.rx.recv().await {
                Ok(message) => message,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(customer_id = %customer_id, skipped, "messenger client lagging");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if message.customer_id != customer_id {
                continue;
            }
            let frame: MessengerFrame = MessengerFrame::Notification {
                template: message.template,
                payload: message.payload,
            };
            match serde_json::to_string(&frame) {
                Ok(json) => {
                    if sender.send(WsMessage::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!(?e, "failed to serialize messenger frame"),
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(WsMessage::Text(_) | WsMessage::Binary(_)) => {
                    warn!("ignoring message from messenger client");
                }
                Ok(WsMessage::Close(_)) => break,
                Ok(WsMessage::Ping(_) | WsMessage::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "messenger receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!(customer_id = %customer_id, "messenger client disconnected");
}
