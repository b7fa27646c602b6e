// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live audit notifications over WebSocket.
//!
//! Events are facts about state that has already been committed: an audit
//! was created, edited, completed or deleted, or a questionnaire version was
//! published. They are informational only. Listeners that need
//! authoritative data query the HTTP API.
//!
//! # Architecture
//!
//! - Events are broadcast to every connected listener the event is visible to
//! - `Company` operators only hear about completed audits of their own company
//! - No commands are accepted over the socket
//! - A completed-audit event carries the final score and category breakdown,
//!   so a notification consumer needs no follow-up query

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use callscore_api::{AuthenticatedActor, CategoryScoreInfo, Role};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::session::SessionOperator;

/// Maximum number of events to buffer in the broadcast channel.
/// Listeners that fall further behind lose the oldest events.
const EVENT_BUFFER_SIZE: usize = 100;

/// Live event types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A draft audit was created.
    AuditCreated {
        /// The audit id.
        audit_id: i64,
        /// The audited company.
        company_id: i64,
    },
    /// A draft audit's answers or metadata changed.
    AuditUpdated {
        /// The audit id.
        audit_id: i64,
        /// The audited company.
        company_id: i64,
    },
    /// An audit was completed and its score frozen.
    AuditCompleted {
        /// The audit id.
        audit_id: i64,
        /// The audited company.
        company_id: i64,
        /// The audited manager, if any.
        manager_id: Option<i64>,
        /// The final score as a percentage.
        total_score: f64,
        /// The frozen per-category breakdown.
        categories: Vec<CategoryScoreInfo>,
    },
    /// An audit was soft-deleted.
    AuditDeleted {
        /// The audit id.
        audit_id: i64,
        /// The audited company.
        company_id: i64,
    },
    /// A new questionnaire version was published.
    QuestionnaireVersionPublished {
        /// The questionnaire id.
        questionnaire_id: i64,
        /// The new version id.
        version_id: i64,
        /// The new version number.
        version_number: i32,
    },
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
}

impl LiveEvent {
    /// Whether a listener authenticated as `actor` may receive this event.
    #[must_use]
    pub fn is_visible_to(&self, actor: &AuthenticatedActor) -> bool {
        match actor.role {
            Role::Admin | Role::Analyst => true,
            Role::Company => match self {
                Self::AuditCompleted { company_id, .. } => actor.can_view_company(*company_id),
                Self::Connected { .. } => true,
                _ => false,
            },
        }
    }
}

/// Broadcaster for live events.
///
/// A thin wrapper around `tokio::sync::broadcast`.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    /// Creates a new event broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event to all connected listeners.
    ///
    /// Never blocks. With no listeners the event is dropped.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast live event");
            }
            Err(_) => {
                debug!(?event, "No receivers for live event");
            }
        }
    }

    /// Subscribes to events sent after this call.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Upgrades an authenticated request to a live event WebSocket.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    SessionOperator(actor, _operator): SessionOperator,
    AxumState(broadcaster): AxumState<Arc<LiveEventBroadcaster>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster, actor))
}

/// Streams events to one listener until either side goes away.
async fn handle_socket(
    socket: WebSocket,
    broadcaster: Arc<LiveEventBroadcaster>,
    actor: AuthenticatedActor,
) {
    info!(login_name = %actor.id, "Listener connected to live event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

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

    let listener: AuthenticatedActor = actor.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let event: LiveEvent = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live listener fell behind; events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if !event.is_visible_to(&listener) {
                continue;
            }
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize live event");
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!("Received unexpected message from listener, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Listener sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

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

    info!(login_name = %actor.id, "Listener disconnected from live event stream");
}
