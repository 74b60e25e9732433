// ═══════════════════════════════════════════════════════════════════════
// Game Service — the remote collaborator a session talks to
//
// Outbound:  create_game, join_game, submit_move
// Inbound:   one ordered feed per game, on topic `<prefix>/<id>/moves`,
//            carrying `{"message": "<event token>"}` payloads.
//
// A session only ever holds the `Subscription` it was handed. Dropping
// or closing it ends delivery; the service notices on its next publish.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use stratego_engine::board::Square;
use stratego_engine::movement::MoveError;
use stratego_engine::placement::{LayoutError, StartingPositions};
use stratego_engine::state::GameId;
use thiserror::Error;
use tracing::debug;

/// Topic the event feed for `id` is published on.
pub fn topic(prefix: &str, id: &GameId) -> String {
    format!("{}/{}/moves", prefix, id)
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unknown game '{0}'")]
    UnknownGame(GameId),
    #[error("game '{0}' already has two players")]
    AlreadyJoined(GameId),
    #[error("game '{0}' is not in progress")]
    NotInProgress(GameId),
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("illegal move: {0}")]
    IllegalMove(#[from] MoveError),
    #[error("could not encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Requests a session makes. Every call may fail in transport; none are
/// retried here.
pub trait GameService {
    /// Submit the host's 40 placements and get the new game's id.
    fn create_game(&mut self, positions: &StartingPositions) -> Result<GameId, ServiceError>;

    /// Submit the guest's 40 placements. Returns the (re)confirmed id.
    fn join_game(&mut self, id: &GameId, positions: &StartingPositions) -> Result<GameId, ServiceError>;

    /// Ask the service to play a move. The outcome arrives on the feed.
    fn submit_move(&mut self, id: &GameId, from: Square, to: Square) -> Result<(), ServiceError>;

    fn subscribe(&mut self, topic: &str) -> Result<Subscription, ServiceError>;
}

/// Lets two sessions in one process share a service.
impl<T: GameService> GameService for Arc<Mutex<T>> {
    fn create_game(&mut self, positions: &StartingPositions) -> Result<GameId, ServiceError> {
        lock(self)?.create_game(positions)
    }

    fn join_game(&mut self, id: &GameId, positions: &StartingPositions) -> Result<GameId, ServiceError> {
        lock(self)?.join_game(id, positions)
    }

    fn submit_move(&mut self, id: &GameId, from: Square, to: Square) -> Result<(), ServiceError> {
        lock(self)?.submit_move(id, from, to)
    }

    fn subscribe(&mut self, topic: &str) -> Result<Subscription, ServiceError> {
        lock(self)?.subscribe(topic)
    }
}

fn lock<T>(shared: &Arc<Mutex<T>>) -> Result<std::sync::MutexGuard<'_, T>, ServiceError> {
    shared
        .lock()
        .map_err(|_| ServiceError::Unavailable("service lock poisoned".to_string()))
}

// ── Feed payload ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMessage {
    pub message: String,
}

impl FeedMessage {
    pub fn new(message: impl Into<String>) -> FeedMessage {
        FeedMessage { message: message.into() }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The event line inside a payload. Anything that is not a JSON
    /// envelope is taken as a bare line.
    pub fn decode(payload: &str) -> String {
        match serde_json::from_str::<FeedMessage>(payload) {
            Ok(msg) => msg.message,
            Err(_) => payload.trim().to_string(),
        }
    }
}

// ── Subscription ───────────────────────────────────────────────────────

/// An open feed. Owned by exactly one session.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    receiver: Option<Receiver<String>>,
}

impl Subscription {
    /// A subscription plus the sender a publisher keeps for it.
    pub fn channel(topic: &str) -> (Sender<String>, Subscription) {
        let (tx, rx) = mpsc::channel();
        let sub = Subscription { topic: topic.to_string(), receiver: Some(rx) };
        (tx, sub)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_open(&self) -> bool {
        self.receiver.is_some()
    }

    /// Payloads delivered since the last poll, oldest first.
    pub fn poll(&mut self) -> Vec<String> {
        match &self.receiver {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn close(&mut self) {
        if self.receiver.take().is_some() {
            debug!(topic = %self.topic, "subscription closed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
