// ═══════════════════════════════════════════════════════════════════════
// Session — one player's seat at one game
//
// Owns the local `GameState`, the service handle and the event
// subscription. All board mutation goes through here, one call at a
// time: clicks from the player, event lines from `pump`.
// ═══════════════════════════════════════════════════════════════════════

use crate::service::{topic, FeedMessage, GameService, ServiceError, Subscription};
use serde::{Deserialize, Serialize};
use stratego_engine::board::{Owner, Square};
use stratego_engine::catalog::Rank;
use stratego_engine::events::ReplayPolicy;
use stratego_engine::state::{ClickOutcome, GameId, GameState, Phase};
use stratego_engine::visibility::{player_view, PlayerView};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// First segment of the feed topic.
    pub topic_prefix: String,
    pub replay_policy: ReplayPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            topic_prefix: "games".to_string(),
            replay_policy: ReplayPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("no game id yet")]
    NoGame,
}

pub struct Session<S: GameService> {
    service: S,
    config: SessionConfig,
    state: GameState,
    subscription: Option<Subscription>,
}

impl<S: GameService> Session<S> {
    /// With `game_id` we join that game as guest; without it we host.
    pub fn new(service: S, game_id: Option<GameId>, config: SessionConfig) -> Session<S> {
        Session {
            service,
            config,
            state: GameState::new(game_id),
            subscription: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn view(&self) -> PlayerView {
        player_view(&self.state)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().map_or(false, Subscription::is_open)
    }

    // ── Setup ──────────────────────────────────────────────────────────

    pub fn click_bench(&mut self, rank: Rank) -> bool {
        self.state.click_bench(rank)
    }

    pub fn random_placement(&mut self) -> bool {
        self.state.random_placement()
    }

    pub fn shuffled_placement(&mut self, seed: u64) -> bool {
        self.state.shuffled_placement(seed)
    }

    /// Host: submit the layout and start listening. Ok(false) when the
    /// local state does not allow starting yet. Once the game exists a
    /// retry only re-opens the feed.
    #[instrument(skip(self), fields(player = %self.state.player))]
    pub fn start_game(&mut self) -> Result<bool, SessionError> {
        if self.state.phase == Phase::AwaitingOpponent {
            return self.reopen_feed();
        }
        if !self.state.can_start() {
            return Ok(false);
        }
        let positions = self.state.starting_positions();
        let id = self.service.create_game(&positions)?;
        self.state.mark_created(id.clone());
        self.open_feed(&id)?;
        Ok(true)
    }

    /// Guest: submit the layout for the known game id and start listening.
    /// Once joined a retry only re-opens the feed.
    #[instrument(skip(self), fields(player = %self.state.player))]
    pub fn join_game(&mut self) -> Result<bool, SessionError> {
        if self.state.player == Owner::Guest && self.state.has_started() {
            return self.reopen_feed();
        }
        if !self.state.can_join() {
            return Ok(false);
        }
        let Some(id) = self.state.game_id.clone() else {
            return Ok(false);
        };
        let positions = self.state.starting_positions();
        let confirmed = self.service.join_game(&id, &positions)?;
        self.state.mark_joined(confirmed.clone());
        self.open_feed(&confirmed)?;
        Ok(true)
    }

    fn reopen_feed(&mut self) -> Result<bool, SessionError> {
        if self.is_subscribed() {
            return Ok(false);
        }
        let id = self.state.game_id.clone().ok_or(SessionError::NoGame)?;
        self.open_feed(&id)?;
        Ok(true)
    }

    fn open_feed(&mut self, id: &GameId) -> Result<(), SessionError> {
        let topic = topic(&self.config.topic_prefix, id);
        // Replacing an old subscription drops it, which closes it
        self.subscription = Some(self.service.subscribe(&topic)?);
        info!(%topic, "listening for events");
        Ok(())
    }

    // ── Play ───────────────────────────────────────────────────────────

    /// Handle a board click. A legal move is forwarded to the service;
    /// its effect shows up later through `pump`.
    pub fn click_cell(&mut self, sq: Square) -> Result<ClickOutcome, SessionError> {
        let outcome = self.state.click_cell(sq);
        if let ClickOutcome::Move(intent) = outcome {
            let id = self.state.game_id.clone().ok_or(SessionError::NoGame)?;
            self.service.submit_move(&id, intent.from, intent.to)?;
        }
        Ok(outcome)
    }

    /// Apply every event delivered since the last call, in order.
    /// Returns how many lines were applied cleanly.
    pub fn pump(&mut self) -> usize {
        let Some(sub) = self.subscription.as_mut() else {
            return 0;
        };
        let mut applied = 0;
        for payload in sub.poll() {
            let line = FeedMessage::decode(&payload);
            match self.state.apply_message(&line, self.config.replay_policy) {
                Ok(_) => applied += 1,
                Err(err) => warn!(%line, error = %err, "event not applied"),
            }
        }
        applied
    }

    /// Stop listening. The state stays readable.
    pub fn close(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.close();
        }
    }
}
