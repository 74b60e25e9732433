// ═══════════════════════════════════════════════════════════════════════
// Game state — one player's local picture of a game
//
// The state machine:
//   Setup ──(host creates)──▶ AwaitingOpponent ──(started)──▶ InProgress
//   Setup ──(guest joins)──────────────────────────────────▶ InProgress
//   InProgress ──(wins)──▶ Finished
//
// The state never does I/O. Clicks return a `ClickOutcome`; when that is
// a move intent the caller forwards it to the remote service, and the
// service's event tokens come back through `apply_message` (events.rs).
// ═══════════════════════════════════════════════════════════════════════

use crate::board::{zone_owner, Board, Owner, Square};
use crate::catalog::Rank;
use crate::movement;
use crate::placement;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ── Identifiers ────────────────────────────────────────────────────────

/// Identifier the remote service assigns to a created game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        GameId(s.to_string())
    }
}

// ── Phase ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Pieces are being placed; no game id for the host yet.
    Setup,
    /// Host has submitted a layout and waits for a guest.
    AwaitingOpponent,
    InProgress,
    Finished,
}

// ── Click results ──────────────────────────────────────────────────────

/// A move the local player wants the service to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not our turn (or the game is over); nothing changed.
    Ignored,
    Selected(Square),
    Deselected,
    /// A legal move; selection has been cleared. Send it to the service.
    Move(MoveIntent),
}

// ── Game State ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: Option<GameId>,
    /// Local role. Host or Guest, fixed for the life of the state.
    pub player: Owner,
    /// Whose move it is. Never Owner::None.
    pub turn: Owner,
    pub phase: Phase,
    pub selected: Option<Square>,
    pub board: Board,
    /// Set by a `wins <side>` token.
    pub winner: Option<Owner>,
}

impl GameState {
    /// Joining an existing game (id known up front) makes us the guest;
    /// otherwise we are the host of a game yet to be created.
    pub fn new(game_id: Option<GameId>) -> GameState {
        let player = if game_id.is_some() { Owner::Guest } else { Owner::Host };
        GameState {
            game_id,
            player,
            turn: player,
            phase: Phase::Setup,
            selected: None,
            board: Board::new(),
            winner: None,
        }
    }

    pub fn opponent(&self) -> Owner {
        self.player.opponent()
    }

    pub fn is_my_turn(&self) -> bool {
        self.turn == self.player
    }

    pub fn has_started(&self) -> bool {
        self.phase == Phase::InProgress
    }

    /// Legality check for the local player, given current turn and phase.
    pub fn can_move(&self, from: Square, to: Square) -> bool {
        movement::can_move(&self.board, self.player, self.turn, self.has_started(), from, to)
    }

    // ── Setup ──────────────────────────────────────────────────────────

    /// Bench count of `rank` for the local player.
    pub fn remaining(&self, rank: Rank) -> u8 {
        placement::remaining(&self.board, rank, self.player)
    }

    /// Put a bench piece on the selected square. Only during setup, only
    /// onto our own territory, and only while pieces of that rank remain.
    pub fn click_bench(&mut self, rank: Rank) -> bool {
        if self.phase != Phase::Setup || rank.is_empty() {
            return false;
        }
        let Some(target) = self.selected else {
            return false;
        };
        if zone_owner(target.index()) != self.player
            || placement::can_place(&self.board, rank, self.player)
        {
            return false;
        }

        placement::place_bench_piece(&mut self.board, target, rank, self.player);
        debug!(square = %target, %rank, "placed bench piece");
        true
    }

    /// Fill our whole territory in catalog order. Setup only.
    pub fn random_placement(&mut self) -> bool {
        if self.phase != Phase::Setup {
            return false;
        }
        placement::random_placement(&mut self.board, self.player);
        true
    }

    /// Fill our territory with a seeded shuffle. Setup only.
    pub fn shuffled_placement(&mut self, seed: u64) -> bool {
        if self.phase != Phase::Setup {
            return false;
        }
        placement::shuffled_placement(&mut self.board, self.player, seed);
        true
    }

    pub fn starting_positions(&self) -> placement::StartingPositions {
        placement::starting_positions(&self.board, self.player)
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Host, host's turn, no id yet, all 40 host squares filled.
    pub fn can_start(&self) -> bool {
        self.player == Owner::Host
            && self.turn == Owner::Host
            && self.game_id.is_none()
            && self.phase == Phase::Setup
            && self.board.territory_full(Owner::Host)
    }

    /// The service accepted our layout. The guest moves first once joined
    /// (the `started` token hands the turn back to us).
    pub fn mark_created(&mut self, id: GameId) {
        debug!(game_id = %id, "game created");
        self.game_id = Some(id);
        self.turn = Owner::Guest;
        self.phase = Phase::AwaitingOpponent;
        self.selected = None;
    }

    /// Guest, id known, guest's turn, all 40 guest squares filled.
    pub fn can_join(&self) -> bool {
        self.player == Owner::Guest
            && self.turn == Owner::Guest
            && self.game_id.is_some()
            && self.phase == Phase::Setup
            && self.board.territory_full(Owner::Guest)
    }

    pub fn mark_joined(&mut self, id: GameId) {
        debug!(game_id = %id, "game joined");
        self.game_id = Some(id);
        self.turn = Owner::Host;
        self.phase = Phase::InProgress;
        self.selected = None;
    }

    // ── Selection ──────────────────────────────────────────────────────

    /// Handle a click on a board square.
    ///
    /// With nothing selected, clicking an own square selects it. Clicking
    /// the selected square again clears it. Clicking elsewhere tries a move
    /// from the selection; if that is illegal the selection jumps to the
    /// clicked square when it is ours, or is cleared otherwise.
    pub fn click_cell(&mut self, sq: Square) -> ClickOutcome {
        if !self.is_my_turn() || self.phase == Phase::Finished {
            return ClickOutcome::Ignored;
        }

        let own = self.board[sq].owner == self.player;
        match self.selected {
            None if own => {
                self.selected = Some(sq);
                ClickOutcome::Selected(sq)
            }
            None => ClickOutcome::Ignored,
            Some(sel) if sel == sq => {
                self.selected = None;
                ClickOutcome::Deselected
            }
            Some(sel) => {
                if self.can_move(sel, sq) {
                    self.selected = None;
                    debug!(from = %sel, to = %sq, "move intent");
                    ClickOutcome::Move(MoveIntent { from: sel, to: sq })
                } else if own {
                    self.selected = Some(sq);
                    ClickOutcome::Selected(sq)
                } else {
                    self.selected = None;
                    ClickOutcome::Deselected
                }
            }
        }
    }

    /// A selection must point at one of our own squares.
    pub(crate) fn drop_stale_selection(&mut self) {
        if let Some(sq) = self.selected {
            if self.board[sq].owner != self.player {
                self.selected = None;
            }
        }
    }
}
