// ═══════════════════════════════════════════════════════════════════════
// Visibility / Information Model
//
// Stratego splits information between:
//   PUBLIC  — where every piece stands and who owns it, whose turn it
//             is, the phase, ranks revealed through combat
//   PRIVATE — the ranks of your own pieces, your bench, your selection
//   HIDDEN  — the ranks of opponent pieces not yet revealed
//
// This module produces the view a presentation layer draws from. It is
// safe to build from a full-information board (the authoritative
// service's): opponent ranks never appear unless revealed.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::{Board, Owner, Square};
use crate::catalog::Rank;
use crate::placement;
use crate::state::{GameId, GameState, Phase};
use serde::{Deserialize, Serialize};

/// The view of the game a specific player is allowed to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub viewer: Owner,
    pub game_id: Option<GameId>,
    pub turn: Owner,
    pub phase: Phase,
    pub winner: Option<Owner>,
    pub selected: Option<Square>,
    /// One entry per square, in index order.
    pub cells: Vec<CellView>,
    /// Pieces of each rank the viewer has not placed yet.
    pub bench: Vec<BenchSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellView {
    pub square: Square,
    pub owner: Owner,
    /// None when the square holds an opponent piece whose rank is hidden.
    pub rank: Option<Rank>,
    pub revealed: bool,
    pub water: bool,
}

impl CellView {
    /// Board label: the rank label, or "?" for a hidden piece.
    pub fn label(&self) -> String {
        match self.rank {
            Some(rank) => rank.label(),
            None => "?".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BenchSlot {
    pub rank: Rank,
    pub remaining: u8,
}

/// Per-square view of `board` for `viewer`.
pub fn board_view(board: &Board, viewer: Owner) -> Vec<CellView> {
    board
        .iter()
        .map(|(square, cell)| {
            let hidden = cell.owner.is_player() && cell.owner != viewer && !cell.revealed;
            CellView {
                square,
                owner: cell.owner,
                rank: if hidden { None } else { Some(cell.rank) },
                revealed: cell.revealed,
                water: square.is_water(),
            }
        })
        .collect()
}

pub fn player_view(state: &GameState) -> PlayerView {
    let bench = Rank::PIECES
        .iter()
        .map(|&rank| BenchSlot {
            rank,
            remaining: placement::remaining(&state.board, rank, state.player),
        })
        .collect();

    PlayerView {
        viewer: state.player,
        game_id: state.game_id.clone(),
        turn: state.turn,
        phase: state.phase,
        winner: state.winner,
        selected: state.selected,
        cells: board_view(&state.board, state.player),
        bench,
    }
}
