// ═══════════════════════════════════════════════════════════════════════
// Movement — move legality on the 10x10 grid
//
// Rules:
//   • orthogonal only, one square per move
//   • scouts may run any distance along an empty straight line
//   • bombs and flags never move
//   • no square on the path may be water
//   • no jumping over any occupant, friend or foe
//   • never land on your own piece
// Whether a landing becomes a capture is decided by the authoritative side
// (see combat.rs); here an occupied enemy square is just an Attack.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::{Board, Owner, Square, BOARD_WIDTH};
use crate::catalog::Rank;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Destination is empty.
    Move,
    /// Destination holds an opponent piece.
    Attack,
}

/// Why a candidate move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game has not started")]
    NotStarted,
    #[error("it is not the {0}'s turn")]
    NotYourTurn(Owner),
    #[error("there is no piece on square {0}")]
    NoPiece(Square),
    #[error("{0} can not move")]
    Immovable(Rank),
    #[error("piece on square {0} is not the mover's")]
    NotOwnPiece(Square),
    #[error("piece must move")]
    NoMovement,
    #[error("piece can not move diagonally")]
    Diagonal,
    #[error("{0} can not move more than one space")]
    TooFar(Rank),
    #[error("piece can not move through water at {0}")]
    Water(Square),
    #[error("piece can not move through the piece at {0}")]
    Blocked(Square),
    #[error("piece can not end on another piece owned by the {0}")]
    OwnDestination(Owner),
}

/// Every square on the straight line from `from` to `to`, both ends
/// included, in ascending index order. None unless the line is a single
/// row or a single column.
pub fn path(from: Square, to: Square) -> Option<Vec<Square>> {
    let vertical = from.row() != to.row();
    let horizontal = from.col() != to.col();
    if vertical && horizontal {
        return None;
    }

    let lo = from.index().min(to.index());
    let hi = from.index().max(to.index());
    let step = if vertical { BOARD_WIDTH as usize } else { 1 };
    Some((lo..=hi).step_by(step).filter_map(Square::new).collect())
}

/// Decide whether `player` may move the piece on `from` to `to`, and
/// whether it would be a plain move or an attack.
pub fn check_move(
    board: &Board,
    player: Owner,
    turn: Owner,
    started: bool,
    from: Square,
    to: Square,
) -> Result<MoveKind, MoveError> {
    if !started {
        return Err(MoveError::NotStarted);
    }
    if turn != player {
        return Err(MoveError::NotYourTurn(player));
    }

    let piece = board[from];
    if piece.is_empty() {
        return Err(MoveError::NoPiece(from));
    }
    if !piece.rank.is_movable() {
        return Err(MoveError::Immovable(piece.rank));
    }
    if piece.owner != player {
        return Err(MoveError::NotOwnPiece(from));
    }
    if from == to {
        return Err(MoveError::NoMovement);
    }

    let through = path(from, to).ok_or(MoveError::Diagonal)?;
    if through.len() > 2 && piece.rank != Rank::Scout {
        return Err(MoveError::TooFar(piece.rank));
    }

    let last = through.len() - 1;
    for (i, &sq) in through.iter().enumerate() {
        if sq.is_water() {
            return Err(MoveError::Water(sq));
        }
        if i != 0 && i != last && board[sq].is_occupied() {
            return Err(MoveError::Blocked(sq));
        }
    }

    let target = board[to];
    if target.owner == player {
        return Err(MoveError::OwnDestination(player));
    }
    if target.owner == player.opponent() {
        Ok(MoveKind::Attack)
    } else {
        Ok(MoveKind::Move)
    }
}

/// Boolean form of `check_move`; false means "pick another target".
pub fn can_move(
    board: &Board,
    player: Owner,
    turn: Owner,
    started: bool,
    from: Square,
    to: Square,
) -> bool {
    check_move(board, player, turn, started, from, to).is_ok()
}

/// Every square the piece on `from` may legally reach, assuming it is
/// `player`'s turn in a started game.
pub fn legal_targets(board: &Board, player: Owner, from: Square) -> Vec<Square> {
    Square::all()
        .filter(|&to| check_move(board, player, player, true, from, to).is_ok())
        .collect()
}
