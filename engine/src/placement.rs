// ═══════════════════════════════════════════════════════════════════════
// Placement — moving pieces from the bench onto a player's territory
// before the game starts, and checking a submitted starting layout.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::{Board, Cell, Owner, Square};
use crate::catalog::{Rank, PIECES_PER_PLAYER};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use thiserror::Error;

/// Square index → rank for one territory, as sent when creating or joining.
pub type StartingPositions = BTreeMap<u8, Rank>;

/// True once every piece of `rank` is already on `owner`'s side.
/// Callers treat true as "blocked": nothing of this rank is left on the bench.
pub fn can_place(board: &Board, rank: Rank, owner: Owner) -> bool {
    board.count(rank, owner) == rank.capacity()
}

/// Pieces of `rank` still on `owner`'s bench.
pub fn remaining(board: &Board, rank: Rank, owner: Owner) -> u8 {
    rank.capacity().saturating_sub(board.count(rank, owner))
}

/// Overwrite `target` with a hidden piece. The caller has already checked
/// that `target` is a selected square of the owner's own territory.
pub fn place_bench_piece(board: &mut Board, target: Square, rank: Rank, owner: Owner) {
    board[target] = Cell::piece(rank, owner);
}

/// Fill the whole territory in rank order: spy first, then the scouts,
/// and so on, each rank taking exactly its capacity of consecutive squares.
pub fn random_placement(board: &mut Board, owner: Owner) {
    let mut squares = owner.territory();
    for rank in Rank::PIECES {
        for _ in 0..rank.capacity() {
            let Some(index) = squares.next() else { return };
            board.set(index, Cell::piece(rank, owner));
        }
    }
}

/// Same multiset as `random_placement`, shuffled across the territory.
/// The same seed always yields the same layout.
pub fn shuffled_placement(board: &mut Board, owner: Owner, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ranks: Vec<Rank> = Rank::PIECES
        .iter()
        .flat_map(|&r| std::iter::repeat(r).take(r.capacity() as usize))
        .collect();
    ranks.shuffle(&mut rng);

    for (index, rank) in owner.territory().zip(ranks) {
        board.set(index, Cell::piece(rank, owner));
    }
}

/// Ranks on `owner`'s territory, keyed by absolute square index.
pub fn starting_positions(board: &Board, owner: Owner) -> StartingPositions {
    owner
        .territory()
        .map(|i| (i as u8, board.cells()[i].rank))
        .collect()
}

// ── Layout validation ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{0} has no territory")]
    NoTerritory(Owner),
    #[error("square {0} is missing")]
    Missing(u8),
    #[error("square {square} is outside the {owner}'s territory")]
    OutsideTerritory { square: u8, owner: Owner },
    #[error("square {0} is empty")]
    EmptySquare(u8),
    #[error("{rank}: expected {expected} pieces, got {actual}")]
    WrongCount { rank: Rank, expected: u8, actual: u8 },
}

/// Check a submitted layout: all 40 territory squares, no empties,
/// per-rank counts exactly matching the catalog.
pub fn validate_layout(positions: &StartingPositions, owner: Owner) -> Result<(), LayoutError> {
    let territory = owner.territory();
    if territory.is_empty() {
        return Err(LayoutError::NoTerritory(owner));
    }

    if let Some(&square) = positions.keys().find(|&&k| !territory.contains(&(k as usize))) {
        return Err(LayoutError::OutsideTerritory { square, owner });
    }

    let mut counts: BTreeMap<Rank, u8> = BTreeMap::new();
    for i in territory {
        let square = i as u8;
        match positions.get(&square) {
            None => return Err(LayoutError::Missing(square)),
            Some(Rank::Empty) => return Err(LayoutError::EmptySquare(square)),
            Some(&rank) => *counts.entry(rank).or_insert(0) += 1,
        }
    }

    for rank in Rank::PIECES {
        let actual = counts.get(&rank).copied().unwrap_or(0);
        if actual != rank.capacity() {
            return Err(LayoutError::WrongCount { rank, expected: rank.capacity(), actual });
        }
    }

    debug_assert_eq!(counts.values().map(|&c| c as u32).sum::<u32>(), PIECES_PER_PLAYER as u32);
    Ok(())
}

/// Write a validated layout onto a board.
pub fn apply_layout(board: &mut Board, positions: &StartingPositions, owner: Owner) {
    for (&index, &rank) in positions {
        board.set(index as usize, Cell::piece(rank, owner));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_placement_fills_in_rank_order() {
        let mut board = Board::new();
        random_placement(&mut board, Owner::Host);
        assert_eq!(board.cells()[0].rank, Rank::Spy);
        assert_eq!(board.cells()[1].rank, Rank::Scout);
        assert_eq!(board.cells()[8].rank, Rank::Scout);
        assert_eq!(board.cells()[9].rank, Rank::Miner);
        assert_eq!(board.cells()[39].rank, Rank::Flag);
        // Guest side untouched
        assert!(board.cells()[60..].iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_shuffled_placement_is_seeded() {
        let mut a = Board::new();
        let mut b = Board::new();
        shuffled_placement(&mut a, Owner::Guest, 7);
        shuffled_placement(&mut b, Owner::Guest, 7);
        assert_eq!(a, b);
        assert!(validate_layout(&starting_positions(&a, Owner::Guest), Owner::Guest).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_counts() {
        let mut board = Board::new();
        random_placement(&mut board, Owner::Host);
        let mut positions = starting_positions(&board, Owner::Host);
        positions.insert(0, Rank::Marshal); // spy replaced by a second marshal
        assert_eq!(
            validate_layout(&positions, Owner::Host),
            Err(LayoutError::WrongCount { rank: Rank::Spy, expected: 1, actual: 0 })
        );
    }

    #[test]
    fn test_validate_rejects_foreign_square() {
        let mut board = Board::new();
        random_placement(&mut board, Owner::Host);
        let mut positions = starting_positions(&board, Owner::Host);
        positions.insert(60, Rank::Scout);
        assert_eq!(
            validate_layout(&positions, Owner::Host),
            Err(LayoutError::OutsideTerritory { square: 60, owner: Owner::Host })
        );
    }

    #[test]
    fn test_validate_rejects_missing_square() {
        let mut board = Board::new();
        random_placement(&mut board, Owner::Host);
        let mut positions = starting_positions(&board, Owner::Host);
        positions.remove(&7);
        assert_eq!(validate_layout(&positions, Owner::Host), Err(LayoutError::Missing(7)));
    }

    #[test]
    fn test_validate_rejects_empty_square() {
        let mut board = Board::new();
        random_placement(&mut board, Owner::Host);
        let mut positions = starting_positions(&board, Owner::Host);
        positions.insert(5, Rank::Empty);
        assert_eq!(validate_layout(&positions, Owner::Host), Err(LayoutError::EmptySquare(5)));
    }
}
