// ═══════════════════════════════════════════════════════════════════════
// Board model — 10x10 grid, ownership zones, water squares
//
// Layout (linear index, row-major, 10 columns):
//   0–39   host territory
//   40–59  neutral band, with water at 42 43 46 47 52 53 56 57
//   60–99  guest territory
// ═══════════════════════════════════════════════════════════════════════

use crate::catalog::Rank;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut, Range};
use std::str::FromStr;

pub const BOARD_SIZE: usize = 100;
pub const BOARD_WIDTH: u8 = 10;

pub const HOST_TERRITORY: Range<usize> = 0..40;
pub const NEUTRAL_ZONE: Range<usize> = 40..60;
pub const GUEST_TERRITORY: Range<usize> = 60..100;

/// The eight lake squares. Impassable, never hold a piece.
pub const WATER: [u8; 8] = [42, 43, 46, 47, 52, 53, 56, 57];

// ── Owner ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Host,
    Guest,
    None,
}

impl Owner {
    /// The other side. None has no opponent.
    pub fn opponent(self) -> Owner {
        match self {
            Owner::Host => Owner::Guest,
            Owner::Guest => Owner::Host,
            Owner::None => Owner::None,
        }
    }

    pub fn is_player(self) -> bool {
        self != Owner::None
    }

    /// Squares a side places its pieces on during setup. Empty for None.
    pub fn territory(self) -> Range<usize> {
        match self {
            Owner::Host => HOST_TERRITORY,
            Owner::Guest => GUEST_TERRITORY,
            Owner::None => 0..0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Owner::Host => "host",
            Owner::Guest => "guest",
            Owner::None => "none",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Owner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(Owner::Host),
            "guest" => Ok(Owner::Guest),
            "none" => Ok(Owner::None),
            other => Err(format!("unknown side '{}'", other)),
        }
    }
}

// ── Square ─────────────────────────────────────────────────────────────
// Compact, copyable board position. Always < BOARD_SIZE.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Square(u8);

impl Square {
    /// None if `index` is off the board.
    pub fn new(index: usize) -> Option<Square> {
        if index < BOARD_SIZE {
            Some(Square(index as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn row(self) -> u8 {
        self.0 / BOARD_WIDTH
    }

    pub fn col(self) -> u8 {
        self.0 % BOARD_WIDTH
    }

    pub fn is_water(self) -> bool {
        is_water(self.index())
    }

    /// Iterate all 100 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE as u8).map(Square)
    }
}

impl TryFrom<u8> for Square {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Square::new(value as usize).ok_or_else(|| format!("square {} is off the board", value))
    }
}

impl From<Square> for u8 {
    fn from(sq: Square) -> u8 {
        sq.0
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Square {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index: usize = s.parse().map_err(|_| format!("'{}' is not a square", s))?;
        Square::new(index).ok_or_else(|| format!("square {} is off the board", index))
    }
}

// ── Zone lookups ───────────────────────────────────────────────────────

pub fn is_water(index: usize) -> bool {
    WATER.iter().any(|&w| w as usize == index)
}

/// Host for 0–39, None for the neutral band, Guest for 60–99.
pub fn zone_owner(index: usize) -> Owner {
    if HOST_TERRITORY.contains(&index) {
        Owner::Host
    } else if GUEST_TERRITORY.contains(&index) {
        Owner::Guest
    } else {
        Owner::None
    }
}

// ── Cell ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub rank: Rank,
    pub owner: Owner,
    pub revealed: bool,
}

impl Cell {
    pub fn empty() -> Cell {
        Cell { rank: Rank::Empty, owner: Owner::None, revealed: false }
    }

    /// A freshly placed, hidden piece.
    pub fn piece(rank: Rank, owner: Owner) -> Cell {
        Cell { rank, owner, revealed: false }
    }

    pub fn is_empty(&self) -> bool {
        self.rank.is_empty()
    }

    /// Holds a piece, known or not. An opponent's piece whose identity
    /// this board never learned is rank Empty but still owned.
    pub fn is_occupied(&self) -> bool {
        !self.is_empty() || self.owner.is_player()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

// ── Board ──────────────────────────────────────────────────────────────

/// Exactly 100 cells. The length is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    /// Empty setup board: every cell empty, owned by its zone.
    pub fn new() -> Board {
        let cells = (0..BOARD_SIZE)
            .map(|i| Cell { rank: Rank::Empty, owner: zone_owner(i), revealed: false })
            .collect();
        Board { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells with their squares, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, &Cell)> {
        Square::all().zip(self.cells.iter())
    }

    /// Write a cell by raw index. Panics past the end, like slice indexing.
    pub fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    /// Clear a square back to an unowned empty cell.
    pub fn clear(&mut self, sq: Square) {
        self[sq] = Cell::empty();
    }

    /// Pieces of `rank` owned by `owner` anywhere on the board.
    pub fn count(&self, rank: Rank, owner: Owner) -> u8 {
        self.cells.iter().filter(|c| c.rank == rank && c.owner == owner).count() as u8
    }

    /// True when every square of `owner`'s territory holds a piece.
    pub fn territory_full(&self, owner: Owner) -> bool {
        let territory = owner.territory();
        !territory.is_empty() && self.cells[territory].iter().all(|c| !c.is_empty())
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Index<Square> for Board {
    type Output = Cell;

    fn index(&self, sq: Square) -> &Cell {
        &self.cells[sq.index()]
    }
}

impl IndexMut<Square> for Board {
    fn index_mut(&mut self, sq: Square) -> &mut Cell {
        &mut self.cells[sq.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_zones() {
        let board = Board::new();
        assert_eq!(board.cells().len(), BOARD_SIZE);
        for (sq, cell) in board.iter() {
            assert!(cell.is_empty());
            assert!(!cell.revealed);
            assert_eq!(cell.owner, zone_owner(sq.index()));
        }
    }

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(99).is_some());
        assert!(Square::new(100).is_none());
        assert_eq!("57".parse::<Square>().map(|s| s.index()), Ok(57));
        assert!("100".parse::<Square>().is_err());
        assert!("-1".parse::<Square>().is_err());
    }

    #[test]
    fn test_row_col() {
        let sq = Square::new(47).unwrap();
        assert_eq!(sq.row(), 4);
        assert_eq!(sq.col(), 7);
    }

    #[test]
    fn test_opponent() {
        assert_eq!(Owner::Host.opponent(), Owner::Guest);
        assert_eq!(Owner::Guest.opponent(), Owner::Host);
        assert_eq!(Owner::None.opponent(), Owner::None);
    }
}
