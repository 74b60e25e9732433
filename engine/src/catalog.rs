// ═══════════════════════════════════════════════════════════════════════
// Piece catalog — rank ordering, per-rank capacities, display labels
// Static data only. Nothing here changes during a game.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Rank ───────────────────────────────────────────────────────────────

/// A piece's type. Declaration order is the rank order: the discriminant of
/// Spy..=Marshal is its combat strength (1..=10). Bomb and Flag never attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Empty,
    Spy,
    Scout,
    Miner,
    Sergeant,
    Lieutenant,
    Captain,
    Major,
    Colonel,
    General,
    Marshal,
    Bomb,
    Flag,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Empty,
        Rank::Spy,
        Rank::Scout,
        Rank::Miner,
        Rank::Sergeant,
        Rank::Lieutenant,
        Rank::Captain,
        Rank::Major,
        Rank::Colonel,
        Rank::General,
        Rank::Marshal,
        Rank::Bomb,
        Rank::Flag,
    ];

    /// Every rank a player owns pieces of, in placement order (Spy..Flag).
    pub const PIECES: [Rank; 12] = [
        Rank::Spy,
        Rank::Scout,
        Rank::Miner,
        Rank::Sergeant,
        Rank::Lieutenant,
        Rank::Captain,
        Rank::Major,
        Rank::Colonel,
        Rank::General,
        Rank::Marshal,
        Rank::Bomb,
        Rank::Flag,
    ];

    /// Position in the rank order. Empty is 0, Flag is 12.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// How many pieces of this rank each player places.
    pub fn capacity(self) -> u8 {
        match self {
            Rank::Empty => 0,
            Rank::Spy => 1,
            Rank::Scout => 8,
            Rank::Miner => 5,
            Rank::Sergeant => 4,
            Rank::Lieutenant => 4,
            Rank::Captain => 4,
            Rank::Major => 3,
            Rank::Colonel => 2,
            Rank::General => 1,
            Rank::Marshal => 1,
            Rank::Bomb => 6,
            Rank::Flag => 1,
        }
    }

    /// Combat strength for ranks that can attack. None for Empty, Bomb, Flag.
    pub fn strength(self) -> Option<u8> {
        match self {
            Rank::Empty | Rank::Bomb | Rank::Flag => None,
            r => Some(r.index()),
        }
    }

    /// Bombs and flags stay where they were placed.
    pub fn is_movable(self) -> bool {
        self.strength().is_some()
    }

    pub fn is_empty(self) -> bool {
        self == Rank::Empty
    }

    /// Short board label: blank for Empty, an upper-case initial for
    /// Spy/Bomb/Flag, otherwise the strength as a number (Scout=2..Marshal=10).
    pub fn label(self) -> String {
        match self {
            Rank::Empty => " ".to_string(),
            Rank::Spy => "S".to_string(),
            Rank::Bomb => "B".to_string(),
            Rank::Flag => "F".to_string(),
            r => r.index().to_string(),
        }
    }

    /// Lower-case name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Rank::Empty => "empty",
            Rank::Spy => "spy",
            Rank::Scout => "scout",
            Rank::Miner => "miner",
            Rank::Sergeant => "sergeant",
            Rank::Lieutenant => "lieutenant",
            Rank::Captain => "captain",
            Rank::Major => "major",
            Rank::Colonel => "colonel",
            Rank::General => "general",
            Rank::Marshal => "marshal",
            Rank::Bomb => "bomb",
            Rank::Flag => "flag",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a wire name matches no rank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rank '{0}'")]
pub struct UnknownRank(pub String);

impl FromStr for Rank {
    type Err = UnknownRank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .iter()
            .copied()
            .find(|r| r.name() == s)
            .ok_or_else(|| UnknownRank(s.to_string()))
    }
}

// ── Free-function lookups ──────────────────────────────────────────────

/// Total pieces per player. Equals the size of one territory.
pub const PIECES_PER_PLAYER: u8 = 40;

pub fn rank_count(rank: Rank) -> u8 {
    rank.capacity()
}

pub fn display_label(rank: Rank) -> String {
    rank.label()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacities_sum_to_territory() {
        let total: u32 = Rank::ALL.iter().map(|r| r.capacity() as u32).sum();
        assert_eq!(total, PIECES_PER_PLAYER as u32);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Rank::Empty.label(), " ");
        assert_eq!(Rank::Spy.label(), "S");
        assert_eq!(Rank::Scout.label(), "2");
        assert_eq!(Rank::Marshal.label(), "10");
        assert_eq!(Rank::Bomb.label(), "B");
        assert_eq!(Rank::Flag.label(), "F");
    }

    #[test]
    fn test_name_roundtrip() {
        for r in Rank::ALL {
            assert_eq!(r.name().parse::<Rank>(), Ok(r));
        }
        assert!("king".parse::<Rank>().is_err());
    }
}
