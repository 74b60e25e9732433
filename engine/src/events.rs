// ═══════════════════════════════════════════════════════════════════════
// Event tokens — the authoritative service's record of what happened
//
// Wire format: one line, whitespace separated, kind first.
//   started
//   moves   <from> <to>
//   attacks <from> <to>
//   defends <from> [<to>]
//   reveals <from> <to> <rank>
//   wins    [<side>]
//
// Lines are parsed into `EventToken` at the boundary; the replay below
// only ever sees typed tokens. Both players receive the same stream and
// replay it against their own board.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::{Cell, Owner, Square};
use crate::catalog::{Rank, UnknownRank};
use crate::state::{GameState, Phase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventToken {
    Started,
    Moves { from: Square, to: Square },
    /// Attacker won and took the square. Same board effect as Moves.
    Attacks { from: Square, to: Square },
    /// Attack failed; the piece on `from` is removed.
    Defends { from: Square, to: Option<Square> },
    /// Piece on `from` is removed and the piece on `to` shows its rank.
    Reveals { from: Square, to: Square, rank: Rank },
    Wins { winner: Option<Owner> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("empty event")]
    Empty,
    #[error("unknown event kind '{0}'")]
    UnknownKind(String),
    #[error("'{kind}' is missing argument {position}")]
    MissingArgument { kind: &'static str, position: usize },
    #[error("invalid square '{0}'")]
    BadSquare(String),
    #[error(transparent)]
    BadRank(#[from] UnknownRank),
}

impl EventToken {
    pub fn kind(&self) -> &'static str {
        match self {
            EventToken::Started => "started",
            EventToken::Moves { .. } => "moves",
            EventToken::Attacks { .. } => "attacks",
            EventToken::Defends { .. } => "defends",
            EventToken::Reveals { .. } => "reveals",
            EventToken::Wins { .. } => "wins",
        }
    }
}

fn square_arg(args: &[&str], kind: &'static str, position: usize) -> Result<Square, EventError> {
    let raw = args
        .get(position)
        .ok_or(EventError::MissingArgument { kind, position })?;
    raw.parse().map_err(|_| EventError::BadSquare(raw.to_string()))
}

fn optional_square_arg(args: &[&str], position: usize) -> Result<Option<Square>, EventError> {
    match args.get(position) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| EventError::BadSquare(raw.to_string())),
    }
}

impl FromStr for EventToken {
    type Err = EventError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let kind = parts.next().ok_or(EventError::Empty)?;
        let args: Vec<&str> = parts.collect();

        match kind {
            "started" => Ok(EventToken::Started),
            "moves" => Ok(EventToken::Moves {
                from: square_arg(&args, "moves", 0)?,
                to: square_arg(&args, "moves", 1)?,
            }),
            "attacks" => Ok(EventToken::Attacks {
                from: square_arg(&args, "attacks", 0)?,
                to: square_arg(&args, "attacks", 1)?,
            }),
            "defends" => Ok(EventToken::Defends {
                from: square_arg(&args, "defends", 0)?,
                to: optional_square_arg(&args, 1)?,
            }),
            "reveals" => {
                let from = square_arg(&args, "reveals", 0)?;
                let to = square_arg(&args, "reveals", 1)?;
                let rank: Rank = args
                    .get(2)
                    .ok_or(EventError::MissingArgument { kind: "reveals", position: 2 })?
                    .parse()?;
                Ok(EventToken::Reveals { from, to, rank })
            }
            // The winner argument is informational; a missing or odd one
            // still ends the game.
            "wins" => Ok(EventToken::Wins {
                winner: args
                    .first()
                    .and_then(|s| s.parse::<Owner>().ok())
                    .filter(|o| o.is_player()),
            }),
            other => Err(EventError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for EventToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventToken::Started => write!(f, "started"),
            EventToken::Moves { from, to } => write!(f, "moves {} {}", from, to),
            EventToken::Attacks { from, to } => write!(f, "attacks {} {}", from, to),
            EventToken::Defends { from, to: Some(to) } => write!(f, "defends {} {}", from, to),
            EventToken::Defends { from, to: None } => write!(f, "defends {}", from),
            EventToken::Reveals { from, to, rank } => write!(f, "reveals {} {} {}", from, to, rank),
            EventToken::Wins { winner: Some(w) } => write!(f, "wins {}", w),
            EventToken::Wins { winner: None } => write!(f, "wins"),
        }
    }
}

// ── Replay ─────────────────────────────────────────────────────────────

/// What a malformed line does to the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayPolicy {
    /// Log it and leave the state untouched.
    #[default]
    Skip,
    /// Log it and still hand the turn over, as if a recognised token
    /// had arrived.
    AdvanceTurn,
}

impl GameState {
    /// Apply one typed token. Every token hands the turn to the other side.
    pub fn apply_event(&mut self, event: &EventToken) {
        match *event {
            EventToken::Started => {
                self.phase = Phase::InProgress;
            }
            EventToken::Moves { from, to } | EventToken::Attacks { from, to } => {
                // Whoever is on turn is the mover
                let mover = if self.is_my_turn() { self.player } else { self.opponent() };
                let piece = self.board[from];
                self.board.clear(from);
                self.board[to] = Cell { owner: mover, ..piece };
            }
            EventToken::Defends { from, .. } => {
                self.board.clear(from);
            }
            EventToken::Reveals { from, to, rank } => {
                self.board.clear(from);
                let cell = &mut self.board[to];
                cell.rank = rank;
                cell.revealed = true;
            }
            EventToken::Wins { winner } => {
                self.phase = Phase::Finished;
                self.winner = winner;
            }
        }

        self.turn = self.turn.opponent();
        self.drop_stale_selection();
        debug!(event = %event, turn = %self.turn, "applied event");
    }

    /// Parse and apply one line from the event feed. A line that does not
    /// parse never touches the board; `policy` decides the turn.
    pub fn apply_message(&mut self, line: &str, policy: ReplayPolicy) -> Result<EventToken, EventError> {
        match line.parse::<EventToken>() {
            Ok(event) => {
                self.apply_event(&event);
                Ok(event)
            }
            Err(err) => {
                warn!(line, error = %err, ?policy, "skipping malformed event");
                if policy == ReplayPolicy::AdvanceTurn {
                    self.turn = self.turn.opponent();
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(i: usize) -> Square {
        Square::new(i).unwrap()
    }

    #[test]
    fn test_parse_all_kinds() {
        assert_eq!("started".parse::<EventToken>(), Ok(EventToken::Started));
        assert_eq!("moves 5 6".parse::<EventToken>(), Ok(EventToken::Moves { from: sq(5), to: sq(6) }));
        assert_eq!("attacks 22 75".parse::<EventToken>(), Ok(EventToken::Attacks { from: sq(22), to: sq(75) }));
        assert_eq!("defends 75".parse::<EventToken>(), Ok(EventToken::Defends { from: sq(75), to: None }));
        assert_eq!("defends 75 85".parse::<EventToken>(), Ok(EventToken::Defends { from: sq(75), to: Some(sq(85)) }));
        assert_eq!("reveals 31 41 marshal".parse::<EventToken>(),
            Ok(EventToken::Reveals { from: sq(31), to: sq(41), rank: Rank::Marshal })
        );
        assert_eq!("wins host".parse::<EventToken>(), Ok(EventToken::Wins { winner: Some(Owner::Host) }));
        assert_eq!("wins".parse::<EventToken>(), Ok(EventToken::Wins { winner: None }));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<EventToken>(), Err(EventError::Empty));
        assert_eq!("teleports 1 2".parse::<EventToken>(), Err(EventError::UnknownKind("teleports".into())));
        assert_eq!(
            "moves 5".parse::<EventToken>(),
            Err(EventError::MissingArgument { kind: "moves", position: 1 })
        );
        assert_eq!("moves 5 100".parse::<EventToken>(), Err(EventError::BadSquare("100".into())));
        assert!(matches!("reveals 1 2 king".parse::<EventToken>(), Err(EventError::BadRank(_))));
    }

    #[test]
    fn test_display_matches_wire() {
        for line in ["started", "moves 5 6", "defends 75 85", "reveals 31 41 scout", "wins guest"] {
            let token: EventToken = line.parse().unwrap();
            assert_eq!(token.to_string(), line);
        }
    }

    #[test]
    fn test_malformed_policy() {
        let mut state = GameState::new(None);
        let before = state.board.clone();
        assert!(state.apply_message("bogus", ReplayPolicy::Skip).is_err());
        assert_eq!(state.turn, Owner::Host);
        assert!(state.apply_message("moves 1", ReplayPolicy::AdvanceTurn).is_err());
        assert_eq!(state.turn, Owner::Guest);
        assert_eq!(state.board, before);
    }
}
