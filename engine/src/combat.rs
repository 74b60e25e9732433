// ═══════════════════════════════════════════════════════════════════════
// Combat — who wins when one piece lands on another
// Used by the authoritative side to decide which event token to publish.
// ═══════════════════════════════════════════════════════════════════════

use crate::catalog::Rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Attacker takes the square.
    Captures,
    /// Attacker takes the flag and the game ends.
    CapturesFlag,
    /// Attacker is destroyed; defender stays hidden.
    Repelled,
    /// A scout attacked and lost; the defender's rank becomes public.
    Revealed,
}

/// Does `attacker` beat `defender`? Ties go to the defender.
pub fn beats(attacker: Rank, defender: Rank) -> bool {
    let Some(strength) = attacker.strength() else {
        return false;
    };
    match defender {
        Rank::Flag => true,
        Rank::Bomb => attacker == Rank::Miner,
        Rank::Marshal if attacker == Rank::Spy => true,
        Rank::Empty => false,
        d => d.strength().map_or(false, |s| s < strength),
    }
}

pub fn resolve_attack(attacker: Rank, defender: Rank) -> CombatOutcome {
    if beats(attacker, defender) {
        if defender == Rank::Flag {
            CombatOutcome::CapturesFlag
        } else {
            CombatOutcome::Captures
        }
    } else if attacker == Rank::Scout {
        CombatOutcome::Revealed
    } else {
        CombatOutcome::Repelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spy_takes_marshal_only_when_attacking() {
        assert!(beats(Rank::Spy, Rank::Marshal));
        assert!(beats(Rank::Marshal, Rank::Spy));
        assert!(!beats(Rank::Spy, Rank::General));
    }

    #[test]
    fn test_only_miner_defuses_bomb() {
        for r in Rank::PIECES {
            assert_eq!(beats(r, Rank::Bomb), r == Rank::Miner, "{:?} vs bomb", r);
        }
    }

    #[test]
    fn test_tie_repels() {
        assert_eq!(resolve_attack(Rank::Captain, Rank::Captain), CombatOutcome::Repelled);
        assert_eq!(resolve_attack(Rank::Scout, Rank::Scout), CombatOutcome::Revealed);
    }
}
