// ═══════════════════════════════════════════════════════════════════════
// Text rendering of a player's view
// ═══════════════════════════════════════════════════════════════════════

use std::fmt::Write;
use stratego_engine::board::{Owner, BOARD_WIDTH};
use stratego_engine::catalog::Rank;
use stratego_engine::visibility::{CellView, PlayerView};

fn cell_text(cell: &CellView, viewer: Owner) -> String {
    if cell.water {
        return " ~~".to_string();
    }
    match cell.rank {
        None => " ??".to_string(),
        Some(Rank::Empty) => "  .".to_string(),
        Some(rank) => {
            let mark = if cell.owner == viewer { ' ' } else { '*' };
            format!("{}{:>2}", mark, rank.label())
        }
    }
}

/// Ten rows of ten cells, row 0 at the top, plus a status line and, during
/// setup, the bench. Opponent pieces are `??` until revealed, then marked
/// with `*`.
pub fn render(view: &PlayerView) -> String {
    let mut out = String::new();
    out.push_str("    ");
    for col in 0..BOARD_WIDTH {
        let _ = write!(out, " {:>3} ", col);
    }
    out.push('\n');

    for row in view.cells.chunks(BOARD_WIDTH as usize) {
        let _ = write!(out, "{:>3} ", row[0].square.index());
        for cell in row {
            let selected = view.selected == Some(cell.square);
            let (open, close) = if selected { ('[', ']') } else { (' ', ' ') };
            let _ = write!(out, "{}{}{}", open, cell_text(cell, view.viewer), close);
        }
        out.push('\n');
    }

    let _ = write!(out, "{}: turn={} phase={:?}", view.viewer, view.turn, view.phase);
    if let Some(id) = &view.game_id {
        let _ = write!(out, " game={}", id);
    }
    if let Some(winner) = view.winner {
        let _ = write!(out, " winner={}", winner);
    }
    out.push('\n');

    if view.bench.iter().any(|slot| slot.remaining > 0) {
        out.push_str("bench:");
        for slot in &view.bench {
            let _ = write!(out, " {}:{}", slot.rank, slot.remaining);
        }
        out.push('\n');
    }
    out
}
