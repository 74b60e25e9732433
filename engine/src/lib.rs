pub mod catalog;
pub mod board;
pub mod placement;
pub mod movement;
pub mod combat;
pub mod state;
pub mod events;
pub mod visibility;


pub use board::{Board, Cell, Owner, Square};
pub use catalog::Rank;
pub use events::{EventError, EventToken, ReplayPolicy};
pub use movement::{MoveError, MoveKind};
pub use state::{ClickOutcome, GameId, GameState, MoveIntent, Phase};
