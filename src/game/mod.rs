//! Game state and rules

mod coordinates;
mod direction;
mod snake;

pub use coordinates::Coordinates;
pub use direction::Direction;
pub use snake::{GameOverCause, SnakeGame, TickOutcome};
