use crate::input::Key;

/// Unit movement vector of the snake head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `(dx, dy)` applied to the head every tick
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Arrow keys map to a direction, everything else is ignored.
    pub fn from_key(key: Key) -> Option<Direction> {
        match key {
            Key::ArrowLeft => Some(Direction::Left),
            Key::ArrowUp => Some(Direction::Up),
            Key::ArrowRight => Some(Direction::Right),
            Key::ArrowDown => Some(Direction::Down),
            _ => None,
        }
    }
}
