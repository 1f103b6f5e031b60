use super::Direction;

/// A cell on the game grid. Columns grow to the right, rows grow downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub const fn new(x: i32, y: i32) -> Coordinates {
        Coordinates { x, y }
    }

    /// The neighbouring cell one step towards `direction`.
    pub fn step(&self, direction: Direction) -> Coordinates {
        let (dx, dy) = direction.delta();
        Coordinates::new(self.x + dx, self.y + dy)
    }

    /// True when the cell lies on a `canvas_size` pixel surface drawn at `scale`
    /// pixels per cell.
    pub fn is_on_canvas(&self, canvas_size: i32, scale: i32) -> bool {
        [self.x, self.y]
            .iter()
            .all(|&axis| axis >= 0 && axis * scale < canvas_size)
    }
}

impl From<(i32, i32)> for Coordinates {
    fn from((x, y): (i32, i32)) -> Self {
        Coordinates::new(x, y)
    }
}
