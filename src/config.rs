//! Game constants and user settings

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::game::{Coordinates, Direction};

/// Canvas width and height in pixels (the surface is square)
pub const CANVAS_SIZE: i32 = 1000;

/// Pixels per grid cell
pub const SCALE: i32 = 50;

/// Number of cells along each axis
pub const GRID_CELLS: i32 = CANVAS_SIZE / SCALE;

/// Game tick delay in milliseconds
pub const TICK_DELAY_MS: u64 = 80;

/// Snake body at the start of every game, head first
pub const INITIAL_SNAKE: [Coordinates; 2] = [Coordinates::new(4, 10), Coordinates::new(4, 10)];

/// Apple position at the start of every game
pub const INITIAL_APPLE: Coordinates = Coordinates::new(14, 10);

/// Direction before the first game is started
pub const IDLE_DIRECTION: Direction = Direction::Up;

/// Direction set by every `start()`
pub const START_DIRECTION: Direction = Direction::Right;

/// Snake segment color (#fff000)
pub const SNAKE_COLOR: (u8, u8, u8) = (0xff, 0xf0, 0x00);

/// Key under which the high score lives in the store
pub const HIGH_SCORE_KEY: &str = "snakeScore";

pub const SETTINGS_FILE: &str = "settings.json";
pub const SCORES_FILE: &str = "scores.json";
pub const LOG_FILE: &str = "snake.log";

/// User settings, read from `settings.json` in the data directory.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Paint the terminal frame in truecolor
    pub color: bool,
    /// Fixed seed for apple placement
    pub seed: Option<u64>,
    /// PNG used as the apple glyph
    pub apple_image: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            seed: None,
            apple_image: None,
            log_filter: "canvas_snake=info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is missing or
    /// malformed. A malformed file is reported next to the defaults so it can
    /// be logged once logging is up.
    pub fn load(path: &Path) -> (Self, Option<Error>) {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return (Self::default(), None),
        };
        match serde_json::from_str(&text) {
            Ok(settings) => (settings, None),
            Err(err) => (Self::default(), Some(err.into())),
        }
    }
}

/// Default data directory for settings, scores and the log
pub fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "canvas-snake", "canvas-snake")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
}
