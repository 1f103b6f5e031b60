//! Snake on a raster canvas.
//!
//! The game state lives in [`game::SnakeGame`], ticked by a [`timer::Interval`]
//! from the single-threaded [`session::Session`] loop, painted by
//! [`render::Renderer`] and shown in the terminal.

pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod render;
pub mod session;
pub mod store;
pub mod timer;

pub use error::{Error, Result};
