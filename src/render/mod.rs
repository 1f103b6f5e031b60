//! Raster rendering of the board
//!
//! The board is painted onto a `CANVAS_SIZE` square pixmap, one `SCALE` sized
//! square per snake segment plus the apple glyph. Painting only happens when
//! the snake, the apple or the game-over flag changed since the last frame.

pub mod sprite;
pub mod terminal;

use std::path::Path;

use tiny_skia::{Color, FilterQuality, Paint, Pixmap, PixmapPaint, Rect, Transform};
use tracing::trace;

use crate::config::{CANVAS_SIZE, SCALE, SNAKE_COLOR};
use crate::error::{Error, Result};
use crate::game::{Coordinates, SnakeGame};

/// Everything a frame depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub snake: Vec<Coordinates>,
    pub apple: Coordinates,
    pub game_over: bool,
}

impl Scene {
    pub fn of(game: &SnakeGame) -> Self {
        Self {
            snake: game.snake().iter().copied().collect(),
            apple: game.apple(),
            game_over: game.is_game_over(),
        }
    }
}

pub struct Renderer {
    surface: Option<Pixmap>,
    apple: Pixmap,
    last_scene: Option<Scene>,
}

impl Renderer {
    /// Renderer drawing on a fresh `CANVAS_SIZE` surface.
    pub fn new(apple: Pixmap) -> Result<Self> {
        let size = CANVAS_SIZE as u32;
        let surface = Pixmap::new(size, size).ok_or(Error::Surface(size))?;
        Ok(Self {
            surface: Some(surface),
            apple,
            last_scene: None,
        })
    }

    /// Renderer without a surface, every draw is skipped.
    pub fn detached(apple: Pixmap) -> Self {
        Self {
            surface: None,
            apple,
            last_scene: None,
        }
    }

    pub fn surface(&self) -> Option<&Pixmap> {
        self.surface.as_ref()
    }

    /// Repaint if the scene changed. Returns whether it changed.
    pub fn render(&mut self, game: &SnakeGame) -> bool {
        let scene = Scene::of(game);
        if self.last_scene.as_ref() == Some(&scene) {
            return false;
        }
        if let Some(surface) = self.surface.as_mut() {
            paint_scene(surface, &self.apple, &scene);
            trace!(segments = scene.snake.len(), "frame painted");
        }
        self.last_scene = Some(scene);
        true
    }

    /// Write the current surface to a PNG file. No-op when detached.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        match &self.surface {
            Some(surface) => surface
                .save_png(path)
                .map_err(|err| Error::Asset(format!("{}: {err}", path.display()))),
            None => Ok(()),
        }
    }
}

fn paint_scene(surface: &mut Pixmap, apple: &Pixmap, scene: &Scene) {
    surface.fill(Color::TRANSPARENT);

    let mut paint = Paint::default();
    let (r, g, b) = SNAKE_COLOR;
    paint.set_color_rgba8(r, g, b, 0xff);
    paint.anti_alias = false;

    let cell = SCALE as f32;
    for segment in &scene.snake {
        let x = (segment.x * SCALE) as f32;
        let y = (segment.y * SCALE) as f32;
        if let Some(rect) = Rect::from_xywh(x, y, cell, cell) {
            surface.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    // stretch the glyph over the apple cell
    let sx = cell / apple.width() as f32;
    let sy = cell / apple.height() as f32;
    let tx = (scene.apple.x * SCALE) as f32;
    let ty = (scene.apple.y * SCALE) as f32;
    let glyph_paint = PixmapPaint {
        quality: FilterQuality::Nearest,
        ..PixmapPaint::default()
    };
    surface.draw_pixmap(
        0,
        0,
        apple.as_ref(),
        &glyph_paint,
        Transform::from_row(sx, 0.0, 0.0, sy, tx, ty),
        None,
    );
}
