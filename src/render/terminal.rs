use std::fmt::Write as _;
use std::io::{self, Write};

use colored::Colorize;
use tiny_skia::Pixmap;

use crate::config::{GRID_CELLS, SCALE, SNAKE_COLOR};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

/// Text shown around the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub high_score: Option<u32>,
    pub game_over: bool,
}

/// Presents the raster surface in a terminal, two columns per grid cell.
#[derive(Debug, Clone, Copy)]
pub struct TerminalView {
    color: bool,
}

impl TerminalView {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Draw one full frame. Without a surface only the HUD is shown.
    pub fn present<W: Write>(
        &self,
        out: &mut W,
        surface: Option<&Pixmap>,
        hud: &Hud,
    ) -> io::Result<()> {
        let mut frame = String::from(CLEAR_SCREEN);
        if let Some(surface) = surface {
            self.draw_board(&mut frame, surface);
        }
        self.draw_hud(&mut frame, hud);
        out.write_all(frame.as_bytes())?;
        out.flush()
    }

    fn draw_board(&self, frame: &mut String, surface: &Pixmap) {
        let width = GRID_CELLS as usize * 2;
        let _ = writeln!(frame, "▗{}▖", "▄".repeat(width));
        for row in 0..GRID_CELLS {
            frame.push('▐');
            for col in 0..GRID_CELLS {
                frame.push_str(&self.cell(surface, col, row));
            }
            frame.push_str("▌\n");
        }
        let _ = writeln!(frame, "▝{}▘", "▀".repeat(width));
    }

    // sample the middle pixel of the cell
    fn cell(&self, surface: &Pixmap, col: i32, row: i32) -> String {
        let x = (col * SCALE + SCALE / 2) as u32;
        let y = (row * SCALE + SCALE / 2) as u32;
        let Some(pixel) = surface.pixel(x, y) else {
            return "  ".to_string();
        };
        let color = pixel.demultiply();
        if color.alpha() == 0 {
            return "  ".to_string();
        }
        if self.color {
            return "██".truecolor(color.red(), color.green(), color.blue()).to_string();
        }
        if (color.red(), color.green(), color.blue()) == SNAKE_COLOR {
            "██".to_string()
        } else {
            "()".to_string()
        }
    }

    fn draw_hud(&self, frame: &mut String, hud: &Hud) {
        let _ = writeln!(frame, "Score: {}", hud.score);
        match hud.high_score {
            Some(best) => {
                let _ = writeln!(frame, "High Score: {best}");
            }
            None => frame.push_str("High Score: \n"),
        }
        if hud.game_over {
            if self.color {
                let _ = writeln!(frame, "{}", "Game Over".red().bold());
            } else {
                frame.push_str("Game Over\n");
            }
        }
        frame.push_str("[p] Play  [q] Quit\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SnakeGame;
    use crate::render::{sprite, Renderer};

    fn frame(surface: Option<&Pixmap>, hud: Hud) -> String {
        let mut out = Vec::new();
        TerminalView::new(false).present(&mut out, surface, &hud).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn hud_shows_scores() {
        let text = frame(
            None,
            Hud { score: 3, high_score: Some(7), game_over: false },
        );
        assert!(text.starts_with(CLEAR_SCREEN));
        assert!(text.contains("Score: 3\n"));
        assert!(text.contains("High Score: 7\n"));
        assert!(!text.contains("Game Over"));
        assert!(text.contains("[p] Play"));
    }

    #[test]
    fn absent_high_score_is_blank() {
        let text = frame(
            None,
            Hud { score: 0, high_score: None, game_over: true },
        );
        assert!(text.contains("High Score: \n"));
        assert!(text.contains("Game Over"));
    }

    #[test]
    fn board_marks_snake_and_apple() {
        let mut renderer = Renderer::new(sprite::apple_glyph().unwrap()).unwrap();
        renderer.render(&SnakeGame::with_seed(1));
        let text = frame(
            renderer.surface(),
            Hud { score: 0, high_score: None, game_over: false },
        );

        let rows: Vec<&str> = text
            .lines()
            .filter(|line| line.starts_with('▐'))
            .collect();
        assert_eq!(rows.len(), GRID_CELLS as usize);

        let row = rows[10];
        let cells: Vec<char> = row.chars().collect();
        // skip the border, two chars per cell
        let cell = |col: usize| -> String { cells[1 + col * 2..3 + col * 2].iter().collect() };
        assert_eq!(cell(4), "██");
        assert_eq!(cell(14), "()");
        assert_eq!(cell(0), "  ");
    }
}
