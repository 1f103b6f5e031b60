use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use canvas_snake::config::{self, Settings};
use canvas_snake::game::SnakeGame;
use canvas_snake::render::terminal::TerminalView;
use canvas_snake::render::{sprite, Renderer};
use canvas_snake::session::Session;
use canvas_snake::store::FileStore;

#[derive(Parser)]
#[command(name = "canvas-snake")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding settings.json, scores.json and snake.log
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seed for apple placement
    #[arg(long)]
    seed: Option<u64>,

    /// PNG used as the apple glyph
    #[arg(long)]
    apple_image: Option<PathBuf>,

    /// Save the last frame as PNG on exit
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Plain text frames
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => config::default_data_dir().context("could not resolve a data directory")?,
    };
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;

    let settings_path = data_dir.join(config::SETTINGS_FILE);
    let (settings, problem) = Settings::load(&settings_path);
    init_logging(&data_dir.join(config::LOG_FILE), &settings.log_filter)?;
    if let Some(err) = problem {
        warn!(path = %settings_path.display(), %err, "ignoring malformed settings");
    }

    let color = settings.color && !cli.no_color;
    if !color {
        colored::control::set_override(false);
    }

    let game = match cli.seed.or(settings.seed) {
        Some(seed) => SnakeGame::with_seed(seed),
        None => SnakeGame::new(),
    };

    let apple = match cli.apple_image.or(settings.apple_image) {
        Some(path) => sprite::load_apple(&path).or_else(|err| {
            warn!(%err, "falling back to the built-in apple");
            sprite::apple_glyph()
        })?,
        None => sprite::apple_glyph()?,
    };
    let renderer = Renderer::new(apple)?;

    let store = FileStore::new(data_dir.join(config::SCORES_FILE));
    info!(scores = %store.path().display(), "starting");

    let mut session = Session::new(
        game,
        Box::new(store),
        renderer,
        TerminalView::new(color),
        io::stdout(),
    )
    .snapshot_on_exit(cli.snapshot);
    session.run().context("game session failed")?;
    Ok(())
}

fn init_logging(path: &Path, default_filter: &str) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
