//! The game loop
//!
//! One thread owns the game. Ticks and input bytes arrive as [`Event`]s on a
//! single channel and are handled one at a time; after each event the tick
//! timer is brought in line with the game's tick period and the frame is
//! refreshed if anything visible changed.

use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::game::{SnakeGame, TickOutcome};
use crate::input::{spawn_stdin_reader, Key, KeyDecoder, RawMode};
use crate::render::terminal::{Hud, TerminalView};
use crate::render::Renderer;
use crate::store::HighScoreStore;
use crate::timer::Interval;

/// Longest wait on the channel while no tick is scheduled
const IDLE_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Tick,
    Input(u8),
}

/// Whether the loop keeps going after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<W: Write> {
    game: SnakeGame,
    store: Box<dyn HighScoreStore>,
    renderer: Renderer,
    view: TerminalView,
    out: W,
    decoder: KeyDecoder,
    interval: Interval<'static>,
    sender: Sender<Event>,
    events: Receiver<Event>,
    last_hud: Option<Hud>,
    snapshot: Option<PathBuf>,
}

impl<W: Write> Session<W> {
    pub fn new(
        game: SnakeGame,
        store: Box<dyn HighScoreStore>,
        renderer: Renderer,
        view: TerminalView,
        out: W,
    ) -> Self {
        let (sender, events) = mpsc::channel();
        let tick_sender = sender.clone();
        // the timer only queues a tick; the loop does the work
        let interval = Interval::new(move || {
            let _ = tick_sender.send(Event::Tick);
        });
        Self {
            game,
            store,
            renderer,
            view,
            out,
            decoder: KeyDecoder::new(),
            interval,
            sender,
            events,
            last_hud: None,
            snapshot: None,
        }
    }

    /// Save the last frame as PNG to `path` when the session ends.
    pub fn snapshot_on_exit(mut self, path: Option<PathBuf>) -> Self {
        self.snapshot = path;
        self
    }

    pub fn game(&self) -> &SnakeGame {
        &self.game
    }

    pub fn interval(&self) -> &Interval<'static> {
        &self.interval
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Sender feeding this session's event queue
    pub fn sender(&self) -> Sender<Event> {
        self.sender.clone()
    }

    /// Play in the terminal until the player quits.
    pub fn run(&mut self) -> Result<()> {
        let _raw = RawMode::enable()?;
        spawn_stdin_reader(self.sender.clone());
        info!("session started");

        let outcome = self.event_loop();
        self.conclude(outcome)
    }

    fn event_loop(&mut self) -> Result<()> {
        self.refresh()?;
        loop {
            let now = Instant::now();
            self.interval.poll(now);
            let wait = self
                .interval
                .time_until_due(now)
                .map_or(IDLE_WAIT, |due| due.min(IDLE_WAIT));

            let event = match self.events.recv_timeout(wait) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            };
            if self.handle(event)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Tear down after the loop, whether it ended cleanly or not. A loop error
    /// wins over a teardown error.
    fn conclude(&mut self, outcome: Result<()>) -> Result<()> {
        let finished = self.finish();
        if let Err(err) = &outcome {
            warn!(%err, "session loop failed");
        }
        outcome.and(finished)
    }

    /// Process one event, then sync the timer and refresh the frame.
    pub fn handle(&mut self, event: Event) -> Result<Flow> {
        let flow = match event {
            Event::Tick => {
                self.on_tick();
                Flow::Continue
            }
            Event::Input(byte) => {
                self.decoder.push(byte);
                let mut flow = Flow::Continue;
                while let Some(key) = self.decoder.next_key() {
                    if self.on_key(key) == Flow::Quit {
                        flow = Flow::Quit;
                        break;
                    }
                }
                flow
            }
        };
        self.interval.set_period(self.game.tick_period());
        self.refresh()?;
        Ok(flow)
    }

    /// Handle all events already queued, without waiting.
    pub fn drain(&mut self) -> Result<Flow> {
        while let Ok(event) = self.events.try_recv() {
            if self.handle(event)? == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn on_tick(&mut self) {
        match self.game.tick(self.store.as_mut()) {
            Ok(TickOutcome::GameOver { cause, .. }) => {
                debug!(?cause, score = self.game.score(), "tick ended the game");
            }
            Ok(outcome) => debug!(?outcome, "tick"),
            Err(err) => warn!(%err, "could not persist high score"),
        }
    }

    fn on_key(&mut self, key: Key) -> Flow {
        debug!(?key, "key");
        match key {
            Key::Quit => return Flow::Quit,
            Key::Play => self.game.start(),
            _ => {
                self.game.set_direction(key);
            }
        }
        Flow::Continue
    }

    fn hud(&self) -> Hud {
        let high_score = self.store.load().unwrap_or_else(|err| {
            warn!(%err, "could not read high score");
            None
        });
        Hud {
            score: self.game.score(),
            high_score,
            game_over: self.game.is_game_over(),
        }
    }

    fn refresh(&mut self) -> Result<()> {
        let repainted = self.renderer.render(&self.game);
        let hud = self.hud();
        if repainted || self.last_hud != Some(hud) {
            self.view.present(&mut self.out, self.renderer.surface(), &hud)?;
            self.last_hud = Some(hud);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.interval.cancel();
        if let Some(path) = &self.snapshot {
            self.renderer.save_png(path)?;
            info!(path = %path.display(), "snapshot saved");
        }
        info!(score = self.game.score(), "session ended");
        Ok(())
    }
}

impl<W: Write> Drop for Session<W> {
    fn drop(&mut self) {
        self.interval.cancel();
    }
}
