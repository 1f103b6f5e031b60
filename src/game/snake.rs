// The snake moves one cell per tick: the new head is pushed on the front and the
// tail popped off the back, unless the head lands on the apple, in which case the
// tail stays and the snake grows by one.
use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::{Coordinates, Direction};
use crate::config::{
    CANVAS_SIZE, GRID_CELLS, IDLE_DIRECTION, INITIAL_APPLE, INITIAL_SNAKE, SCALE,
    START_DIRECTION, TICK_DELAY_MS,
};
use crate::error::Result;
use crate::input::Key;
use crate::store::HighScoreStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    HitWall,
    HitSelf,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The game is not running, nothing changed
    Idle,
    Moved,
    Ate,
    GameOver { cause: GameOverCause, ate: bool },
}

#[derive(Debug, Clone)]
pub struct SnakeGame {
    snake: VecDeque<Coordinates>, // The head is the first element
    apple: Coordinates,
    direction: Direction,
    score: u32,
    game_over: bool,
    tick_period: Option<Duration>,
    rng: StdRng,
}

impl SnakeGame {
    pub fn new() -> Self {
        Self::init_new(StdRng::from_os_rng())
    }

    /// Same as [`SnakeGame::new`] with a reproducible apple sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::init_new(StdRng::seed_from_u64(seed))
    }

    fn init_new(rng: StdRng) -> Self {
        SnakeGame {
            snake: INITIAL_SNAKE.iter().copied().collect(),
            apple: INITIAL_APPLE,
            direction: IDLE_DIRECTION,
            score: 0,
            game_over: false,
            tick_period: None,
            rng,
        }
    }

    pub fn snake(&self) -> &VecDeque<Coordinates> {
        &self.snake
    }

    pub fn head(&self) -> Coordinates {
        self.snake[0]
    }

    pub fn apple(&self) -> Coordinates {
        self.apple
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_running(&self) -> bool {
        self.tick_period.is_some()
    }

    /// Period the tick timer should run at, `None` while idle or after game over
    pub fn tick_period(&self) -> Option<Duration> {
        self.tick_period
    }

    /// Reset everything and start ticking. Allowed from any state, including
    /// in the middle of a running game.
    pub fn start(&mut self) {
        self.snake = INITIAL_SNAKE.iter().copied().collect();
        self.apple = INITIAL_APPLE;
        self.direction = START_DIRECTION;
        self.score = 0;
        self.game_over = false;
        self.tick_period = Some(Duration::from_millis(TICK_DELAY_MS));
        info!("new game started");
    }

    /// Arrow keys overwrite the direction. Reversing into the body is allowed
    /// and ends the game on the next tick. Returns whether the key was an arrow.
    pub fn set_direction(&mut self, key: Key) -> bool {
        match Direction::from_key(key) {
            Some(direction) => {
                self.direction = direction;
                true
            }
            None => false,
        }
    }

    /// Advance the game by one step.
    ///
    /// The moved snake is committed even when the move ends the game, so the
    /// colliding head is part of the final state. On game over the high score
    /// in `store` is raised to the current score when the score beats it; a
    /// failing store is reported after the game state has been updated.
    pub fn tick(&mut self, store: &mut dyn HighScoreStore) -> Result<TickOutcome> {
        if !self.is_running() {
            return Ok(TickOutcome::Idle);
        }

        let new_head = self.head().step(self.direction);

        // collisions are checked against the snake before the move, tail included
        let cause = if !new_head.is_on_canvas(CANVAS_SIZE, SCALE) {
            Some(GameOverCause::HitWall)
        } else if self.snake.contains(&new_head) {
            Some(GameOverCause::HitSelf)
        } else {
            None
        };

        self.snake.push_front(new_head);
        let ate = self.try_eating(new_head);
        if !ate {
            self.snake.pop_back();
        }
        debug!(head = ?new_head, len = self.snake.len(), ate, "tick");

        match cause {
            Some(cause) => {
                self.end_game(cause, store)?;
                Ok(TickOutcome::GameOver { cause, ate })
            }
            None if ate => Ok(TickOutcome::Ate),
            None => Ok(TickOutcome::Moved),
        }
    }

    fn try_eating(&mut self, head: Coordinates) -> bool {
        if head != self.apple {
            return false;
        }
        self.score += 1;
        // may land on the snake, nothing prevents it
        self.apple = Coordinates::new(
            self.rng.random_range(0..GRID_CELLS),
            self.rng.random_range(0..GRID_CELLS),
        );
        true
    }

    fn end_game(&mut self, cause: GameOverCause, store: &mut dyn HighScoreStore) -> Result<()> {
        self.tick_period = None;
        self.game_over = true;
        info!(?cause, score = self.score, "game over");

        let best = store.load()?.unwrap_or(0);
        if self.score > best {
            store.save(self.score)?;
            info!(score = self.score, previous = best, "new high score");
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, body: &[(i32, i32)], apple: (i32, i32), direction: Direction) {
        self.snake = body.iter().copied().map(Coordinates::from).collect();
        self.apple = apple.into();
        self.direction = direction;
    }
}

impl Default for SnakeGame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FailingStore, MemoryStore};

    fn running(seed: u64) -> SnakeGame {
        let mut game = SnakeGame::with_seed(seed);
        game.start();
        game
    }

    #[test]
    fn idle_before_start() {
        let mut game = SnakeGame::with_seed(1);
        let mut store = MemoryStore::default();

        assert_eq!(game.direction(), Direction::Up);
        assert_eq!(game.tick_period(), None);
        assert_eq!(game.tick(&mut store).unwrap(), TickOutcome::Idle);
        assert_eq!(game.head(), Coordinates::new(4, 10));
    }

    #[test]
    fn start_enables_the_timer() {
        let game = running(1);
        assert_eq!(game.tick_period(), Some(Duration::from_millis(80)));
        assert_eq!(game.direction(), Direction::Right);
        assert_eq!(game.apple(), Coordinates::new(14, 10));
        assert_eq!(game.snake().len(), 2);
    }

    #[test]
    fn failed_save_still_ends_the_game() {
        let mut game = running(2);
        let mut store = FailingStore;
        game.place(&[(13, 10), (12, 10)], (14, 10), Direction::Right);

        let mut result = Ok(TickOutcome::Idle);
        for _ in 0..GRID_CELLS {
            result = game.tick(&mut store);
            if result.is_err() {
                break;
            }
        }

        assert!(matches!(result, Err(crate::Error::Io(_))));
        assert!(game.is_game_over());
        assert!(!game.is_running());
        assert_eq!(game.tick_period(), None);
        assert_eq!(game.head(), Coordinates::new(20, 10));
        assert!(game.score() >= 1);
    }

    #[test]
    fn tail_segment_counts_as_body() {
        let mut game = running(1);
        let mut store = MemoryStore::default();
        // head at (5,5) moving left into the tail at (4,5)
        game.place(&[(5, 5), (4, 5)], (0, 0), Direction::Left);

        let outcome = game.tick(&mut store).unwrap();
        assert_eq!(
            outcome,
            TickOutcome::GameOver { cause: GameOverCause::HitSelf, ate: false }
        );
        assert_eq!(game.head(), Coordinates::new(4, 5));
    }

    #[test]
    fn apple_on_collision_cell_still_scores() {
        let mut game = running(3);
        let mut store = MemoryStore::with_score(0);
        game.place(&[(5, 5), (4, 5)], (4, 5), Direction::Left);

        let outcome = game.tick(&mut store).unwrap();
        assert_eq!(
            outcome,
            TickOutcome::GameOver { cause: GameOverCause::HitSelf, ate: true }
        );
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().len(), 3);
        assert_eq!(store.load().unwrap(), Some(1));
    }

    #[test]
    fn same_seed_same_apples() {
        let mut a = running(42);
        let mut b = running(42);
        let mut store = MemoryStore::default();
        for game in [&mut a, &mut b] {
            game.place(&[(13, 10), (12, 10)], (14, 10), Direction::Right);
            game.tick(&mut store).unwrap();
        }
        assert_eq!(a.apple(), b.apple());
    }
}
