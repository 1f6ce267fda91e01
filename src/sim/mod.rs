//! Deterministic simulation module
//!
//! All gameplay logic lives here. Each game is a plain state struct driven by
//! the `Game` trait:
//! - Fixed timestep only (per-tick constants assume 60 ticks per second)
//! - Seeded RNG only
//! - No terminal or database dependencies

pub mod arkanoid;
pub mod collision;
pub mod dino;
pub mod flappy;
pub mod invaders;
pub mod memory;
pub mod racing;
pub mod snake;
pub mod sonic;
pub mod state;

pub use collision::{Rect, Side, circle_rect_overlap, collision_side};
pub use state::{GameEvent, Key, RngState, ScoreEntry, ScoreReport, TickInput};

use crate::renderer::DrawList;

/// Which direction of score counts as better
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOrder {
    HigherIsBetter,
    /// Times and move counts
    LowerIsBetter,
}

impl ScoreOrder {
    /// True when `candidate` strictly beats `best`
    pub fn beats(self, candidate: i64, best: i64) -> bool {
        match self {
            ScoreOrder::HigherIsBetter => candidate > best,
            ScoreOrder::LowerIsBetter => candidate < best,
        }
    }
}

/// How the player's name is obtained when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePolicy {
    /// Three-letter arcade entry after every scoring run
    Arcade,
    /// Free-form name asked once per session
    Prompt,
    /// Username from the settings file
    Settings,
}

/// Static description of a game
#[derive(Debug)]
pub struct GameInfo {
    /// Window title
    pub title: &'static str,
    /// Row name in the `games` table
    pub db_name: &'static str,
    /// Logical resolution
    pub width: f32,
    pub height: f32,
    pub order: ScoreOrder,
    pub names: NamePolicy,
}

/// A game the cabinet can drive
pub trait Game {
    fn info(&self) -> &'static GameInfo;

    /// Advance one fixed timestep
    fn tick(&mut self, input: &TickInput, dt: f32);

    /// Describe the current frame
    fn draw(&self, list: &mut DrawList);

    /// Take events raised since the last call
    fn drain_events(&mut self) -> Vec<GameEvent>;

    /// Receive the outcome of a submission or leaderboard request
    fn show_report(&mut self, report: ScoreReport);
}

impl<G: Game + ?Sized> Game for Box<G> {
    fn info(&self) -> &'static GameInfo {
        (**self).info()
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        (**self).tick(input, dt);
    }

    fn draw(&self, list: &mut DrawList) {
        (**self).draw(list);
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        (**self).drain_events()
    }

    fn show_report(&mut self, report: ScoreReport) {
        (**self).show_report(report);
    }
}
