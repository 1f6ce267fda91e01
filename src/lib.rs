//! Arcade Suite - eight small arcade games sharing one leaderboard
//!
//! Core modules:
//! - `sim`: Deterministic per-game simulations (physics, collisions, game state)
//! - `renderer`: Backend-agnostic draw list and the terminal canvas
//! - `platform`: Terminal frontend (input, frame loop)
//! - `cabinet`: Glue between a game, name entry and the score store
//! - `highscores`: SQLite leaderboard shared by every game

pub mod cabinet;
pub mod error;
pub mod highscores;
pub mod name_entry;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use cabinet::Cabinet;
pub use error::{Error, Result};
pub use highscores::ScoreStore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (every game was tuned at 60 frames per second)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest real frame delta fed to the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Leaderboard length shown on records screens
    pub const TOP_SCORES: u64 = 10;
}

/// Unit vector for an angle in degrees (screen space, y grows downward)
#[inline]
pub fn heading(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Wrap an angle in degrees to [-180, 180)
#[inline]
pub fn normalize_degrees(mut angle: f32) -> f32 {
    while angle >= 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

/// Format seconds as MM:SS
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(45.0), 45.0);
    }

    #[test]
    fn test_heading_points_up_at_minus_ninety() {
        let h = heading(-90.0);
        assert!(h.x.abs() < 1e-6);
        assert!((h.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(75.9), "01:15");
    }
}
