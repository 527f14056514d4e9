//! Scoring, leveling and the gravity curve

use std::time::Duration;

/// Points per cleared row before the 4-row bonus
const POINTS_PER_ROW: u64 = 50 * 3;
/// Flat bonus for clearing 4 rows at once
const FOUR_ROW_BONUS: u64 = 500;
/// Lines needed per level
const LINES_PER_LEVEL: u32 = 10;
/// Highest level a game may start at
pub const MAX_STARTING_LEVEL: u32 = 99;

/// Gravity interval at level 0, in seconds
const BASE_FALL_SECS: f64 = 0.8;
/// Per-level multiplier on the gravity interval
const FALL_DECAY: f64 = 0.9;
/// Default floor on the gravity interval
pub const DEFAULT_MIN_FALL_INTERVAL: Duration = Duration::from_millis(100);

/// Score tracking
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Total lines cleared
    pub lines: u32,
    /// Level the game started at
    pub starting_level: u32,
}

impl Score {
    /// `starting_level` is clamped to [`MAX_STARTING_LEVEL`]
    pub fn new(starting_level: u32) -> Self {
        Self {
            points: 0,
            lines: 0,
            starting_level: starting_level.min(MAX_STARTING_LEVEL),
        }
    }

    /// Current level
    pub fn level(&self) -> u32 {
        self.starting_level
            .saturating_add(self.lines / LINES_PER_LEVEL)
    }

    /// Points awarded for clearing `rows` rows with one lock
    pub fn clear_points(rows: usize) -> u64 {
        let base = POINTS_PER_ROW * rows as u64;
        if rows >= 4 { base + FOUR_ROW_BONUS } else { base }
    }

    /// Label shown after a clear
    pub fn clear_label(rows: usize) -> Option<&'static str> {
        match rows {
            0 => None,
            1 => Some("Single!"),
            2 => Some("Double!"),
            3 => Some("Triple!"),
            _ => Some("Tetris! + 500"),
        }
    }

    /// Record a clear, returning the points it was worth
    pub fn add_clear(&mut self, rows: usize) -> u64 {
        let points = Self::clear_points(rows);
        self.points += points;
        self.lines += rows as u32;
        points
    }

    /// Add score for soft drop (1 point per row)
    pub fn add_soft_drop(&mut self, rows: u32) {
        self.points += rows as u64;
    }

    /// Add score for hard drop (1 point per row dropped)
    pub fn add_hard_drop(&mut self, rows: u32) {
        self.points += rows as u64;
    }

    /// Time between automatic falls at the current level
    pub fn fall_interval(&self, floor: Duration) -> Duration {
        fall_interval(self.level(), floor)
    }
}

/// `0.8 * 0.9^level` seconds, never shorter than `floor`
pub fn fall_interval(level: u32, floor: Duration) -> Duration {
    let secs = BASE_FALL_SECS * FALL_DECAY.powi(level.min(i32::MAX as u32) as i32);
    Duration::from_secs_f64(secs).max(floor)
}
