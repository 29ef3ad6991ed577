//! Sharky - an underwater eat-or-be-eaten arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, spawning, game state)
//! - `highscores`: Sorted, capped leaderboard records
//! - `settings`: Persisted player preferences
//! - `persistence`: JSON over LocalStorage, with native stubs
//! - `audio`: Web Audio cues (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::{ParseDifficultyError, StorageError};
pub use highscores::{HighScoreRecord, HighScores};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Longest frame delta the simulation will integrate (ms)
    pub const MAX_FRAME_DT_MS: f32 = 100.0;

    /// Default canvas dimensions
    pub const DEFAULT_CANVAS_WIDTH: f32 = 720.0;
    pub const DEFAULT_CANVAS_HEIGHT: f32 = 480.0;

    /// Score range mapped onto the height range by the size curve
    pub const SIZE_MIN_SCORE: u32 = 2000;
    pub const SIZE_MAX_SCORE: u32 = 100_000;
    pub const SIZE_MIN_HEIGHT: f32 = 50.0;
    pub const SIZE_MAX_HEIGHT: f32 = 250.0;
    /// Width is this fraction of height
    pub const SIZE_ASPECT: f32 = 0.6;
    pub const SIZE_MIN_WIDTH: f32 = 16.0;

    /// Character movement: 3 px/frame at a nominal 60 Hz
    pub const CHARACTER_BASE_SPEED: f32 = 3.0 * 60.0;
    pub const CHARACTER_ACCEL_MS: f32 = 500.0;
    pub const CHARACTER_DECEL_MS: f32 = 1000.0;
    pub const CHARACTER_MAX_HEALTH: f32 = 100.0;
    pub const CHARACTER_INVULN_MS: f64 = 1000.0;
    /// Unit-velocity magnitude above which the character counts as swimming
    pub const SWIM_THRESHOLD: f32 = 0.05;
    /// Per-tick chance of slipping into the long idle animation
    pub const LONG_IDLE_CHANCE: f64 = 0.01;

    /// Cosmetic growth pulse after eating
    pub const EAT_PULSE_SCALE: f32 = 1.3;
    pub const EAT_PULSE_MS: f32 = 100.0;

    /// Melee
    pub const FIN_SLAP_COOLDOWN_MS: f32 = 500.0;
    pub const FIN_SLAP_RANGE: f32 = 40.0;
    pub const FIN_SLAP_DAMAGE: f32 = 2.0;

    /// Projectile
    pub const BUBBLE_COOLDOWN_MS: f32 = 400.0;
    pub const BUBBLE_COST_FRACTION: f64 = 0.01;
    pub const BUBBLE_SIZE: f32 = 16.0;
    pub const BUBBLE_SPEED_X: f32 = 200.0;
    pub const BUBBLE_SPEED_Y: f32 = -40.0;
    pub const BUBBLE_LIFETIME_MS: f64 = 5000.0;
    pub const BUBBLE_DAMAGE: f32 = 1.0;

    /// Regular enemies
    pub const ENEMY_HEALTH: f32 = 2.0;
    pub const ENEMY_MIN_SCORE: u32 = 200;
    pub const ENEMY_OFFSCREEN_MARGIN: f32 = 50.0;
    pub const ENEMY_SPAWN_OFFSET: f32 = 200.0;
    pub const ENEMY_SPAWN_BOTTOM_MARGIN: f32 = 60.0;
    pub const WANDER_MIN_INTERVAL_MS: f32 = 1000.0;
    pub const WANDER_MAX_INTERVAL_MS: f32 = 3000.0;
    pub const WANDER_STOP_CHANCE: f64 = 0.25;
    pub const WANDER_MIN_STOP_MS: f32 = 300.0;
    pub const WANDER_MAX_STOP_MS: f32 = 1800.0;

    /// Speed factor sampling
    pub const SPEED_FACTOR_MIN: f32 = 0.05;
    pub const SPEED_FACTOR_MAX: f32 = 1.0;
    pub const SPEED_FACTOR_MIN_DELTA: f32 = 0.08;
    pub const SPEED_FACTOR_ATTEMPTS: u32 = 60;

    /// Boss
    pub const BOSS_REQUIRED_HITS: u32 = 10;
    pub const BOSS_BASE_SPEED: f32 = 80.0;
    pub const BOSS_WIDTH: f32 = 200.0;
    pub const BOSS_HEIGHT: f32 = 300.0;
    pub const BOSS_SPAWN_OFFSET: f32 = 100.0;
    /// Score at which boss progress starts counting
    pub const BOSS_PROGRESS_FLOOR: u32 = 2000;
    /// Raw score the player must hold before the boss appears
    pub const BOSS_MIN_RAW_SCORE: u32 = 120_000;

    /// Spawning
    pub const SPAWN_INTERVAL_MS: f32 = 500.0;
    pub const SPAWN_WINDOW_MS: f64 = 1000.0;

    /// Hit boxes shrink by this factor for fairness
    pub const HITBOX_SHRINK: f32 = 0.9;
}

/// Round half away from zero and convert to u32, saturating at the bounds
#[inline]
pub fn round_u32(value: f64) -> u32 {
    value.round().clamp(0.0, u32::MAX as f64) as u32
}

/// Unit vector for keyboard-style direction flags
///
/// Diagonals are normalized so they are no faster than straight input.
#[inline]
pub fn input_direction(up: bool, down: bool, left: bool, right: bool) -> Vec2 {
    let mut dir = Vec2::ZERO;
    if left {
        dir.x -= 1.0;
    }
    if right {
        dir.x += 1.0;
    }
    if up {
        dir.y -= 1.0;
    }
    if down {
        dir.y += 1.0;
    }
    dir.normalize_or_zero()
}
