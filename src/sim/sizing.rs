//! Score-to-size mapping shared by every creature
//!
//! The "eat if score >= target" rule only reads fairly on screen when equal
//! scores draw at equal sizes, so the character and all enemies go through
//! the same curve.

use glam::Vec2;

use crate::consts::*;

/// Map a score onto a rendered size (width, height) in pixels
///
/// Scores outside `[SIZE_MIN_SCORE, SIZE_MAX_SCORE]` clamp to the ends of the
/// height range. Width is 60% of height, never below 16 px.
pub fn size_from_score(score: u32) -> Vec2 {
    let clamped = score.clamp(SIZE_MIN_SCORE, SIZE_MAX_SCORE);
    let t = (clamped - SIZE_MIN_SCORE) as f32 / (SIZE_MAX_SCORE - SIZE_MIN_SCORE) as f32;
    let height = (SIZE_MIN_HEIGHT + (SIZE_MAX_HEIGHT - SIZE_MIN_HEIGHT) * t).round();
    let width = (height * SIZE_ASPECT).round().max(SIZE_MIN_WIDTH);
    Vec2::new(width, height)
}

/// Inverse of [`size_from_score`] on the height axis
///
/// Returns the score that would render at `height`. Heights outside the
/// mapped range clamp to the score bounds.
pub fn score_from_height(height: f32) -> u32 {
    let t = ((height - SIZE_MIN_HEIGHT) / (SIZE_MAX_HEIGHT - SIZE_MIN_HEIGHT)).clamp(0.0, 1.0);
    let span = (SIZE_MAX_SCORE - SIZE_MIN_SCORE) as f64;
    crate::round_u32(SIZE_MIN_SCORE as f64 + span * t as f64)
}
