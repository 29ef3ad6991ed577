//! High score leaderboard system
//!
//! Persisted to LocalStorage. Easy runs are kept in their own list so they
//! never crowd out the main ranking.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::persistence;
use crate::sim::{Difficulty, SessionSummary};

/// Maximum number of records kept per list
pub const MAX_HIGH_SCORES: usize = 50;

/// Play time after which the time factor bottoms out (seconds)
const TIME_SCALE_SECS: f64 = 180.0;
const MIN_TIME_FACTOR: f64 = 0.5;

/// Rank a finished run: difficulty multiplier times a linear time decay
///
/// The time factor falls from 1 at zero seconds to 0.5 at three minutes and
/// stays there.
pub fn calculate_final_score(score: u32, difficulty: Difficulty, elapsed_ms: f64) -> u32 {
    let seconds = elapsed_ms.max(0.0) / 1000.0;
    let time_factor = (1.0 - seconds / TIME_SCALE_SECS).clamp(MIN_TIME_FACTOR, 1.0);
    crate::round_u32(score as f64 * difficulty.final_score_multiplier() * time_factor)
}

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreRecord {
    pub name: String,
    /// Raw score at the end of the run
    pub score: u32,
    pub final_score: u32,
    pub difficulty: Difficulty,
    /// Play time (ms)
    pub time_ms: u64,
    /// When the run ended, as supplied by the caller
    pub when: String,
}

impl HighScoreRecord {
    pub fn from_summary(name: &str, summary: &SessionSummary, when: &str) -> Self {
        Self {
            name: name.to_string(),
            score: summary.score,
            final_score: calculate_final_score(summary.score, summary.difficulty, summary.elapsed_ms),
            difficulty: summary.difficulty,
            time_ms: summary.elapsed_ms.max(0.0).round() as u64,
            when: when.to_string(),
        }
    }
}

/// Higher score first; on a tie the faster run wins
fn ranking(a: &HighScoreRecord, b: &HighScoreRecord) -> Ordering {
    b.score.cmp(&a.score).then(a.time_ms.cmp(&b.time_ms))
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighScores {
    pub entries: Vec<HighScoreRecord>,
    /// Easy-mode runs, ranked separately
    pub easy_entries: Vec<HighScoreRecord>,
}

impl HighScores {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "sharky_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished run to the appropriate list
    ///
    /// Returns the rank achieved (1-indexed) or None if it fell off the end.
    pub fn add_record(&mut self, record: HighScoreRecord) -> Option<usize> {
        let list = if record.difficulty == Difficulty::Easy {
            &mut self.easy_entries
        } else {
            &mut self.entries
        };

        // Insert after every record that ranks at least as high
        let pos = list
            .iter()
            .position(|e| ranking(&record, e) == Ordering::Less)
            .unwrap_or(list.len());
        if pos >= MAX_HIGH_SCORES {
            return None;
        }
        list.insert(pos, record);
        list.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    /// Best `n` records; easy runs only when asked for
    pub fn top(&self, n: usize, include_easy: bool) -> Vec<HighScoreRecord> {
        let mut list: Vec<HighScoreRecord> = self
            .entries
            .iter()
            .filter(|r| include_easy || r.difficulty != Difficulty::Easy)
            .cloned()
            .collect();
        if include_easy {
            list.extend(self.easy_entries.iter().cloned());
        }
        list.sort_by(ranking);
        list.truncate(n);
        list
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.easy_entries.is_empty()
    }

    /// Get the top score of the main list (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Parse stored JSON, re-sorting and capping whatever was there
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.normalize();
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Move misfiled easy runs, sort and cap both lists
    fn normalize(&mut self) {
        let (easy, main): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|r| r.difficulty == Difficulty::Easy);
        self.entries = main;
        self.easy_entries.extend(easy);
        for list in [&mut self.entries, &mut self.easy_entries] {
            list.sort_by(ranking);
            list.truncate(MAX_HIGH_SCORES);
        }
    }

    /// Load high scores from storage, falling back to an empty board
    pub fn load() -> Self {
        let mut scores: HighScores = persistence::load_or_default(Self::STORAGE_KEY, "high scores");
        scores.normalize();
        scores
    }

    pub fn save(&self) -> Result<(), StorageError> {
        persistence::save_json(Self::STORAGE_KEY, self)?;
        log::info!(
            "High scores saved ({} entries, {} easy)",
            self.entries.len(),
            self.easy_entries.len()
        );
        Ok(())
    }
}
