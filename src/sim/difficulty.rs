//! Difficulty levels and their tuning tables

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseDifficultyError;

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    /// Endless mode: no boss, higher caps
    Infinity,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Infinity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Infinity => "infinity",
        }
    }

    /// Score a session starts with
    pub fn start_score(&self) -> u32 {
        match self {
            Difficulty::Infinity => 10_000,
            _ => 2000,
        }
    }

    /// Share of an eaten enemy's score the player gains
    pub fn eat_fraction(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal | Difficulty::Hard => 0.2,
            Difficulty::Infinity => 0.025,
        }
    }

    /// Highest score the world will hold
    pub fn score_cap(&self) -> u32 {
        match self {
            Difficulty::Infinity => 999_999,
            _ => 120_000,
        }
    }

    /// Multiplier applied when ranking a finished run
    pub fn final_score_multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal | Difficulty::Infinity => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "infinity" | "endless" => Ok(Difficulty::Infinity),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// Spawn and progression tuning for one difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyPreset {
    /// Scales how many enemies each spawn request asks for
    pub spawn_multiplier: f32,
    /// Most new enemies admitted per rolling second
    pub spawn_rate_max_per_sec: u32,
    pub min_enemies: usize,
    pub max_enemies: usize,
    /// Highest score a spawned enemy can have
    pub enemy_score_cap: u32,
    /// Score that fills the boss progress bar; `None` disables the boss
    pub boss_trigger_score: Option<u32>,
    /// Minimum share of the population the player can eat
    pub min_edible_fraction: f32,
    pub ramp_duration_ms: f64,
    pub ramp_target: usize,
    pub boss_speed_multiplier: f32,
}

impl Default for DifficultyPreset {
    fn default() -> Self {
        Self {
            spawn_multiplier: 1.0,
            spawn_rate_max_per_sec: 5,
            min_enemies: 15,
            max_enemies: 25,
            enemy_score_cap: 120_000,
            boss_trigger_score: Some(120_000),
            min_edible_fraction: 0.3,
            ramp_duration_ms: 10_000.0,
            ramp_target: 15,
            boss_speed_multiplier: 1.0,
        }
    }
}

impl DifficultyPreset {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let base = Self::default();
        match difficulty {
            Difficulty::Easy => Self {
                spawn_multiplier: 0.9,
                // Slightly higher rate so edible fish show up sooner
                spawn_rate_max_per_sec: 6,
                max_enemies: 18,
                ramp_duration_ms: (base.ramp_duration_ms * 0.4).max(3000.0),
                ramp_target: ((base.ramp_target as f32 * 1.25).round() as usize).max(base.ramp_target),
                boss_trigger_score: Some(48_000),
                boss_speed_multiplier: 0.8,
                ..base
            },
            Difficulty::Normal => Self {
                spawn_multiplier: 1.25,
                ..base
            },
            Difficulty::Hard => Self {
                spawn_multiplier: 2.5,
                spawn_rate_max_per_sec: 14,
                max_enemies: (base.max_enemies * 3).max(60),
                min_enemies: ((base.min_enemies as f32 * 1.2).round() as usize).max(18),
                min_edible_fraction: 0.15,
                ramp_duration_ms: (base.ramp_duration_ms * 1.5).max(15_000.0),
                ramp_target: ((base.ramp_target as f32 * 0.95).round() as usize).max(base.ramp_target),
                boss_speed_multiplier: 1.3,
                ..base
            },
            Difficulty::Infinity => Self {
                spawn_multiplier: 2.0,
                spawn_rate_max_per_sec: 12,
                max_enemies: (base.max_enemies * 2).max(40),
                enemy_score_cap: 130_000,
                boss_trigger_score: None,
                ..base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_table() {
        let easy = DifficultyPreset::for_difficulty(Difficulty::Easy);
        assert_eq!(easy.max_enemies, 18);
        assert_eq!(easy.ramp_duration_ms, 4000.0);
        assert_eq!(easy.ramp_target, 19);
        assert_eq!(easy.boss_trigger_score, Some(48_000));

        let hard = DifficultyPreset::for_difficulty(Difficulty::Hard);
        assert_eq!(hard.max_enemies, 75);
        assert_eq!(hard.min_enemies, 18);
        assert_eq!(hard.ramp_duration_ms, 15_000.0);
        assert_eq!(hard.ramp_target, 15);
        assert!((hard.min_edible_fraction - 0.15).abs() < 1e-6);

        let inf = DifficultyPreset::for_difficulty(Difficulty::Infinity);
        assert_eq!(inf.max_enemies, 50);
        assert_eq!(inf.enemy_score_cap, 130_000);
        assert_eq!(inf.boss_trigger_score, None);
    }

    #[test]
    fn test_presets_keep_min_below_max() {
        for d in Difficulty::ALL {
            let p = DifficultyPreset::for_difficulty(d);
            assert!(p.min_enemies <= p.max_enemies, "{:?}", d);
            assert!(p.spawn_rate_max_per_sec > 0);
        }
    }

    #[test]
    fn test_difficulty_round_trip_str() {
        for d in Difficulty::ALL {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), d);
        }
        assert_eq!(" HARD ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        let err = "nightmare".parse::<Difficulty>().unwrap_err();
        assert_eq!(err.to_string(), "unknown difficulty: nightmare");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Difficulty::Infinity).unwrap();
        assert_eq!(json, "\"infinity\"");
    }
}
