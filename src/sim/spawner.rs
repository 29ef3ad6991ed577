//! Enemy population control
//!
//! Keeps the enemy count near a moving target, throttles spawns with a
//! rolling one-second window, and picks enemy scores so that a minimum share
//! of the population is always edible for the player.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyPreset;
use crate::consts::*;

/// Spawn timing state for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    window_start_ms: f64,
    spawned_in_window: u32,
    spawn_timer_ms: f32,
    ramp_start_ms: f64,
}

impl Spawner {
    pub fn new(now_ms: f64) -> Self {
        Self {
            window_start_ms: now_ms,
            spawned_in_window: 0,
            spawn_timer_ms: 0.0,
            ramp_start_ms: now_ms,
        }
    }

    /// Restart the ramp and clear the rate window
    pub fn reset(&mut self, now_ms: f64) {
        *self = Self::new(now_ms);
    }

    /// Admit up to `requested` new enemies under the per-second cap
    ///
    /// Returns how many may be spawned now. The window rolls over once a full
    /// second has passed since it opened.
    pub fn admit(&mut self, requested: usize, now_ms: f64, max_per_sec: u32) -> usize {
        if now_ms - self.window_start_ms >= SPAWN_WINDOW_MS {
            self.window_start_ms = now_ms;
            self.spawned_in_window = 0;
        }
        let allowed = max_per_sec.saturating_sub(self.spawned_in_window) as usize;
        let admitted = requested.min(allowed);
        self.spawned_in_window += admitted as u32;
        if admitted < requested {
            log::debug!(
                "Spawn rate limit: admitted {} of {} ({} this window)",
                admitted,
                requested,
                self.spawned_in_window
            );
        }
        admitted
    }

    pub fn spawned_in_window(&self) -> u32 {
        self.spawned_in_window
    }

    pub fn in_ramp(&self, preset: &DifficultyPreset, now_ms: f64) -> bool {
        now_ms - self.ramp_start_ms < preset.ramp_duration_ms
    }

    /// Target population for this tick
    ///
    /// During the ramp the target climbs linearly from `min_enemies` toward
    /// the ramp target with a jitter of 0 or 1; afterwards it is re-rolled
    /// uniformly within bounds.
    pub fn desired_count(&self, preset: &DifficultyPreset, now_ms: f64, rng: &mut Pcg32) -> usize {
        let min = preset.min_enemies;
        let max = preset.max_enemies.max(min);
        if self.in_ramp(preset, now_ms) {
            let t = ((now_ms - self.ramp_start_ms) / preset.ramp_duration_ms).clamp(0.0, 1.0);
            let ramp_target = preset.ramp_target.max(min);
            let target = (min as f64 + (ramp_target - min) as f64 * t).round() as usize;
            (target + rng.random_range(0..=1usize)).clamp(min, max)
        } else {
            rng.random_range(min..=max)
        }
    }

    pub fn accumulate(&mut self, dt_ms: f32) {
        self.spawn_timer_ms += dt_ms;
    }

    pub fn reset_timer(&mut self) {
        self.spawn_timer_ms = 0.0;
    }

    /// Consume one spawn interval from the timer if a full one has built up
    pub fn take_interval(&mut self) -> bool {
        if self.spawn_timer_ms >= SPAWN_INTERVAL_MS {
            self.spawn_timer_ms -= SPAWN_INTERVAL_MS;
            true
        } else {
            false
        }
    }
}

/// How many of `new_count` fresh enemies must be edible
///
/// Edible means `score <= character-equivalent score`. The quota tops the
/// population up to `ceil(min_fraction * (current + new))` edible enemies.
pub fn edible_quota(current_count: usize, current_edible: usize, new_count: usize, min_fraction: f32) -> usize {
    let total = (current_count + new_count) as f64;
    // Small epsilon so 0.3 * 10 doesn't ceil to 4
    let needed = (min_fraction as f64 * total - 1e-9).ceil().max(0.0) as usize;
    needed.saturating_sub(current_edible).min(new_count)
}

/// Roll an enemy score on the edible or dangerous side of `char_equivalent`
///
/// Edible scores fall in `[ENEMY_MIN_SCORE, char_equivalent]`, dangerous ones
/// in `(char_equivalent, cap]`. When the player is already at the cap there
/// is no dangerous range and the cap itself is returned.
pub fn roll_enemy_score(rng: &mut Pcg32, edible: bool, char_equivalent: u32, cap: u32) -> u32 {
    let low = ENEMY_MIN_SCORE;
    let high = cap.max(low);
    if edible {
        let upper = char_equivalent.clamp(low, high);
        rng.random_range(low..=upper)
    } else {
        let lower = low.max(char_equivalent.saturating_add(1));
        if lower > high {
            high
        } else {
            rng.random_range(lower..=high)
        }
    }
}

/// Pick a speed factor that keeps clear of the ones already in play
///
/// This is a bounded rejection sampler, not a uniqueness guarantee: after
/// the attempts run out it settles for any value in range. Samples lean
/// toward the slow and fast ends so the school visibly varies.
pub fn unique_speed_factor(rng: &mut Pcg32, taken: &[f32]) -> f32 {
    for _ in 0..SPEED_FACTOR_ATTEMPTS {
        let band: f32 = rng.random();
        let value = if band < 0.35 {
            rng.random_range(SPEED_FACTOR_MIN..0.25)
        } else if band > 0.65 {
            rng.random_range(0.7..SPEED_FACTOR_MAX)
        } else {
            rng.random_range(SPEED_FACTOR_MIN..SPEED_FACTOR_MAX)
        };
        let conflict = taken
            .iter()
            .any(|&f| (f - value).abs() < SPEED_FACTOR_MIN_DELTA);
        if !conflict {
            return quantize_speed(value);
        }
    }
    quantize_speed(rng.random_range(SPEED_FACTOR_MIN..SPEED_FACTOR_MAX))
}

fn quantize_speed(value: f32) -> f32 {
    ((value * 100.0).round() / 100.0).clamp(SPEED_FACTOR_MIN, SPEED_FACTOR_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_rate_limit_within_window() {
        let mut s = Spawner::new(0.0);
        assert_eq!(s.admit(3, 0.0, 5), 3);
        assert_eq!(s.admit(3, 400.0, 5), 2);
        assert_eq!(s.admit(1, 999.0, 5), 0);
        assert_eq!(s.spawned_in_window(), 5);
        // Window rolls over after a full second
        assert_eq!(s.admit(1, 1000.0, 5), 1);
        assert_eq!(s.spawned_in_window(), 1);
    }

    #[test]
    fn test_edible_quota() {
        // 10 total at 30% needs 3, none edible yet
        assert_eq!(edible_quota(9, 0, 1, 0.3), 1);
        assert_eq!(edible_quota(5, 0, 5, 0.3), 3);
        assert_eq!(edible_quota(5, 3, 5, 0.3), 0);
        assert_eq!(edible_quota(0, 0, 1, 0.15), 1);
        assert_eq!(edible_quota(20, 20, 1, 0.3), 0);
    }

    #[test]
    fn test_dangerous_roll_at_cap() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(roll_enemy_score(&mut rng, false, 200_000, 120_000), 120_000);
    }

    #[test]
    fn test_ramp_grows_toward_target() {
        let mut rng = Pcg32::seed_from_u64(5);
        let preset = DifficultyPreset {
            min_enemies: 5,
            max_enemies: 30,
            ramp_target: 25,
            ramp_duration_ms: 10_000.0,
            ..DifficultyPreset::default()
        };
        let s = Spawner::new(0.0);
        let early = s.desired_count(&preset, 0.0, &mut rng);
        assert!((5..=6).contains(&early));
        let mid = s.desired_count(&preset, 5000.0, &mut rng);
        assert!((15..=16).contains(&mid));
        for _ in 0..50 {
            let after = s.desired_count(&preset, 20_000.0, &mut rng);
            assert!((5..=30).contains(&after));
        }
    }

    #[test]
    fn test_spawn_timer_intervals() {
        let mut s = Spawner::new(0.0);
        s.accumulate(1200.0);
        assert!(s.take_interval());
        assert!(s.take_interval());
        assert!(!s.take_interval());
        s.reset_timer();
        s.accumulate(499.0);
        assert!(!s.take_interval());
    }

    #[test]
    fn test_speed_factor_spreads_out() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut taken = Vec::new();
        for _ in 0..8 {
            let f = unique_speed_factor(&mut rng, &taken);
            assert!((SPEED_FACTOR_MIN..=SPEED_FACTOR_MAX).contains(&f));
            taken.push(f);
        }
        // Eight values at 0.08 spacing fit comfortably in [0.05, 1.0]
        let mut sorted = taken.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let close_pairs = sorted.windows(2).filter(|w| w[1] - w[0] < 0.07).count();
        assert!(close_pairs <= 1, "factors clustered: {:?}", sorted);
    }

    proptest! {
        #[test]
        fn prop_rate_limit_never_exceeds_cap(
            requests in proptest::collection::vec((0usize..10, 0.0f64..200.0), 1..40),
            cap in 1u32..15,
        ) {
            let mut s = Spawner::new(0.0);
            let mut now = 0.0;
            let mut window_start = 0.0;
            let mut in_window = 0usize;
            for (req, step) in requests {
                now += step;
                if now - window_start >= SPAWN_WINDOW_MS {
                    window_start = now;
                    in_window = 0;
                }
                in_window += s.admit(req, now, cap);
                prop_assert!(in_window <= cap as usize);
            }
        }

        #[test]
        fn prop_scores_on_correct_side(seed in any::<u64>(), char_eq in 200u32..130_000, edible in any::<bool>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let score = roll_enemy_score(&mut rng, edible, char_eq, 120_000);
            prop_assert!(score >= ENEMY_MIN_SCORE && score <= 120_000);
            if edible {
                prop_assert!(score <= char_eq.max(ENEMY_MIN_SCORE));
            } else if char_eq < 120_000 {
                prop_assert!(score > char_eq);
            }
        }
    }
}
