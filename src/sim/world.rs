//! Session orchestrator
//!
//! A [`World`] owns every entity of one play session and advances them with
//! [`World::update`]. Collision rules, population control, boss transitions
//! and the win/loss state machine all live here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bubble::Bubble;
use super::character::Character;
use super::collision::hit_boxes_overlap;
use super::difficulty::{Difficulty, DifficultyPreset};
use super::enemy::{Enemy, EnemyKind, Motion};
use super::entity::{Drawable, Entity, TickContext};
use super::sizing::{score_from_height, size_from_score};
use super::spawner::{Spawner, edible_quota, roll_enemy_score, unique_speed_factor};
use crate::consts::*;
use crate::highscores::HighScoreRecord;
use crate::{input_direction, round_u32};

/// Construction-time settings for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub difficulty: Difficulty,
    /// Seed for every random decision in the session
    pub seed: u64,
    /// Enemies roam the canvas instead of drifting across it
    pub wandering_enemies: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            difficulty: Difficulty::Normal,
            seed: 0,
            wandering_enemies: false,
        }
    }
}

impl WorldConfig {
    pub fn canvas(&self) -> Vec2 {
        Vec2::new(self.canvas_width, self.canvas_height)
    }
}

/// Input state for a single update
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Fin slap (held is fine, the cooldown paces it)
    pub melee: bool,
    /// Bubble shot
    pub shoot: bool,
    /// Pause toggle, pressed this frame
    pub pause: bool,
}

impl TickInput {
    /// Normalized movement direction
    pub fn direction(&self) -> Vec2 {
        input_direction(self.up, self.down, self.left, self.right)
    }
}

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    /// Terminal until restart
    GameOver,
    /// Boss defeated; terminal until restart
    Victory,
}

/// Discrete things that happened during an update, for audio and UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Eat { enemy_id: u32, score_gained: u32 },
    Shoot,
    FinSlap,
    EnemyKilled { enemy_id: u32 },
    BossHit { hits: u32, required: u32 },
    BossFightStarted,
    GameOver,
    Victory,
}

/// Snapshot of a session for the end screen and highscores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u32,
    pub enemies_eaten: u32,
    pub elapsed_ms: f64,
    pub difficulty: Difficulty,
    pub outcome: GamePhase,
}

/// One play session
#[derive(Debug, Clone)]
pub struct World {
    pub config: WorldConfig,
    pub preset: DifficultyPreset,
    pub score: u32,
    /// Play time; frozen while paused and after the session ends
    pub elapsed_ms: f64,
    /// Session clock; runs on every update
    pub now_ms: f64,
    pub character: Character,
    pub enemies: Vec<Enemy>,
    pub bubbles: Vec<Bubble>,
    pub boss_active: bool,
    pub phase: GamePhase,
    pub paused: bool,
    pub enemies_eaten: u32,
    running: bool,
    spawner: Spawner,
    rng: Pcg32,
    next_id: u32,
    events: Vec<GameEvent>,
}

impl World {
    /// Build a fresh session; nothing moves until [`World::start`]
    pub fn new(config: WorldConfig) -> Self {
        let preset = DifficultyPreset::for_difficulty(config.difficulty);
        let score = config.difficulty.start_score();
        let character = Character::new(1, config.canvas(), score);
        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            preset,
            score,
            elapsed_ms: 0.0,
            now_ms: 0.0,
            character,
            enemies: Vec::new(),
            bubbles: Vec::new(),
            boss_active: false,
            phase: GamePhase::Running,
            paused: false,
            enemies_eaten: 0,
            running: false,
            spawner: Spawner::new(0.0),
            next_id: 2,
            events: Vec::new(),
            config,
        }
    }

    /// Begin the session and spawn the first school of enemies
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        // The clock may have run while waiting for start
        self.spawner.reset(self.now_ms);
        log::info!(
            "Session started: difficulty {}, seed {}",
            self.config.difficulty.as_str(),
            self.config.seed
        );
        self.populate_enemies(None);
    }

    /// Reset to a fresh running session with the same seed and difficulty
    pub fn restart_game(&mut self) {
        *self = Self::new(self.config.clone());
        self.running = true;
        self.populate_enemies(None);
        log::info!("Game restarted");
    }

    /// Restart with a different seed, for a new layout
    pub fn restart_with_seed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.restart_game();
    }

    /// Switch difficulty; the start score applies from the next restart
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
        self.preset = DifficultyPreset::for_difficulty(difficulty);
        log::info!("Difficulty set to {}", difficulty.as_str());
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Game over or victory
    pub fn is_over(&self) -> bool {
        self.phase != GamePhase::Running
    }

    pub fn canvas(&self) -> Vec2 {
        self.config.canvas()
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Pausing only applies while the session is still being played
    pub fn set_paused(&mut self, paused: bool) {
        if self.is_over() || self.paused == paused {
            return;
        }
        self.paused = paused;
        log::info!("{}", if paused { "Paused" } else { "Resumed" });
    }

    /// Advance the session by `dt_ms` milliseconds
    pub fn update(&mut self, dt_ms: f32, input: &TickInput) {
        let dt = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, MAX_FRAME_DT_MS)
        } else {
            0.0
        };
        self.now_ms += dt as f64;

        if input.pause {
            self.toggle_pause();
        }
        if !self.running || self.paused || self.is_over() {
            return;
        }
        self.elapsed_ms += dt as f64;
        let now = self.now_ms;

        // Actions
        if input.melee && self.character.can_attack() {
            let before: Vec<(bool, Option<u32>)> = self
                .enemies
                .iter()
                .map(|e| (e.is_dead(), e.hit_count()))
                .collect();
            if self.character.fin_slap(&mut self.enemies, now) {
                self.events.push(GameEvent::FinSlap);
                self.report_damage(&before);
            }
        }
        if input.shoot {
            let id = self.next_id;
            if let Some(bubble) = self.character.shoot_bubble(&mut self.score, id, now) {
                self.next_id += 1;
                self.bubbles.push(bubble);
                self.events.push(GameEvent::Shoot);
            }
        }

        // Movement
        let ctx = TickContext {
            input_dir: input.direction(),
            canvas: self.canvas(),
            player_center: self.character.body.center(),
            base_speed: CHARACTER_BASE_SPEED,
        };
        self.character.update(&ctx, &mut self.rng, dt);
        for enemy in &mut self.enemies {
            enemy.update(&ctx, &mut self.rng, dt);
        }
        for bubble in &mut self.bubbles {
            bubble.update(&ctx, &mut self.rng, dt);
        }

        self.resolve_bubble_hits();
        self.resolve_character_contacts();

        // Prune
        let canvas = self.canvas();
        self.enemies
            .retain(|e| !e.is_dead() && !e.is_offscreen(canvas));
        self.bubbles.retain(|b| !b.is_expired(now));

        if self.is_over() {
            return;
        }
        if self.boss_active && !self.enemies.iter().any(|e| e.is_boss()) {
            self.boss_active = false;
            self.trigger_victory();
            return;
        }

        if !self.boss_active {
            self.spawn_tick(dt);
        }

        // Sizes follow score
        self.character.apply_score(self.score);
        for enemy in &mut self.enemies {
            enemy.apply_size_from_score();
        }

        if !self.boss_active && self.boss_trigger_reached() {
            self.start_boss_fight();
        }
    }

    /// Bubbles damage the first living enemy they touch, then pop
    fn resolve_bubble_hits(&mut self) {
        let now = self.now_ms;
        for bubble in self.bubbles.iter_mut().filter(|b| !b.is_expired(now)) {
            let bubble_box = bubble.hit_box();
            let Some(enemy) = self
                .enemies
                .iter_mut()
                .find(|e| !e.is_dead() && hit_boxes_overlap(&bubble_box, &e.hit_box()))
            else {
                continue;
            };
            enemy.take_damage(bubble.damage, now);
            bubble.pop();

            if let EnemyKind::Boss {
                hit_count,
                max_health,
            } = enemy.kind
            {
                self.events.push(GameEvent::BossHit {
                    hits: hit_count,
                    required: max_health,
                });
            } else if enemy.is_dead() {
                self.events.push(GameEvent::EnemyKilled {
                    enemy_id: enemy.body.id,
                });
            }
        }
    }

    /// Eat what is small enough, die to anything else
    fn resolve_character_contacts(&mut self) {
        let char_box = self.character.hit_box();
        let fraction = self.config.difficulty.eat_fraction();
        let cap = self.config.difficulty.score_cap();
        let mut lost = self.character.is_dead();

        for enemy in self.enemies.iter_mut() {
            if lost {
                break;
            }
            if enemy.is_dead() || !hit_boxes_overlap(&char_box, &enemy.hit_box()) {
                continue;
            }
            if enemy.is_boss() || self.score < enemy.score {
                lost = true;
                continue;
            }
            enemy.body.dead = true;
            self.enemies_eaten += 1;
            let gained = round_u32(enemy.score as f64 * fraction);
            self.score = self.score.saturating_add(gained).min(cap);
            self.character.pulse();
            self.events.push(GameEvent::Eat {
                enemy_id: enemy.body.id,
                score_gained: gained,
            });
        }

        if lost {
            self.trigger_game_over();
        }
    }

    /// Emit events for damage dealt since `before` was taken
    fn report_damage(&mut self, before: &[(bool, Option<u32>)]) {
        for (enemy, &(was_dead, hits_before)) in self.enemies.iter().zip(before) {
            match enemy.kind {
                EnemyKind::Boss {
                    hit_count,
                    max_health,
                } if Some(hit_count) != hits_before => {
                    self.events.push(GameEvent::BossHit {
                        hits: hit_count,
                        required: max_health,
                    });
                }
                EnemyKind::Puffer | EnemyKind::Jelly if !was_dead && enemy.is_dead() => {
                    self.events.push(GameEvent::EnemyKilled {
                        enemy_id: enemy.body.id,
                    });
                }
                _ => {}
            }
        }
    }

    fn spawn_tick(&mut self, dt: f32) {
        let desired = self
            .spawner
            .desired_count(&self.preset, self.now_ms, &mut self.rng);
        if self.enemies.len() < desired {
            self.spawner.accumulate(dt);
            while self.enemies.len() < desired && self.spawner.take_interval() {
                self.populate_enemies(Some(1));
            }
        } else {
            self.spawner.reset_timer();
        }
    }

    /// Spawn a batch of regular enemies
    ///
    /// `None` (or zero) asks for a random batch within the preset's bounds.
    /// The request is scaled by the spawn multiplier and then throttled by the
    /// rate limiter. Returns how many enemies were actually added.
    pub fn populate_enemies(&mut self, count: Option<usize>) -> usize {
        let min = self.preset.min_enemies;
        let max = self.preset.max_enemies.max(min);
        let base = match count {
            Some(n) if n > 0 => n,
            _ => self.rng.random_range(min..=max),
        };
        let requested = ((base as f32 * self.preset.spawn_multiplier).round() as usize).max(1);
        let num = self
            .spawner
            .admit(requested, self.now_ms, self.preset.spawn_rate_max_per_sec);
        if num == 0 {
            return 0;
        }

        // Whole-pixel heights can put the equivalent above the real score
        let char_equivalent = score_from_height(self.character.body.size.y).min(self.score);
        let living = self.enemies.iter().filter(|e| !e.is_boss() && !e.is_dead());
        let current_count = living.clone().count();
        let current_edible = living.filter(|e| e.score <= char_equivalent).count();
        let quota = edible_quota(
            current_count,
            current_edible,
            num,
            self.preset.min_edible_fraction,
        );

        let canvas = self.canvas();
        let mut taken: Vec<f32> = self.enemies.iter().map(|e| e.speed_factor).collect();
        for i in 0..num {
            let edible = i < quota;
            let kind = if self.rng.random_bool(0.5) {
                EnemyKind::Puffer
            } else {
                EnemyKind::Jelly
            };
            let from_right = self.rng.random_bool(0.5);
            let y = self
                .rng
                .random_range(0.0..(canvas.y - ENEMY_SPAWN_BOTTOM_MARGIN).max(1.0));
            let score = roll_enemy_score(
                &mut self.rng,
                edible,
                char_equivalent,
                self.preset.enemy_score_cap,
            );
            let speed_factor = unique_speed_factor(&mut self.rng, &taken);
            taken.push(speed_factor);

            let size = size_from_score(score);
            let (x, motion) = if self.config.wandering_enemies {
                let x = self.rng.random_range(0.0..(canvas.x - size.x).max(1.0));
                (x, Motion::wander(&mut self.rng))
            } else if from_right {
                let x = canvas.x + self.rng.random_range(0.0..ENEMY_SPAWN_OFFSET);
                (x, Motion::drift(-1.0))
            } else {
                let x = -self.rng.random_range(0.0..ENEMY_SPAWN_OFFSET) - size.x;
                (x, Motion::drift(1.0))
            };

            let id = self.next_entity_id();
            log::debug!(
                "Spawn {} #{}: score {} ({}), speed {:.2}",
                kind.entity_kind().as_str(),
                id,
                score,
                if edible { "edible" } else { "dangerous" },
                speed_factor
            );
            self.enemies.push(Enemy::fish(
                id,
                kind,
                score,
                speed_factor,
                Vec2::new(x, y),
                motion,
            ));
        }
        num
    }

    /// Progress toward the boss fight in [0, 1]
    pub fn boss_progress(&self) -> f32 {
        let target = self
            .preset
            .boss_trigger_score
            .unwrap_or_else(|| self.config.difficulty.score_cap());
        let span = target.saturating_sub(BOSS_PROGRESS_FLOOR).max(1) as f32;
        (self.score.saturating_sub(BOSS_PROGRESS_FLOOR) as f32 / span).clamp(0.0, 1.0)
    }

    /// Full progress bar and the raw score floor; never without a trigger
    fn boss_trigger_reached(&self) -> bool {
        self.preset.boss_trigger_score.is_some()
            && self.boss_progress() >= 1.0
            && self.score >= BOSS_MIN_RAW_SCORE
    }

    /// Clear the school and bring in the boss
    ///
    /// Returns false if a boss fight is already on or the session has ended.
    pub fn start_boss_fight(&mut self) -> bool {
        if self.boss_active || self.is_over() {
            return false;
        }
        self.enemies.clear();
        self.boss_active = true;
        let id = self.next_entity_id();
        self.enemies.push(Enemy::boss(
            id,
            self.canvas(),
            self.preset.boss_speed_multiplier,
        ));
        self.events.push(GameEvent::BossFightStarted);
        log::info!("Boss fight started at score {}", self.score);
        true
    }

    fn trigger_game_over(&mut self) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver);
        log::info!(
            "Game over: score {}, eaten {}, {:.1}s",
            self.score,
            self.enemies_eaten,
            self.elapsed_ms / 1000.0
        );
    }

    fn trigger_victory(&mut self) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::Victory;
        self.events.push(GameEvent::Victory);
        log::info!(
            "Victory: score {}, eaten {}, {:.1}s",
            self.score,
            self.enemies_eaten,
            self.elapsed_ms / 1000.0
        );
    }

    /// Take the events collected since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Everything to draw, back to front
    pub fn drawables(&self) -> Vec<Drawable> {
        self.enemies
            .iter()
            .map(Entity::drawable)
            .chain(self.bubbles.iter().map(Entity::drawable))
            .chain(std::iter::once(self.character.drawable()))
            .collect()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            enemies_eaten: self.enemies_eaten,
            elapsed_ms: self.elapsed_ms,
            difficulty: self.config.difficulty,
            outcome: self.phase,
        }
    }

    /// Highscore entry for this session
    pub fn highscore_record(&self, name: &str, when: &str) -> HighScoreRecord {
        HighScoreRecord::from_summary(name, &self.summary(), when)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn world(difficulty: Difficulty) -> World {
        World::new(WorldConfig {
            difficulty,
            seed: 42,
            ..WorldConfig::default()
        })
    }

    /// Place a regular enemy right on top of the character
    fn enemy_on_character(w: &mut World, score: u32) -> u32 {
        let id = w.next_entity_id();
        let center = w.character.body.center();
        let size = size_from_score(score);
        let mut e = Enemy::fish(
            id,
            EnemyKind::Puffer,
            score,
            0.05,
            center - size * 0.5,
            Motion::drift(1.0),
        );
        e.body.vel = Vec2::ZERO;
        w.enemies.push(e);
        id
    }

    #[test]
    fn test_new_world_waits_for_start() {
        let mut w = world(Difficulty::Normal);
        assert!(!w.is_running());
        assert_eq!(w.score, 2000);
        w.update(16.0, &TickInput::default());
        assert_eq!(w.elapsed_ms, 0.0);
        w.start();
        assert!(w.is_running());
        assert!(!w.enemies.is_empty());
        assert!(w.enemies.len() <= w.preset.spawn_rate_max_per_sec as usize);
    }

    #[test]
    fn test_start_opens_fresh_ramp() {
        let mut w = world(Difficulty::Normal);
        for _ in 0..105 {
            w.update(100.0, &TickInput::default());
        }
        assert_eq!(w.now_ms, 10_500.0);
        assert!(!w.spawner.in_ramp(&w.preset, w.now_ms));
        w.start();
        assert!(w.spawner.in_ramp(&w.preset, w.now_ms));
        assert!(!w.enemies.is_empty());
    }

    #[test]
    fn test_edible_spawns_are_safe_below_size_floor() {
        for seed in 0..60 {
            let mut w = World::new(WorldConfig {
                seed,
                ..WorldConfig::default()
            });
            // One bubble below the start score; size stays at the floor
            w.score = 1980;
            let n = w.populate_enemies(Some(4));
            assert!(n > 0);
            let safe = w.enemies.iter().filter(|e| e.score <= w.score).count();
            assert!(
                safe >= (0.3 * n as f64).ceil() as usize,
                "seed {}: {} of {} safe",
                seed,
                safe,
                n
            );
        }
    }

    #[test]
    fn test_infinity_starts_higher() {
        let w = world(Difficulty::Infinity);
        assert_eq!(w.score, 10_000);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut w = world(Difficulty::Normal);
        w.start();
        w.update(5000.0, &TickInput::default());
        assert_eq!(w.elapsed_ms, MAX_FRAME_DT_MS as f64);
        w.update(-20.0, &TickInput::default());
        w.update(f32::NAN, &TickInput::default());
        assert_eq!(w.now_ms, MAX_FRAME_DT_MS as f64);
    }

    #[test]
    fn test_eat_easy_uses_larger_fraction() {
        let mut w = world(Difficulty::Easy);
        w.start();
        w.enemies.clear();
        w.score = 5000;
        enemy_on_character(&mut w, 4000);
        w.update(1.0, &TickInput::default());
        assert_eq!(w.score, 5000 + 3200);
        assert_eq!(w.enemies_eaten, 1);
        assert!((w.character.visual_scale - EAT_PULSE_SCALE).abs() < 1e-6);
    }

    #[test]
    fn test_eat_respects_score_cap() {
        let mut w = world(Difficulty::Normal);
        w.start();
        w.enemies.clear();
        w.score = 119_000;
        enemy_on_character(&mut w, 100_000);
        w.update(1.0, &TickInput::default());
        assert_eq!(w.score, 120_000);
    }

    #[test]
    fn test_equal_score_is_edible() {
        let mut w = world(Difficulty::Normal);
        w.start();
        w.enemies.clear();
        enemy_on_character(&mut w, 2000);
        w.update(1.0, &TickInput::default());
        assert_eq!(w.phase, GamePhase::Running);
        assert_eq!(w.score, 2400);
    }

    #[test]
    fn test_boss_contact_is_fatal() {
        let mut w = world(Difficulty::Normal);
        w.start();
        w.score = 119_000;
        assert!(w.start_boss_fight());
        let center = w.character.body.center();
        let boss = &mut w.enemies[0];
        boss.body.pos = center - boss.body.size * 0.5;
        w.update(1.0, &TickInput::default());
        assert_eq!(w.phase, GamePhase::GameOver);
        assert!(w.drain_events().contains(&GameEvent::GameOver));
    }

    #[test]
    fn test_boss_fight_clears_school() {
        let mut w = world(Difficulty::Normal);
        w.start();
        assert!(!w.enemies.is_empty());
        assert!(w.start_boss_fight());
        assert_eq!(w.enemies.len(), 1);
        assert!(w.enemies[0].is_boss());
        assert!(!w.start_boss_fight());
    }

    #[test]
    fn test_boss_trigger_at_full_progress() {
        let mut w = world(Difficulty::Normal);
        w.start();
        w.enemies.clear();
        w.score = 119_999;
        w.update(1.0, &TickInput::default());
        assert!(!w.boss_active);
        w.score = 120_000;
        w.update(1.0, &TickInput::default());
        assert!(w.boss_active);
        assert!(w.drain_events().contains(&GameEvent::BossFightStarted));
    }

    #[test]
    fn test_infinity_never_triggers_boss() {
        let mut w = world(Difficulty::Infinity);
        w.start();
        w.enemies.clear();
        w.score = 500_000;
        w.update(1.0, &TickInput::default());
        assert!(!w.boss_active);
    }

    #[test]
    fn test_no_spawns_during_boss_fight() {
        let mut w = world(Difficulty::Hard);
        w.start();
        w.start_boss_fight();
        for _ in 0..200 {
            w.update(16.0, &TickInput::default());
            if w.is_over() {
                break;
            }
            assert_eq!(w.enemies.len(), 1);
        }
    }

    #[test]
    fn test_pause_freezes_and_resumes() {
        let mut w = world(Difficulty::Normal);
        w.start();
        let pause = TickInput {
            pause: true,
            ..TickInput::default()
        };
        w.update(16.0, &pause);
        assert!(w.paused);
        let before = w.drawables();
        for _ in 0..10 {
            w.update(16.0, &TickInput::default());
        }
        assert_eq!(w.drawables(), before);
        assert_eq!(w.elapsed_ms, 0.0);
        assert_eq!(w.now_ms, 176.0);
        w.update(16.0, &pause);
        assert!(!w.paused);
    }

    #[test]
    fn test_shoot_spends_score_and_spawns_bubble() {
        let mut w = world(Difficulty::Normal);
        w.start();
        let shoot = TickInput {
            shoot: true,
            ..TickInput::default()
        };
        w.update(1.0, &shoot);
        assert_eq!(w.bubbles.len(), 1);
        assert_eq!(w.score, 1980);
        assert!(w.drain_events().contains(&GameEvent::Shoot));
        // Cooldown
        w.update(1.0, &shoot);
        assert_eq!(w.bubbles.len(), 1);
    }

    #[test]
    fn test_fin_slap_kills_enemy_in_front() {
        let mut w = world(Difficulty::Normal);
        w.start();
        w.enemies.clear();
        let id = w.next_entity_id();
        let area = w.character.fin_slap_area();
        // Hit circle reaches into the slap area but not the character
        let target = Vec2::new(area.max().x + 40.0, area.center().y);
        let size = size_from_score(100_000);
        let mut e = Enemy::fish(
            id,
            EnemyKind::Jelly,
            100_000,
            0.05,
            target - size * 0.5,
            Motion::drift(1.0),
        );
        e.body.vel = Vec2::ZERO;
        w.enemies.push(e);
        let slap = TickInput {
            melee: true,
            ..TickInput::default()
        };
        w.update(1.0, &slap);
        let events = w.drain_events();
        assert!(events.contains(&GameEvent::FinSlap));
        assert!(events.contains(&GameEvent::EnemyKilled { enemy_id: id }));
        assert!(w.enemies.iter().all(|e| e.body.id != id));
        assert_eq!(w.phase, GamePhase::Running);
    }

    #[test]
    fn test_victory_after_ten_bubble_hits() {
        let mut w = world(Difficulty::Normal);
        w.start();
        w.start_boss_fight();
        w.character.body.pos = Vec2::ZERO;
        for i in 0..10 {
            assert_eq!(w.phase, GamePhase::Running, "hit {}", i);
            // Keep the boss far from the character
            w.enemies[0].body.pos.x = w.canvas().x - 100.0;
            let boss_center = w.enemies[0].body.center();
            let id = w.next_entity_id();
            w.bubbles.push(Bubble::new(id, boss_center, 1.0, w.now_ms));
            w.update(0.0, &TickInput::default());
        }
        assert_eq!(w.phase, GamePhase::Victory);
        assert!(!w.boss_active);
        let events = w.drain_events();
        assert!(events.contains(&GameEvent::Victory));
        assert!(events.contains(&GameEvent::BossHit { hits: 10, required: 10 }));
    }

    #[test]
    fn test_restart_resets_session() {
        let mut w = world(Difficulty::Normal);
        w.start();
        for _ in 0..100 {
            w.update(16.0, &TickInput::default());
        }
        w.score = 50_000;
        w.enemies_eaten = 7;
        w.restart_game();
        assert_eq!(w.score, 2000);
        assert_eq!(w.enemies_eaten, 0);
        assert_eq!(w.elapsed_ms, 0.0);
        assert_eq!(w.phase, GamePhase::Running);
        assert!(w.bubbles.is_empty());
        assert!(w.is_running());
    }

    #[test]
    fn test_restart_keeps_difficulty() {
        let mut w = world(Difficulty::Normal);
        w.set_difficulty(Difficulty::Hard);
        w.restart_game();
        assert_eq!(w.config.difficulty, Difficulty::Hard);
        assert_eq!(w.preset, DifficultyPreset::for_difficulty(Difficulty::Hard));
    }

    #[test]
    fn test_boss_progress() {
        let mut w = world(Difficulty::Normal);
        assert_eq!(w.boss_progress(), 0.0);
        w.score = 61_000;
        assert!((w.boss_progress() - 0.5).abs() < 1e-4);
        w.score = 200_000;
        assert_eq!(w.boss_progress(), 1.0);
    }

    #[test]
    fn test_character_drawn_last() {
        let mut w = world(Difficulty::Normal);
        w.start();
        let drawables = w.drawables();
        assert_eq!(drawables.len(), w.enemies.len() + 1);
        assert_eq!(drawables.last().map(|d| d.id), Some(w.character.body.id));
        assert_eq!(drawables.last().map(|d| d.kind), Some(crate::sim::EntityKind::Player));
        for (d, e) in drawables.iter().zip(&w.enemies) {
            assert_eq!(d.kind, e.kind.entity_kind());
        }
    }

    proptest! {
        #[test]
        fn prop_edible_fraction_after_populate(seed in any::<u64>(), score in 2000u32..120_000) {
            let mut w = World::new(WorldConfig { seed, ..WorldConfig::default() });
            w.score = score;
            w.character.apply_score(score);
            w.running = true;
            let char_eq = score_from_height(w.character.body.size.y).min(score);
            // Spread the calls over windows so the rate limiter admits each batch
            for i in 0..6 {
                w.now_ms = i as f64 * SPAWN_WINDOW_MS;
                w.populate_enemies(Some(3));
                let living: Vec<_> = w.enemies.iter().filter(|e| !e.is_boss() && !e.is_dead()).collect();
                let edible = living.iter().filter(|e| e.score <= char_eq).count();
                let needed = (w.preset.min_edible_fraction as f64 * living.len() as f64 - 1e-9).ceil() as usize;
                prop_assert!(edible >= needed, "{} edible of {}", edible, living.len());
            }
        }

        #[test]
        fn prop_score_never_exceeds_cap(seed in any::<u64>()) {
            let mut w = World::new(WorldConfig { seed, ..WorldConfig::default() });
            w.start();
            let input = TickInput { right: true, ..TickInput::default() };
            for _ in 0..300 {
                w.update(16.0, &input);
                prop_assert!(w.score <= w.config.difficulty.score_cap());
            }
        }
    }
}
