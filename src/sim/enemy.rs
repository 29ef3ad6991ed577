//! Enemy creatures: puffer fish, jelly fish and the boss

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{AnimClip, Body, Drawable, Entity, EntityKind, TickContext};
use super::sizing::size_from_score;
use crate::consts::*;

/// Enemy species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Puffer,
    Jelly,
    /// Takes discrete hits instead of health damage
    Boss { hit_count: u32, max_health: u32 },
}

impl EnemyKind {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            EnemyKind::Puffer => EntityKind::Puffer,
            EnemyKind::Jelly => EntityKind::Jelly,
            EnemyKind::Boss { .. } => EntityKind::Boss,
        }
    }

    fn clip(&self) -> AnimClip {
        match self {
            EnemyKind::Puffer => AnimClip::looping(5, 120.0),
            EnemyKind::Jelly => AnimClip::looping(4, 140.0),
            EnemyKind::Boss { .. } => AnimClip::looping(13, 140.0),
        }
    }
}

/// How an enemy moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Straight left (-1) or right (+1) until it leaves the canvas
    Drift { dir: f32 },
    /// Random heading changes with occasional stops
    Wander {
        timer_ms: f32,
        interval_ms: f32,
        /// Remaining stop time while stopped
        stop_ms: Option<f32>,
    },
    /// Chase the player at a fixed speed (px/s)
    Seek { speed: f32 },
}

impl Motion {
    pub fn drift(dir: f32) -> Self {
        Motion::Drift { dir: dir.signum() }
    }

    pub fn wander(rng: &mut Pcg32) -> Self {
        Motion::Wander {
            timer_ms: 0.0,
            interval_ms: rng.random_range(WANDER_MIN_INTERVAL_MS..WANDER_MAX_INTERVAL_MS),
            stop_ms: None,
        }
    }
}

/// A hostile (or edible) creature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub kind: EnemyKind,
    /// Intrinsic value; decides size and whether the player can eat it
    pub score: u32,
    /// Fraction of the player's base speed, in [0.05, 1.0]
    pub speed_factor: f32,
    pub health: f32,
    pub motion: Motion,
    anim_ms: f32,
}

impl Enemy {
    /// A regular fish sized by its score
    pub fn fish(id: u32, kind: EnemyKind, score: u32, speed_factor: f32, pos: Vec2, motion: Motion) -> Self {
        let entity_kind = kind.entity_kind();
        let mut body = Body::new(id, pos, size_from_score(score), Some(entity_kind.default_trim()));
        if let Motion::Drift { dir } = motion {
            body.vel = Vec2::new(dir, 0.0);
            body.flip_x = dir < 0.0;
        }
        Self {
            body,
            kind,
            score,
            speed_factor: speed_factor.clamp(SPEED_FACTOR_MIN, SPEED_FACTOR_MAX),
            health: ENEMY_HEALTH,
            motion,
            anim_ms: 0.0,
        }
    }

    /// The boss, placed just off the right edge at vertical center
    pub fn boss(id: u32, canvas: Vec2, speed_multiplier: f32) -> Self {
        let size = Vec2::new(BOSS_WIDTH, BOSS_HEIGHT);
        let pos = Vec2::new(
            canvas.x + BOSS_SPAWN_OFFSET,
            ((canvas.y - size.y) / 2.0).max(0.0),
        );
        let mut body = Body::new(id, pos, size, Some(EntityKind::Boss.default_trim()));
        body.flip_x = true;
        Self {
            body,
            kind: EnemyKind::Boss {
                hit_count: 0,
                max_health: BOSS_REQUIRED_HITS,
            },
            score: 0,
            speed_factor: SPEED_FACTOR_MAX,
            health: BOSS_REQUIRED_HITS as f32,
            motion: Motion::Seek {
                speed: BOSS_BASE_SPEED * speed_multiplier,
            },
            anim_ms: 0.0,
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss { .. })
    }

    /// Resize from score; the boss keeps its fixed size
    pub fn apply_size_from_score(&mut self) {
        if self.is_boss() {
            return;
        }
        let size = size_from_score(self.score);
        if size != self.body.size {
            self.body.resize_centered(size);
        }
    }

    /// Movement speed in px/s
    pub fn speed(&self, base_speed: f32) -> f32 {
        match self.motion {
            Motion::Seek { speed } => speed,
            _ => base_speed * self.speed_factor.min(1.0),
        }
    }

    /// Drifting fish that have swum past the far edge
    pub fn is_offscreen(&self, canvas: Vec2) -> bool {
        match self.motion {
            Motion::Drift { dir } if dir < 0.0 => {
                self.body.pos.x + self.body.size.x < -ENEMY_OFFSCREEN_MARGIN
            }
            Motion::Drift { .. } => self.body.pos.x > canvas.x + ENEMY_OFFSCREEN_MARGIN,
            _ => false,
        }
    }

    /// Boss hits landed so far
    pub fn hit_count(&self) -> Option<u32> {
        match self.kind {
            EnemyKind::Boss { hit_count, .. } => Some(hit_count),
            _ => None,
        }
    }

    fn wander(&mut self, rng: &mut Pcg32, dt_ms: f32) -> bool {
        let Motion::Wander {
            timer_ms,
            interval_ms,
            stop_ms,
        } = &mut self.motion
        else {
            return true;
        };

        if let Some(remaining) = stop_ms {
            *remaining -= dt_ms;
            if *remaining > 0.0 {
                return false;
            }
            *stop_ms = None;
            *timer_ms = 0.0;
        }

        *timer_ms += dt_ms;
        if *timer_ms >= *interval_ms {
            *timer_ms = 0.0;
            *interval_ms = rng.random_range(WANDER_MIN_INTERVAL_MS..WANDER_MAX_INTERVAL_MS);
            if rng.random_bool(WANDER_STOP_CHANCE) {
                *stop_ms = Some(rng.random_range(WANDER_MIN_STOP_MS..WANDER_MAX_STOP_MS));
                self.body.vel = Vec2::ZERO;
                return false;
            }
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            self.body.vel = Vec2::new(angle.cos(), angle.sin());
        }
        true
    }
}

impl Entity for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn kind(&self) -> EntityKind {
        self.kind.entity_kind()
    }

    fn update(&mut self, ctx: &TickContext, rng: &mut Pcg32, dt_ms: f32) {
        if self.body.dead {
            return;
        }
        self.anim_ms += dt_ms;
        let step = self.speed(ctx.base_speed) * (dt_ms / 1000.0);

        match self.motion {
            Motion::Drift { .. } => {
                self.body.pos += self.body.vel * step;
            }
            Motion::Wander { .. } => {
                if self.wander(rng, dt_ms) {
                    self.body.pos += self.body.vel * step;
                    if self.body.vel.x != 0.0 {
                        self.body.flip_x = self.body.vel.x < 0.0;
                    }
                    let half = self.body.size * 0.5;
                    self.body.pos = self.body.pos.clamp(-half, ctx.canvas - half);
                }
            }
            Motion::Seek { .. } => {
                let dir = (ctx.player_center - self.body.center()).normalize_or_zero();
                self.body.vel = dir;
                self.body.pos += dir * step;
                if dir.x != 0.0 {
                    self.body.flip_x = dir.x < 0.0;
                }
            }
        }
    }

    fn take_damage(&mut self, amount: f32, _now_ms: f64) {
        if self.body.dead || amount <= 0.0 {
            return;
        }
        match &mut self.kind {
            EnemyKind::Boss {
                hit_count,
                max_health,
            } => {
                // One hit per call, whatever the damage
                *hit_count += 1;
                self.health = max_health.saturating_sub(*hit_count) as f32;
                if *hit_count >= *max_health {
                    self.body.dead = true;
                }
            }
            _ => {
                self.health -= amount;
                if self.health <= 0.0 {
                    self.body.dead = true;
                }
            }
        }
    }

    fn drawable(&self) -> Drawable {
        let (anim, health_fraction) = match self.kind {
            EnemyKind::Boss { max_health, .. } => (
                "floating",
                Some((self.health / max_health.max(1) as f32).clamp(0.0, 1.0)),
            ),
            _ => ("swim", None),
        };
        Drawable {
            id: self.body.id,
            kind: self.kind(),
            x: self.body.pos.x,
            y: self.body.pos.y,
            width: self.body.size.x,
            height: self.body.size.y,
            anim,
            frame: self.kind.clip().frame_at(self.anim_ms),
            flip_x: self.body.flip_x,
            health_fraction,
        }
    }
}
