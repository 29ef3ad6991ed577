//! The player-controlled shark

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bubble::Bubble;
use super::collision::{HitBox, Rect, hit_boxes_overlap};
use super::enemy::Enemy;
use super::entity::{AnimState, Animator, Body, Drawable, Entity, EntityKind, TickContext};
use super::sizing::size_from_score;
use crate::consts::*;
use crate::round_u32;

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub body: Body,
    pub health: f32,
    pub max_health: f32,
    /// Shared cooldown for melee and bubbles (ms remaining)
    pub attack_cooldown_ms: f32,
    /// Session time of the last damage taken
    last_hit_ms: Option<f64>,
    /// Cosmetic size multiplier after eating
    pub visual_scale: f32,
    pub visual_timer_ms: f32,
    pub anim: Animator,
}

impl Character {
    /// Create a character centered on the canvas, sized for `score`
    pub fn new(id: u32, canvas: Vec2, score: u32) -> Self {
        let size = size_from_score(score);
        let pos = ((canvas - size) * 0.5).round();
        Self {
            body: Body::new(id, pos, size, Some(EntityKind::Player.default_trim())),
            health: CHARACTER_MAX_HEALTH,
            max_health: CHARACTER_MAX_HEALTH,
            attack_cooldown_ms: 0.0,
            last_hit_ms: None,
            visual_scale: 1.0,
            visual_timer_ms: 0.0,
            anim: Animator::default(),
        }
    }

    /// Resize to match the world score
    pub fn apply_score(&mut self, score: u32) {
        let size = size_from_score(score);
        if size != self.body.size {
            self.body.resize_centered(size);
        }
    }

    /// Brief cosmetic growth after eating
    pub fn pulse(&mut self) {
        self.visual_scale = EAT_PULSE_SCALE;
        self.visual_timer_ms = EAT_PULSE_MS;
    }

    pub fn can_attack(&self) -> bool {
        self.attack_cooldown_ms <= 0.0
    }

    /// Area in front of the character reached by a fin slap
    pub fn fin_slap_area(&self) -> Rect {
        let b = &self.body;
        let x = if b.flip_x {
            b.pos.x - FIN_SLAP_RANGE
        } else {
            b.pos.x + b.size.x
        };
        Rect::new(Vec2::new(x, b.pos.y), Vec2::new(FIN_SLAP_RANGE, b.size.y))
    }

    /// Melee attack against every enemy in reach
    ///
    /// Returns false without effect while the attack cooldown is running.
    pub fn fin_slap(&mut self, enemies: &mut [Enemy], now_ms: f64) -> bool {
        if !self.can_attack() {
            return false;
        }
        self.attack_cooldown_ms = FIN_SLAP_COOLDOWN_MS;
        self.anim.play_once(AnimState::Attack);

        let area = HitBox::Rect(self.fin_slap_area());
        for enemy in enemies.iter_mut().filter(|e| !e.is_dead()) {
            if hit_boxes_overlap(&area, &enemy.hit_box()) {
                enemy.take_damage(FIN_SLAP_DAMAGE, now_ms);
            }
        }
        true
    }

    /// Fire a bubble in the facing direction, paying for it with score
    ///
    /// Returns `None` while the attack cooldown is running.
    pub fn shoot_bubble(&mut self, score: &mut u32, bubble_id: u32, now_ms: f64) -> Option<Bubble> {
        if !self.can_attack() {
            return None;
        }
        self.attack_cooldown_ms = BUBBLE_COOLDOWN_MS;

        let cost = round_u32(*score as f64 * BUBBLE_COST_FRACTION).max(1);
        *score = score.saturating_sub(cost);

        let dir = self.body.facing();
        let center = self.body.center();
        let spawn = Vec2::new(center.x + dir * (self.body.size.x / 2.0 + 4.0), center.y);
        self.anim.play_once(AnimState::BubbleThrow);
        Some(Bubble::new(bubble_id, spawn, dir, now_ms))
    }

    /// Blend velocity toward the input direction
    ///
    /// Speeding up follows the accel time constant, slowing down the (longer)
    /// decel one.
    fn steer(&mut self, target: Vec2, dt_ms: f32) {
        let vel = self.body.vel;
        let target_mag = target.length();
        let cur_mag = vel.length();
        self.body.vel = if target_mag > cur_mag + 1e-3 {
            vel + (target - vel) * (dt_ms / CHARACTER_ACCEL_MS).min(1.0)
        } else if target_mag < cur_mag - 1e-3 {
            vel + (target - vel) * (dt_ms / CHARACTER_DECEL_MS).min(1.0)
        } else {
            target
        };
    }

    fn pick_animation(&mut self, rng: &mut Pcg32) {
        if self.anim.is_busy() {
            return;
        }
        if self.body.vel.length() > SWIM_THRESHOLD {
            self.anim.set(AnimState::Swim);
        } else if rng.random_bool(LONG_IDLE_CHANCE) {
            self.anim.play_once(AnimState::LongIdle);
        } else {
            self.anim.set(AnimState::Idle);
        }
    }
}

impl Entity for Character {
    fn body(&self) -> &Body {
        &self.body
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn update(&mut self, ctx: &TickContext, rng: &mut Pcg32, dt_ms: f32) {
        if self.attack_cooldown_ms > 0.0 {
            self.attack_cooldown_ms = (self.attack_cooldown_ms - dt_ms).max(0.0);
        }
        if self.visual_timer_ms > 0.0 {
            self.visual_timer_ms = (self.visual_timer_ms - dt_ms).max(0.0);
            if self.visual_timer_ms == 0.0 {
                self.visual_scale = 1.0;
            }
        }

        self.steer(ctx.input_dir, dt_ms);
        self.body.pos += self.body.vel * ctx.base_speed * (dt_ms / 1000.0);

        if self.body.vel.x < 0.0 {
            self.body.flip_x = true;
        } else if self.body.vel.x > 0.0 {
            self.body.flip_x = false;
        }

        // Up to half the sprite may leave the canvas
        let half = self.body.size * 0.5;
        self.body.pos = self.body.pos.clamp(-half, ctx.canvas - half);

        self.anim.advance(dt_ms);
        self.pick_animation(rng);
    }

    fn take_damage(&mut self, amount: f32, now_ms: f64) {
        if let Some(last) = self.last_hit_ms {
            if now_ms - last < CHARACTER_INVULN_MS {
                return;
            }
        }
        self.last_hit_ms = Some(now_ms);
        self.health = (self.health - amount).max(0.0);
        self.anim.play_once(AnimState::Hit);
        log::debug!("Character took {} damage, health {}", amount, self.health);
    }

    fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    fn drawable(&self) -> Drawable {
        let size = self.body.size * self.visual_scale;
        let pos = self.body.center() - size * 0.5;
        Drawable {
            id: self.body.id,
            kind: self.kind(),
            x: pos.x,
            y: pos.y,
            width: size.x,
            height: size.y,
            anim: self.anim.state.as_str(),
            frame: self.anim.frame(),
            flip_x: self.body.flip_x,
            health_fraction: Some(self.health / self.max_health),
        }
    }
}
