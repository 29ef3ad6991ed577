//! Bubble projectile

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Drawable, Entity, EntityKind, TickContext};
use crate::consts::*;

/// A short-lived projectile fired by the character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    pub body: Body,
    /// Session time the bubble was created (ms)
    pub born_ms: f64,
    pub lifetime_ms: f64,
    pub damage: f32,
}

impl Bubble {
    /// Create a bubble centered on `center`, travelling in `dir` (-1 left, +1 right)
    pub fn new(id: u32, center: Vec2, dir: f32, now_ms: f64) -> Self {
        let size = Vec2::splat(BUBBLE_SIZE);
        let mut body = Body::new(
            id,
            center - size * 0.5,
            size,
            Some(EntityKind::Bubble.default_trim()),
        );
        body.vel = Vec2::new(dir.signum() * BUBBLE_SPEED_X, BUBBLE_SPEED_Y);
        body.flip_x = dir < 0.0;
        Self {
            body,
            born_ms: now_ms,
            lifetime_ms: BUBBLE_LIFETIME_MS,
            damage: BUBBLE_DAMAGE,
        }
    }

    /// Expired once its lifetime has passed or it hit something
    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.body.dead || now_ms - self.born_ms >= self.lifetime_ms
    }

    /// Mark as spent after a hit
    pub fn pop(&mut self) {
        self.body.dead = true;
    }
}

impl Entity for Bubble {
    fn body(&self) -> &Body {
        &self.body
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Bubble
    }

    fn update(&mut self, _ctx: &TickContext, _rng: &mut Pcg32, dt_ms: f32) {
        self.body.pos += self.body.vel * (dt_ms / 1000.0);
    }

    /// Any hit pops a bubble
    fn take_damage(&mut self, amount: f32, _now_ms: f64) {
        if amount > 0.0 {
            self.pop();
        }
    }

    fn drawable(&self) -> Drawable {
        Drawable {
            id: self.body.id,
            kind: self.kind(),
            x: self.body.pos.x,
            y: self.body.pos.y,
            width: self.body.size.x,
            height: self.body.size.y,
            anim: "bubble",
            frame: 0,
            flip_x: self.body.flip_x,
            health_fraction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_bubble_moves_by_velocity() {
        let mut rng = Pcg32::seed_from_u64(0);
        let ctx = TickContext {
            input_dir: Vec2::ZERO,
            canvas: Vec2::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            player_center: Vec2::ZERO,
            base_speed: CHARACTER_BASE_SPEED,
        };
        let mut b = Bubble::new(1, Vec2::new(100.0, 100.0), 1.0, 0.0);
        b.update(&ctx, &mut rng, 500.0);
        assert_eq!(b.body.center(), Vec2::new(200.0, 80.0));
    }

    #[test]
    fn test_pop_expires_immediately() {
        let mut b = Bubble::new(1, Vec2::ZERO, -1.0, 1000.0);
        assert!(!b.is_expired(1000.0));
        b.take_damage(1.0, 1000.0);
        assert!(b.is_expired(1000.0));
    }

    proptest! {
        #[test]
        fn prop_lifetime_boundary(born in 0u32..1_000_000, age in 0u32..20_000) {
            let b = Bubble::new(1, Vec2::ZERO, 1.0, born as f64);
            let now = born as f64 + age as f64;
            prop_assert_eq!(b.is_expired(now), age as f64 >= BUBBLE_LIFETIME_MS);
        }
    }
}
