//! Shared entity data and the capability interface every creature implements
//!
//! Character, enemies and bubbles are distinct structs that each embed a
//! [`Body`]. The world talks to them through the [`Entity`] trait for the
//! operations they have in common.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{HitBox, Rect};
use crate::consts::HITBOX_SHRINK;

/// Tag naming what an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Puffer,
    Jelly,
    Boss,
    Bubble,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Puffer => "puffer",
            EntityKind::Jelly => "jelly",
            EntityKind::Boss => "boss",
            EntityKind::Bubble => "bubble",
        }
    }

    /// Opaque region of the sprite as a fraction of the entity box
    ///
    /// Sprites carry transparent padding; hit circles are fitted to this
    /// region rather than the full box.
    pub fn default_trim(&self) -> Rect {
        let (min, size) = match self {
            EntityKind::Player => (Vec2::new(0.1, 0.35), Vec2::new(0.8, 0.45)),
            EntityKind::Puffer => (Vec2::new(0.05, 0.1), Vec2::new(0.9, 0.8)),
            EntityKind::Jelly => (Vec2::new(0.1, 0.05), Vec2::new(0.8, 0.9)),
            EntityKind::Boss => (Vec2::new(0.05, 0.3), Vec2::new(0.9, 0.55)),
            EntityKind::Bubble => (Vec2::ZERO, Vec2::ONE),
        };
        Rect::new(min, size)
    }
}

/// Position, size and motion state common to every entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    /// Top-left corner in canvas pixels
    pub pos: Vec2,
    pub size: Vec2,
    /// Direction of travel; units depend on the owner
    pub vel: Vec2,
    pub dead: bool,
    /// Sprite mirrored horizontally (facing left)
    pub flip_x: bool,
    /// Opaque sprite region as a fraction of `size`; `None` uses the full box
    pub trim: Option<Rect>,
}

impl Body {
    pub fn new(id: u32, pos: Vec2, size: Vec2, trim: Option<Rect>) -> Self {
        Self {
            id,
            pos,
            size,
            vel: Vec2::ZERO,
            dead: false,
            flip_x: false,
            trim,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Resize around the current center
    pub fn resize_centered(&mut self, size: Vec2) {
        let center = self.center();
        self.size = size;
        self.pos = center - size * 0.5;
    }

    pub fn hit_box(&self) -> HitBox {
        match self.trim {
            Some(trim) => {
                let bounds = Rect::new(self.pos + trim.min * self.size, trim.size * self.size);
                HitBox::fitted_circle(bounds, HITBOX_SHRINK)
            }
            None => HitBox::Rect(self.rect()),
        }
    }

    /// Facing direction along x: -1 when flipped, +1 otherwise
    pub fn facing(&self) -> f32 {
        if self.flip_x { -1.0 } else { 1.0 }
    }
}

/// Per-tick context handed to entities instead of a global world reference
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    /// Normalized movement input for the player
    pub input_dir: Vec2,
    /// Canvas size in pixels
    pub canvas: Vec2,
    /// Player center, for pursuing enemies
    pub player_center: Vec2,
    /// Player base speed in px/s; enemy speeds are a fraction of it
    pub base_speed: f32,
}

/// Operations every simulated entity supports
pub trait Entity {
    fn body(&self) -> &Body;

    fn kind(&self) -> EntityKind;

    /// Advance by `dt_ms` milliseconds
    fn update(&mut self, ctx: &TickContext, rng: &mut Pcg32, dt_ms: f32);

    /// Apply damage; what "damage" means is up to the entity
    fn take_damage(&mut self, amount: f32, now_ms: f64);

    fn hit_box(&self) -> HitBox {
        self.body().hit_box()
    }

    fn is_dead(&self) -> bool {
        self.body().dead
    }

    /// Render-facing snapshot
    fn drawable(&self) -> Drawable;
}

/// Frame timing for one animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimClip {
    pub frames: u32,
    pub frame_ms: f32,
    pub looping: bool,
}

impl AnimClip {
    pub const fn looping(frames: u32, frame_ms: f32) -> Self {
        Self {
            frames,
            frame_ms,
            looping: true,
        }
    }

    pub const fn once(frames: u32, frame_ms: f32) -> Self {
        Self {
            frames,
            frame_ms,
            looping: false,
        }
    }

    pub fn duration_ms(&self) -> f32 {
        self.frames as f32 * self.frame_ms
    }

    /// Frame to show after `elapsed_ms` in this clip
    pub fn frame_at(&self, elapsed_ms: f32) -> u32 {
        let index = (elapsed_ms.max(0.0) / self.frame_ms) as u32;
        if self.looping {
            index % self.frames.max(1)
        } else {
            index.min(self.frames.saturating_sub(1))
        }
    }
}

/// Character animation states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimState {
    Idle,
    LongIdle,
    Swim,
    Attack,
    BubbleThrow,
    Hit,
}

impl AnimState {
    pub fn clip(&self) -> AnimClip {
        match self {
            AnimState::Idle => AnimClip::looping(18, 120.0),
            AnimState::LongIdle => AnimClip::once(14, 180.0),
            AnimState::Swim => AnimClip::looping(7, 80.0),
            AnimState::Attack => AnimClip::once(8, 60.0),
            AnimState::BubbleThrow => AnimClip::once(1, 80.0),
            AnimState::Hit => AnimClip::once(4, 75.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimState::Idle => "idle",
            AnimState::LongIdle => "long_idle",
            AnimState::Swim => "swim",
            AnimState::Attack => "attack",
            AnimState::BubbleThrow => "attack_bubble",
            AnimState::Hit => "hit",
        }
    }
}

/// Duration-driven animation state machine
///
/// One-shot states hold until their clip has played out; the owner picks the
/// next state once [`Animator::is_busy`] turns false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animator {
    pub state: AnimState,
    pub elapsed_ms: f32,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            state: AnimState::Idle,
            elapsed_ms: 0.0,
        }
    }
}

impl Animator {
    pub fn advance(&mut self, dt_ms: f32) {
        self.elapsed_ms += dt_ms;
    }

    /// Switch to a looping state (no restart if already in it)
    pub fn set(&mut self, state: AnimState) {
        if self.state != state {
            self.state = state;
            self.elapsed_ms = 0.0;
        }
    }

    /// Start a state from its first frame
    pub fn play_once(&mut self, state: AnimState) {
        self.state = state;
        self.elapsed_ms = 0.0;
    }

    /// A one-shot clip is still playing
    pub fn is_busy(&self) -> bool {
        let clip = self.state.clip();
        !clip.looping && self.elapsed_ms < clip.duration_ms()
    }

    pub fn frame(&self) -> u32 {
        self.state.clip().frame_at(self.elapsed_ms)
    }
}

/// What a renderer needs to draw one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drawable {
    pub id: u32,
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Animation name (sprite set)
    pub anim: &'static str,
    pub frame: u32,
    pub flip_x: bool,
    /// Remaining health in [0, 1], for bars
    pub health_fraction: Option<f32>,
}
