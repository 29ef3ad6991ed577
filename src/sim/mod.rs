//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `World::update(dt)`
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod bubble;
pub mod character;
pub mod collision;
pub mod difficulty;
pub mod enemy;
pub mod entity;
pub mod sizing;
pub mod spawner;
pub mod world;

pub use bubble::Bubble;
pub use character::Character;
pub use collision::{HitBox, Rect, hit_boxes_overlap};
pub use difficulty::{Difficulty, DifficultyPreset};
pub use enemy::{Enemy, EnemyKind, Motion};
pub use entity::{AnimState, Animator, Body, Drawable, Entity, EntityKind, TickContext};
pub use sizing::{score_from_height, size_from_score};
pub use spawner::Spawner;
pub use world::{GameEvent, GamePhase, SessionSummary, TickInput, World, WorldConfig};
