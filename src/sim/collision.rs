//! Hit-box intersection tests
//!
//! Creatures are matched against each other with circles fitted to the
//! opaque part of their sprite. Anything without trim data falls back to its
//! axis-aligned box, so every pair of hit boxes has a defined overlap test.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, screen coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict overlap (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        rect_rect_collision(self, other)
    }
}

/// Collision shape of an entity for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitBox {
    Circle { center: Vec2, radius: f32 },
    Rect(Rect),
}

impl HitBox {
    /// Circle inscribed in the trimmed sprite bounds, shrunk by `shrink`
    pub fn fitted_circle(bounds: Rect, shrink: f32) -> Self {
        HitBox::Circle {
            center: bounds.center(),
            radius: bounds.size.min_element() * 0.5 * shrink,
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            HitBox::Circle { center, .. } => *center,
            HitBox::Rect(rect) => rect.center(),
        }
    }
}

/// Circle vs circle; touching counts as overlap
#[inline]
pub fn circle_circle_collision(a_center: Vec2, a_radius: f32, b_center: Vec2, b_radius: f32) -> bool {
    let r_sum = a_radius + b_radius;
    a_center.distance_squared(b_center) <= r_sum * r_sum
}

/// Circle vs axis-aligned rectangle via the closest point on the rectangle
pub fn circle_rect_collision(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = center.clamp(rect.min, rect.max());
    center.distance_squared(closest) <= radius * radius
}

/// Rectangle vs rectangle (strict)
#[inline]
pub fn rect_rect_collision(a: &Rect, b: &Rect) -> bool {
    let a_max = a.max();
    let b_max = b.max();
    a.min.x < b_max.x && a_max.x > b.min.x && a.min.y < b_max.y && a_max.y > b.min.y
}

/// Overlap test for any pair of hit boxes
pub fn hit_boxes_overlap(a: &HitBox, b: &HitBox) -> bool {
    match (a, b) {
        (
            HitBox::Circle {
                center: ac,
                radius: ar,
            },
            HitBox::Circle {
                center: bc,
                radius: br,
            },
        ) => circle_circle_collision(*ac, *ar, *bc, *br),
        (HitBox::Circle { center, radius }, HitBox::Rect(rect))
        | (HitBox::Rect(rect), HitBox::Circle { center, radius }) => {
            circle_rect_collision(*center, *radius, rect)
        }
        (HitBox::Rect(a), HitBox::Rect(b)) => rect_rect_collision(a, b),
    }
}
