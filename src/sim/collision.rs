//! Collision detection and boundary reflection for circular pieces
//!
//! Everything here is pure geometry over finite floats. The absorption rules
//! that act on an overlap live in `substance`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Anything with a center and a diameter
pub trait Body {
    fn center(&self) -> Vec2;
    fn size(&self) -> f32;

    #[inline]
    fn radius(&self) -> f32 {
        self.size() / 2.0
    }
}

/// Bare circle, handy for queries that have no piece behind them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub size: f32,
}

impl Circle {
    pub fn new(center: Vec2, size: f32) -> Self {
        Self { center, size }
    }
}

impl Body for Circle {
    fn center(&self) -> Vec2 {
        self.center
    }

    fn size(&self) -> f32 {
        self.size
    }
}

/// Rectangular surface `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True if the whole circle lies inside the surface
    pub fn contains<B: Body + ?Sized>(&self, body: &B) -> bool {
        let c = body.center();
        let r = body.radius();
        c.x - r >= 0.0 && c.y - r >= 0.0 && c.x + r <= self.width && c.y + r <= self.height
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Strict overlap: radii sum greater than center distance. Touching is not overlap.
#[inline]
pub fn circles_overlap<A: Body + ?Sized, B: Body + ?Sized>(a: &A, b: &B) -> bool {
    a.radius() + b.radius() > distance(a.center(), b.center())
}

/// Flip velocity components that point out through an edge the circle already touches.
///
/// Each axis is checked on its own; inward-moving components are left alone so a
/// piece that started outside can drift back in.
pub fn reflect_at_edges(center: Vec2, size: f32, vel: Vec2, bounds: &Bounds) -> Vec2 {
    let r = size / 2.0;
    let mut vel = vel;

    if center.x - r <= 0.0 && vel.x < 0.0 {
        vel.x = -vel.x;
    }
    if center.x + r >= bounds.width && vel.x > 0.0 {
        vel.x = -vel.x;
    }

    if center.y - r <= 0.0 && vel.y < 0.0 {
        vel.y = -vel.y;
    }
    if center.y + r >= bounds.height && vel.y > 0.0 {
        vel.y = -vel.y;
    }

    vel
}
