//! A single moving circular piece

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Body, Bounds, reflect_at_edges};

/// Stable piece identity, unique across the whole simulation
pub type PieceId = u32;
/// Stable substance identity
pub type SubstanceId = u32;

/// A piece entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    /// Owning substance (lookup key, not a handle)
    pub owner: SubstanceId,
    pub pos: Vec2,
    /// Diameter
    pub size: f32,
    /// Displacement per tick
    pub vel: Vec2,
}

impl Piece {
    pub fn new(id: PieceId, owner: SubstanceId, pos: Vec2, size: f32, vel: Vec2) -> Self {
        Self {
            id,
            owner,
            pos,
            size,
            vel,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    /// Reflect velocity off any edge the piece is pushing through
    pub fn check_edge(&mut self, bounds: &Bounds) {
        self.vel = reflect_at_edges(self.pos, self.size, self.vel, bounds);
    }

    #[inline]
    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    /// Edge check followed by integration. Collision is the owner's job.
    pub fn step(&mut self, bounds: &Bounds) {
        self.check_edge(bounds);
        self.integrate();
    }
}

impl Body for Piece {
    fn center(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> f32 {
        self.size
    }
}

/// Per-axis speed drawn from `[min_speed, max_speed]`, each axis with an independent random sign
pub fn random_velocity<R: Rng + ?Sized>(rng: &mut R, min_speed: f32, max_speed: f32) -> Vec2 {
    let mut axis = || {
        let speed = rng.random_range(min_speed..=max_speed);
        if rng.random_bool(0.5) { speed } else { -speed }
    };
    let x = axis();
    let y = axis();
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_step_moves_by_velocity() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut piece = Piece::new(1, 1, Vec2::new(400.0, 300.0), 40.0, Vec2::new(3.0, -5.0));
        piece.step(&bounds);
        assert_eq!(piece.pos, Vec2::new(403.0, 295.0));
    }

    #[test]
    fn test_step_bounces_off_wall() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut piece = Piece::new(1, 1, Vec2::new(21.0, 300.0), 40.0, Vec2::new(-4.0, 0.0));
        piece.step(&bounds);
        // Not yet touching: keeps going left
        assert_eq!(piece.pos.x, 17.0);
        piece.step(&bounds);
        // Now touching the left edge: reflected before moving
        assert_eq!(piece.vel.x, 4.0);
        assert_eq!(piece.pos.x, 21.0);
    }

    #[test]
    fn test_random_velocity_in_band() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen_neg_x = false;
        let mut seen_pos_x = false;
        for _ in 0..200 {
            let v = random_velocity(&mut rng, 3.0, 8.0);
            assert!((3.0..=8.0).contains(&v.x.abs()));
            assert!((3.0..=8.0).contains(&v.y.abs()));
            seen_neg_x |= v.x < 0.0;
            seen_pos_x |= v.x > 0.0;
        }
        assert!(seen_neg_x && seen_pos_x);
    }

    #[test]
    fn test_radius_is_half_size() {
        let piece = Piece::new(1, 1, Vec2::ZERO, 60.0, Vec2::ZERO);
        assert_eq!(piece.radius(), 30.0);
        assert_eq!(Body::radius(&piece), 30.0);
    }
}
