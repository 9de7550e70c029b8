//! Spore Zone - click to spawn a substance, watch it split, roam and reabsorb
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pieces, substances, collisions, lifecycle)
//! - `settings`: Session and per-substance configuration
//! - `error`: Construction-time validation errors
//!
//! Rendering, input binding and frame scheduling live outside this crate.
//! A host calls [`sim::Simulation::advance`] once per frame and reads
//! [`sim::Simulation::pieces`] afterwards.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::{SimConfig, SubstanceParams};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Simulation defaults
pub mod consts {
    /// Default surface extent
    pub const SURFACE_WIDTH: f32 = 1280.0;
    pub const SURFACE_HEIGHT: f32 = 720.0;

    /// One tick per 60 Hz frame
    pub const TICK_MS: f32 = 1000.0 / 60.0;
    pub const DEFAULT_SEED: u64 = 0x5EED_5709E;

    /// Piece size range (diameter)
    pub const MIN_SIZE: f32 = 40.0;
    pub const MAX_SIZE: f32 = 200.0;
    /// Pieces produced by each split
    pub const PIECE_BUDGET: u32 = 10;

    /// Per-axis speed band, units per tick
    pub const MIN_SPEED: f32 = 3.0;
    pub const MAX_SPEED: f32 = 8.0;

    /// Collision grace period after a split
    pub const SETTLE_DELAY_MS: f32 = 1000.0;
    /// Hold at max size before shrinking
    pub const COLLAPSE_DELAY_MS: f32 = 300.0;
    pub const COLLAPSE_DURATION_MS: f32 = 300.0;

    /// Undrained events kept by a simulation; older ones are dropped first
    pub const MAX_PENDING_EVENTS: usize = 1024;
}

/// Colour handed to each new substance, in spawn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SporeColor {
    Red,
    Cyan,
    Yellow,
    Green,
    Blue,
    Black,
}

impl SporeColor {
    pub const PALETTE: [SporeColor; 6] = [
        SporeColor::Red,
        SporeColor::Cyan,
        SporeColor::Yellow,
        SporeColor::Green,
        SporeColor::Blue,
        SporeColor::Black,
    ];

    /// Palette entry for the n-th substance (wraps around)
    pub fn for_index(n: usize) -> Self {
        Self::PALETTE[n % Self::PALETTE.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SporeColor::Red => "red",
            SporeColor::Cyan => "cyan",
            SporeColor::Yellow => "yellow",
            SporeColor::Green => "green",
            SporeColor::Blue => "blue",
            SporeColor::Black => "black",
        }
    }
}

/// Clamp a point onto `[0, width] x [0, height]`. NaN maps to 0.
#[inline]
pub fn clamp_to_surface(pos: Vec2, width: f32, height: f32) -> Vec2 {
    let clamp = |v: f32, max: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, max) };
    Vec2::new(clamp(pos.x, width), clamp(pos.y, height))
}
