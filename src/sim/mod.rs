//! Deterministic simulation module
//!
//! All simulation logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `advance()` per host frame)
//! - Seeded RNG only
//! - Stable iteration order (substances by spawn, pieces by creation)
//! - No rendering or platform dependencies

pub mod collision;
pub mod piece;
pub mod state;
pub mod substance;
pub mod tick;

pub use collision::{Body, Bounds, Circle, circles_overlap, distance, reflect_at_edges};
pub use piece::{Piece, PieceId, SubstanceId, random_velocity};
pub use state::{EntityIds, RenderPiece, SimEvent, Simulation, SpawnRequest};
pub use substance::{LifecycleTicks, Phase, Substance, TickCtx};
