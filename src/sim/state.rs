//! Simulation state and the types the host reads back
//!
//! Everything that must be identical across two runs with the same seed and
//! the same spawn/tick sequence lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Bounds;
use super::piece::{PieceId, SubstanceId};
use super::substance::{LifecycleTicks, Substance};
use crate::SporeColor;
use crate::consts::MAX_PENDING_EVENTS;
use crate::error::SimResult;
use crate::settings::{SimConfig, SubstanceParams};

/// Monotonic id source. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Things that happened during a tick or spawn, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Spawned {
        substance: SubstanceId,
        position: Vec2,
        color: SporeColor,
    },
    /// Collapse finished and the substance now holds `pieces` pieces
    Split { substance: SubstanceId, pieces: u32 },
    /// Settle delay elapsed
    CollisionEnabled { substance: SubstanceId },
    Absorbed {
        substance: SubstanceId,
        absorber: PieceId,
        absorbed: PieceId,
        new_size: f32,
    },
    /// Down to one piece; a new collapse started at `anchor`
    Recollapsed { substance: SubstanceId, anchor: Vec2 },
}

/// What a renderer needs to draw one piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPiece {
    pub id: PieceId,
    pub owner: SubstanceId,
    pub position: Vec2,
    pub size: f32,
    pub color: SporeColor,
    /// Owner's collapse tween progress, 1.0 when not collapsing
    pub collapse_progress: f32,
}

/// A spawn with optional per-substance overrides
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnRequest {
    pub position: Vec2,
    /// `None` uses the simulation's configured parameters
    pub params: Option<SubstanceParams>,
}

impl SpawnRequest {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            params: None,
        }
    }

    pub fn with_params(mut self, params: SubstanceParams) -> Self {
        self.params = Some(params);
        self
    }
}

/// Owns every substance and the tick clock
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(super) config: SimConfig,
    pub(super) bounds: Bounds,
    pub(super) rng: Pcg32,
    pub(super) piece_ids: EntityIds,
    pub(super) substance_ids: EntityIds,
    /// Ticks advanced so far
    pub(super) time_ticks: u64,
    /// Spawn order
    pub(super) substances: Vec<Substance>,
    /// Oldest first, capped at `MAX_PENDING_EVENTS`
    pub(super) events: Vec<SimEvent>,
    /// Lifecycle timings for the configured default parameters
    pub(super) default_ticks: LifecycleTicks,
}

impl Simulation {
    /// Build an empty simulation. Surface extents are fixed from here on.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let default_ticks = LifecycleTicks::from_config(&config, &config.substance);
        log::info!(
            "Simulation ready: surface {}x{}, tick {:.2} ms, seed {}",
            config.surface_width,
            config.surface_height,
            config.tick_ms,
            config.seed
        );
        Ok(Self {
            bounds: Bounds::new(config.surface_width, config.surface_height),
            rng: Pcg32::seed_from_u64(config.seed),
            piece_ids: EntityIds::default(),
            substance_ids: EntityIds::default(),
            time_ticks: 0,
            substances: Vec::new(),
            events: Vec::new(),
            default_ticks,
            config,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Simulated time in milliseconds
    pub fn time_ms(&self) -> f64 {
        self.time_ticks as f64 * self.config.tick_ms as f64
    }

    pub fn substances(&self) -> &[Substance] {
        &self.substances
    }

    pub fn substance(&self, id: SubstanceId) -> Option<&Substance> {
        self.substances.iter().find(|s| s.id == id)
    }

    pub fn piece_count(&self) -> usize {
        self.substances.iter().map(Substance::len).sum()
    }

    /// Every live piece, substances in spawn order, pieces in creation order
    pub fn pieces(&self) -> impl Iterator<Item = RenderPiece> + '_ {
        let now = self.time_ticks;
        self.substances.iter().flat_map(move |s| {
            let progress = s.collapse_progress(now);
            s.pieces().iter().map(move |p| RenderPiece {
                id: p.id,
                owner: s.id,
                position: p.pos,
                size: p.size,
                color: s.color,
                collapse_progress: progress,
            })
        })
    }

    pub fn render_snapshot(&self) -> Vec<RenderPiece> {
        self.pieces().collect()
    }

    pub fn snapshot_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(&self.render_snapshot())?)
    }

    /// Take the events recorded since the last drain.
    ///
    /// Hosts that never drain lose the oldest events once more than
    /// [`MAX_PENDING_EVENTS`] are pending.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn trim_events(&mut self) {
        let excess = self.events.len().saturating_sub(MAX_PENDING_EVENTS);
        if excess > 0 {
            log::debug!("Dropping {} undrained events", excess);
            self.events.drain(..excess);
        }
    }
}
