//! Substances: a population of pieces sharing one lifecycle
//!
//! Lifecycle per substance:
//!
//! ```text
//! Collapsing --(deadline: split)--> Settling --(deadline)--> Roaming
//!     ^                                                        |
//!     +---------------- one piece left -----------------------+
//! ```
//!
//! The split itself is instantaneous. When the collapse deadline passes, the
//! sole piece drops to `min_size`, the batch is created at the anchor, and
//! pieces start moving on the following tick. Collision checks stay off until
//! the settle deadline so overlapping fresh pieces can disperse first.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Bounds, circles_overlap};
use super::piece::{Piece, PieceId, SubstanceId, random_velocity};
use super::state::{EntityIds, SimEvent};
use crate::SporeColor;
use crate::error::SimResult;
use crate::settings::{SimConfig, SubstanceParams};

/// Lifecycle state. Deadlines are absolute tick numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Frozen at max size, shrinking toward the split
    Collapsing { started_at: u64, ends_at: u64 },
    /// Moving, collisions suppressed
    Settling { ends_at: u64 },
    /// Moving and colliding
    Roaming,
}

/// Lifecycle delays converted to ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleTicks {
    pub collapse_delay: u64,
    pub collapse: u64,
    pub settle: u64,
}

impl LifecycleTicks {
    pub fn from_config(config: &SimConfig, params: &SubstanceParams) -> Self {
        Self {
            collapse_delay: config.ms_to_ticks(params.collapse_delay_ms),
            collapse: config.ms_to_ticks(params.collapse_duration_ms),
            settle: config.ms_to_ticks(params.settle_delay_ms),
        }
    }

    #[inline]
    pub fn collapse_total(&self) -> u64 {
        self.collapse_delay.saturating_add(self.collapse)
    }
}

/// Everything a substance needs from its simulation during one tick
pub struct TickCtx<'a, R: Rng + ?Sized> {
    pub now: u64,
    pub bounds: Bounds,
    pub rng: &'a mut R,
    pub ids: &'a mut EntityIds,
    pub events: &'a mut Vec<SimEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Substance {
    pub id: SubstanceId,
    pub color: SporeColor,
    pub params: SubstanceParams,
    /// Split origin. Only meaningful while a single piece remains.
    pub anchor: Vec2,
    pub phase: Phase,
    pub ticks: LifecycleTicks,
    /// Completed splits
    pub generation: u32,
    /// Creation order
    pieces: Vec<Piece>,
}

impl Substance {
    /// Create a substance with a single piece at `anchor` and start its collapse.
    ///
    /// Fails if `params` break the size, budget or speed constraints.
    pub fn new<R: Rng + ?Sized>(
        id: SubstanceId,
        color: SporeColor,
        anchor: Vec2,
        params: SubstanceParams,
        ticks: LifecycleTicks,
        ctx: &mut TickCtx<'_, R>,
    ) -> SimResult<Self> {
        params.validate()?;
        Ok(Self::build(id, color, anchor, params, ticks, ctx))
    }

    /// `new` without validation, for parameters already checked by the caller
    pub(super) fn build<R: Rng + ?Sized>(
        id: SubstanceId,
        color: SporeColor,
        anchor: Vec2,
        params: SubstanceParams,
        ticks: LifecycleTicks,
        ctx: &mut TickCtx<'_, R>,
    ) -> Self {
        let vel = random_velocity(&mut *ctx.rng, params.min_speed, params.max_speed);
        let seed = Piece::new(ctx.ids.next_id(), id, anchor, params.max_size, vel);

        let mut substance = Self {
            id,
            color,
            params,
            anchor,
            phase: Phase::Roaming,
            ticks,
            generation: 0,
            pieces: vec![seed],
        };
        substance.collapse_then_split(ctx.now);
        substance
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    #[inline]
    fn index_of(&self, id: PieceId) -> Option<usize> {
        self.pieces.iter().position(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[inline]
    pub fn movement_enabled(&self) -> bool {
        !matches!(self.phase, Phase::Collapsing { .. })
    }

    #[inline]
    pub fn collision_enabled(&self) -> bool {
        matches!(self.phase, Phase::Roaming)
    }

    /// Shrink progress in `[0, 1]` for a renderer tween. 1.0 outside of a collapse.
    pub fn collapse_progress(&self, now: u64) -> f32 {
        match self.phase {
            Phase::Collapsing { started_at, .. } => {
                let shrink_start = started_at.saturating_add(self.ticks.collapse_delay);
                if self.ticks.collapse == 0 {
                    return if now >= shrink_start { 1.0 } else { 0.0 };
                }
                let elapsed = now.saturating_sub(shrink_start) as f32;
                (elapsed / self.ticks.collapse as f32).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Sum of `size - min_size` over every piece
    pub fn total_excess(&self) -> f32 {
        self.pieces
            .iter()
            .map(|p| p.size - self.params.min_size)
            .sum()
    }

    /// Append `n` pieces at the anchor, each at `min_size` with a random velocity
    pub fn split_into<R: Rng + ?Sized>(&mut self, n: u32, ctx: &mut TickCtx<'_, R>) {
        self.pieces.reserve(n as usize);
        for _ in 0..n {
            let vel = random_velocity(&mut *ctx.rng, self.params.min_speed, self.params.max_speed);
            let piece = Piece::new(
                ctx.ids.next_id(),
                self.id,
                self.anchor,
                self.params.min_size,
                vel,
            );
            self.pieces.push(piece);
        }
    }

    /// Freeze the substance and schedule the next split.
    ///
    /// The sole piece is held at `max_size` for the collapse.
    pub fn collapse_then_split(&mut self, now: u64) {
        if let [sole] = self.pieces.as_mut_slice() {
            sole.size = self.params.max_size;
        }
        self.phase = Phase::Collapsing {
            started_at: now,
            ends_at: now.saturating_add(self.ticks.collapse_total()),
        };
    }

    /// Collapse deadline reached: the survivor becomes the first piece of a
    /// fresh batch of `piece_budget` pieces.
    fn finish_collapse<R: Rng + ?Sized>(&mut self, ctx: &mut TickCtx<'_, R>) {
        if let [sole] = self.pieces.as_mut_slice() {
            sole.size = self.params.min_size;
            sole.pos = self.anchor;
            sole.vel = random_velocity(&mut *ctx.rng, self.params.min_speed, self.params.max_speed);
        }
        let fresh = self.params.piece_budget.saturating_sub(self.pieces.len() as u32);
        self.split_into(fresh, ctx);
        self.generation += 1;

        log::debug!(
            "Substance {} split into {} pieces at ({:.1}, {:.1})",
            self.id,
            self.pieces.len(),
            self.anchor.x,
            self.anchor.y
        );
        ctx.events.push(SimEvent::Split {
            substance: self.id,
            pieces: self.pieces.len() as u32,
        });

        if self.ticks.settle == 0 {
            self.enable_collisions(ctx);
        } else {
            self.phase = Phase::Settling {
                ends_at: ctx.now.saturating_add(self.ticks.settle),
            };
        }
    }

    fn enable_collisions<R: Rng + ?Sized>(&mut self, ctx: &mut TickCtx<'_, R>) {
        self.phase = Phase::Roaming;
        log::debug!("Substance {} settled, collisions on", self.id);
        ctx.events.push(SimEvent::CollisionEnabled { substance: self.id });
    }

    /// Fire any lifecycle deadline that has passed. Returns true if a split happened.
    fn advance_phase<R: Rng + ?Sized>(&mut self, ctx: &mut TickCtx<'_, R>) -> bool {
        match self.phase {
            Phase::Collapsing { ends_at, .. } if ctx.now >= ends_at => {
                self.finish_collapse(ctx);
                true
            }
            Phase::Settling { ends_at } if ctx.now >= ends_at => {
                self.enable_collisions(ctx);
                false
            }
            _ => false,
        }
    }

    /// One tick: lifecycle deadlines, then motion and collisions in creation order.
    ///
    /// Pieces created by a split this tick stay at the anchor until the next tick.
    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &mut TickCtx<'_, R>) {
        if self.advance_phase(ctx) {
            return;
        }
        if !self.movement_enabled() {
            return;
        }

        let order: Vec<PieceId> = self.pieces.iter().map(|p| p.id).collect();
        for id in order {
            // A recollapse mid-sweep freezes everyone else
            if !self.movement_enabled() {
                break;
            }
            // Consumed earlier in this sweep
            let Some(idx) = self.index_of(id) else {
                continue;
            };
            self.pieces[idx].step(&ctx.bounds);

            if self.collision_enabled() {
                self.check_collision(id, ctx);
            }
        }
    }

    /// Test `id` against every other piece; the strictly larger side absorbs.
    ///
    /// On equal sizes the other piece absorbs `id`, so the outcome of a tie
    /// depends on which of the two gets checked first.
    pub fn check_collision<R: Rng + ?Sized>(&mut self, id: PieceId, ctx: &mut TickCtx<'_, R>) {
        let others: Vec<PieceId> = self.pieces.iter().map(|p| p.id).collect();
        for other in others {
            if other == id {
                continue;
            }
            if !self.collision_enabled() {
                break;
            }
            let Some(me) = self.piece(id) else {
                break;
            };
            let Some(them) = self.piece(other) else {
                continue;
            };
            if !circles_overlap(me, them) {
                continue;
            }

            if me.size > them.size {
                self.consume(id, other, ctx);
            } else {
                self.consume(other, id, ctx);
                break;
            }
        }
    }

    /// `absorber` grows by the prey's excess over `min_size` plus a fixed bonus,
    /// then the prey is removed. No-op unless both pieces are still present.
    pub fn consume<R: Rng + ?Sized>(
        &mut self,
        absorber: PieceId,
        prey: PieceId,
        ctx: &mut TickCtx<'_, R>,
    ) -> bool {
        if absorber == prey {
            return false;
        }
        let (Some(a_idx), Some(p_idx)) = (self.index_of(absorber), self.index_of(prey)) else {
            return false;
        };

        let gain = self.pieces[p_idx].size - self.params.min_size
            + self.params.growth_per_absorption();
        let absorber_piece = &mut self.pieces[a_idx];
        absorber_piece.size = (absorber_piece.size + gain).min(self.params.max_size);
        let new_size = absorber_piece.size;

        log::trace!(
            "Substance {}: piece {} absorbed {} (size {:.1})",
            self.id,
            absorber,
            prey,
            new_size
        );
        ctx.events.push(SimEvent::Absorbed {
            substance: self.id,
            absorber,
            absorbed: prey,
            new_size,
        });

        self.remove_piece(prey, ctx);
        true
    }

    /// Detach a piece and check whether a single survivor should recollapse
    pub fn remove_piece<R: Rng + ?Sized>(
        &mut self,
        id: PieceId,
        ctx: &mut TickCtx<'_, R>,
    ) -> Option<Piece> {
        let idx = self.index_of(id)?;
        let removed = self.pieces.remove(idx);
        self.check_recollapse(ctx);
        Some(removed)
    }

    /// One piece left: it becomes the anchor and the substance collapses again
    pub fn check_recollapse<R: Rng + ?Sized>(&mut self, ctx: &mut TickCtx<'_, R>) {
        let [sole] = self.pieces.as_slice() else {
            return;
        };
        self.anchor = sole.pos;
        self.collapse_then_split(ctx.now);

        log::debug!(
            "Substance {} down to one piece, recollapsing at ({:.1}, {:.1})",
            self.id,
            self.anchor.x,
            self.anchor.y
        );
        ctx.events.push(SimEvent::Recollapsed {
            substance: self.id,
            anchor: self.anchor,
        });
    }

    #[cfg(test)]
    pub(crate) fn pieces_mut(&mut self) -> &mut Vec<Piece> {
        &mut self.pieces
    }
}
