//! Fixed timestep simulation tick and spawning
//!
//! The host's frame loop calls [`Simulation::advance`] once per frame. The
//! simulation never schedules anything itself; every lifecycle timer is a tick
//! deadline checked here.

use glam::Vec2;

use super::collision::Bounds;
use super::piece::SubstanceId;
use super::state::{SimEvent, Simulation, SpawnRequest};
use super::substance::{LifecycleTicks, Substance, TickCtx};
use crate::error::SimResult;
use crate::settings::SubstanceParams;
use crate::{SporeColor, clamp_to_surface};

impl Simulation {
    /// Advance every substance by one tick, in spawn order
    pub fn advance(&mut self) {
        self.time_ticks += 1;

        let mut ctx = TickCtx {
            now: self.time_ticks,
            bounds: self.bounds,
            rng: &mut self.rng,
            ids: &mut self.piece_ids,
            events: &mut self.events,
        };
        for substance in &mut self.substances {
            substance.update(&mut ctx);
        }
        self.trim_events();
    }

    /// Advance `n` ticks
    pub fn advance_by(&mut self, n: u64) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Spawn a substance with the configured parameters. Never fails;
    /// out-of-surface or non-finite coordinates are clamped.
    pub fn spawn_substance(&mut self, position: Vec2) -> SubstanceId {
        let params = self.config.substance;
        let ticks = self.default_ticks;
        self.insert_substance(position, params, ticks)
    }

    /// Spawn with optional per-substance parameters, rejecting invalid ones
    pub fn spawn_with(&mut self, request: SpawnRequest) -> SimResult<SubstanceId> {
        let Some(params) = request.params else {
            return Ok(self.spawn_substance(request.position));
        };
        params.validate()?;
        let ticks = LifecycleTicks::from_config(&self.config, &params);
        Ok(self.insert_substance(request.position, params, ticks))
    }

    fn insert_substance(
        &mut self,
        position: Vec2,
        params: SubstanceParams,
        ticks: LifecycleTicks,
    ) -> SubstanceId {
        let anchor = clamp_spawn(position, &self.bounds);
        let id = self.substance_ids.next_id();
        let color = SporeColor::for_index(self.substances.len());

        let mut ctx = TickCtx {
            now: self.time_ticks,
            bounds: self.bounds,
            rng: &mut self.rng,
            ids: &mut self.piece_ids,
            events: &mut self.events,
        };
        let substance = Substance::build(id, color, anchor, params, ticks, &mut ctx);
        self.substances.push(substance);

        log::info!(
            "Spawned substance {} ({}) at ({:.1}, {:.1}), {} substances total",
            id,
            color.as_str(),
            anchor.x,
            anchor.y,
            self.substances.len()
        );
        self.events.push(SimEvent::Spawned {
            substance: id,
            position: anchor,
            color,
        });
        self.trim_events();
        id
    }
}

fn clamp_spawn(position: Vec2, bounds: &Bounds) -> Vec2 {
    let clamped = clamp_to_surface(position, bounds.width, bounds.height);
    if clamped != position {
        log::warn!(
            "Spawn position ({}, {}) outside surface, clamped to ({}, {})",
            position.x,
            position.y,
            clamped.x,
            clamped.y
        );
    }
    clamped
}
