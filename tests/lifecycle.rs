//! End-to-end lifecycle through the public `Simulation` API

use glam::Vec2;

use spore_zone::SimConfig;
use spore_zone::sim::{Phase, SimEvent, Simulation};

fn small_arena() -> SimConfig {
    let mut config = SimConfig::with_surface(300.0, 300.0);
    config.seed = 2024;
    config.substance.piece_budget = 4;
    config.substance.min_size = 40.0;
    config.substance.max_size = 120.0;
    config
}

#[test]
fn test_full_cycle_split_absorb_recollapse_resplit() {
    let mut sim = Simulation::new(small_arena()).unwrap();
    let id = sim.spawn_substance(Vec2::new(150.0, 150.0));

    let mut saw_split = false;
    let mut saw_collision_on = false;
    let mut absorptions = 0;
    let mut recollapse_tick = None;

    for _ in 0..50_000 {
        sim.advance();
        for event in sim.drain_events() {
            match event {
                SimEvent::Split { substance, pieces } => {
                    assert_eq!(substance, id);
                    assert_eq!(pieces, 4);
                    saw_split = true;
                }
                SimEvent::CollisionEnabled { .. } => saw_collision_on = true,
                SimEvent::Absorbed { .. } => {
                    assert!(saw_collision_on, "absorption before settle delay elapsed");
                    absorptions += 1;
                }
                SimEvent::Recollapsed { substance, anchor } => {
                    let s = sim.substance(substance).unwrap();
                    assert_eq!(s.len(), 1);
                    assert_eq!(s.anchor, anchor);
                    assert_eq!(s.pieces()[0].pos, anchor);
                    assert!(matches!(s.phase, Phase::Collapsing { .. }));
                    assert_eq!(s.pieces()[0].size, 120.0);
                    recollapse_tick = Some(sim.time_ticks());
                }
                SimEvent::Spawned { .. } => {}
            }
        }
        if recollapse_tick.is_some() {
            break;
        }
    }

    assert!(saw_split);
    assert_eq!(absorptions, 3);
    let recollapsed_at = recollapse_tick.expect("substance never coalesced");

    // No movement while collapsing, then a fresh split of the full budget
    let anchor = sim.substance(id).unwrap().anchor;
    let collapse = sim.substance(id).unwrap().ticks.collapse_total();
    sim.advance_by(collapse);
    let s = sim.substance(id).unwrap();
    assert_eq!(sim.time_ticks(), recollapsed_at + collapse);
    assert_eq!(s.len(), 4);
    assert_eq!(s.generation, 2);
    assert!(s.pieces().iter().all(|p| p.pos == anchor && p.size == 40.0));
}

#[test]
fn test_collisions_wait_for_settle_delay() {
    let mut sim = Simulation::new(small_arena()).unwrap();
    let id = sim.spawn_substance(Vec2::new(150.0, 150.0));
    let ticks = sim.substance(id).unwrap().ticks;

    sim.advance_by(ticks.collapse_total());
    assert_eq!(sim.substance(id).unwrap().len(), 4);

    // Fresh pieces all overlap at the anchor, yet nobody absorbs while settling
    sim.advance_by(ticks.settle - 1);
    assert_eq!(sim.substance(id).unwrap().len(), 4);
    assert!(!sim.substance(id).unwrap().collision_enabled());

    sim.drain_events();
    sim.advance();
    assert!(
        sim.drain_events()
            .iter()
            .any(|e| matches!(e, SimEvent::CollisionEnabled { substance } if *substance == id))
    );
}

#[test]
fn test_substances_accumulate() {
    let mut sim = Simulation::new(small_arena()).unwrap();
    for i in 0..20 {
        sim.spawn_substance(Vec2::new(10.0 * i as f32, 150.0));
        sim.advance_by(5);
    }
    sim.advance_by(500);
    assert_eq!(sim.substances().len(), 20);
    assert!(sim.substances().iter().all(|s| !s.is_empty()));
}
