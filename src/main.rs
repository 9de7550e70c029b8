//! Spore Zone headless driver
//!
//! Stands in for the browser host: a fake frame loop calls `advance()`, a
//! scripted "click" list feeds `spawn_substance`, and the render snapshot is
//! printed as JSON at the end.
//!
//! Usage: `spore-zone [config.json] [ticks]`

use glam::Vec2;

use spore_zone::sim::{SimEvent, Simulation};
use spore_zone::{SimConfig, SimResult};

/// Default run length (10 seconds at 60 Hz)
const DEFAULT_TICKS: u64 = 600;

/// Scripted clicks: (tick, x fraction, y fraction) of the surface
const CLICKS: [(u64, f32, f32); 3] = [(0, 0.25, 0.3), (90, 0.7, 0.6), (240, 0.5, 0.5)];

fn main() {
    env_logger::init();
    log::info!("Spore Zone (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> SimResult<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let ticks = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICKS);

    let mut sim = Simulation::new(config)?;
    let bounds = sim.bounds();
    log::info!("Running {} ticks at {:.2} ms", ticks, sim.config().tick_ms);

    let mut splits = 0u32;
    let mut absorptions = 0u32;
    let mut recollapses = 0u32;

    for tick in 0..ticks {
        for &(at, fx, fy) in CLICKS.iter().filter(|(at, _, _)| *at == tick) {
            log::debug!("Click at tick {}", at);
            sim.spawn_substance(Vec2::new(fx * bounds.width, fy * bounds.height));
        }

        sim.advance();

        for event in sim.drain_events() {
            match event {
                SimEvent::Split { .. } => splits += 1,
                SimEvent::Absorbed { .. } => absorptions += 1,
                SimEvent::Recollapsed { .. } => recollapses += 1,
                _ => {}
            }
        }

        if (tick + 1) % 60 == 0 {
            log::info!(
                "t={:.1}s substances={} pieces={}",
                sim.time_ms() / 1000.0,
                sim.substances().len(),
                sim.piece_count()
            );
        }
    }

    log::info!(
        "Done after {} ticks: {} splits, {} absorptions, {} recollapses",
        ticks,
        splits,
        absorptions,
        recollapses
    );
    println!("{}", sim.snapshot_json()?);
    Ok(())
}
