//! # Track Preview
//!
//! Headless run of the generator: feeds a rotation of stock structures,
//! walks a virtual player along the ribbon and prints what the track did.
//!
//! Usage: `track_preview [config.toml] [--frames <n>] [--budget <ops>]`

use std::path::Path;

use skyway_track::{
    AddonAssets, Budget, Chicane, Curve, Gap, Slope, Staircase, Straight, Structure, Terrain,
    TrackConfig, TrackResult,
};

/// Tiles the virtual player trails behind the newest tile.
const PLAYER_LAG: u64 = 24;

fn next_structure(index: usize) -> Box<dyn Structure> {
    match index % 6 {
        0 => Box::new(Straight::new(6)),
        1 => Box::new(Curve::new(4, 0.12)),
        2 => Box::new(Slope::new(3, 0.15)),
        3 => Box::new(Gap::new(1)),
        4 => Box::new(Staircase::new(3, 0.5)),
        _ => Box::new(Chicane::new(3, 0.1)),
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<usize> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn run(config: &TrackConfig, frames: usize, budget: usize) -> TrackResult<Terrain> {
    let mut terrain = Terrain::new(config, AddonAssets::headless())?;
    let mut structures = 0;
    let mut peak_tiles = 0;
    let mut peak_addons = 0;

    for frame in 0..frames {
        if terrain.is_idle() {
            terrain.enqueue_structure(next_structure(structures))?;
            structures += 1;
        }
        terrain.generate_chunks(Budget::Ops(budget))?;

        let player = terrain.stats().tiles_built.saturating_sub(PLAYER_LAG);
        terrain.remove_old_tiles(player);

        peak_tiles = peak_tiles.max(terrain.tile_count());
        peak_addons = peak_addons.max(terrain.addon_count());
        if frame % 100 == 0 {
            println!(
                "  frame {:>5}: {:>4} tiles, {:>4} addons, heading {:+.3} rad",
                frame,
                terrain.tile_count(),
                terrain.addon_count(),
                terrain.tile_builder().horizontal_angle()
            );
        }
    }

    println!();
    println!("Structures started:  {}", structures);
    println!("Peak live tiles:     {}", peak_tiles);
    println!("Peak live addons:    {}", peak_addons);
    Ok(terrain)
}

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         SKYWAY TRACK PREVIEW                                     ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();
    let frames = flag_value(&args, "--frames").unwrap_or(1000);
    let budget = flag_value(&args, "--budget").unwrap_or(16);

    let config = match args.get(1).filter(|a| !a.starts_with("--")) {
        Some(path) => {
            println!("Loading config: {}", path);
            match TrackConfig::from_toml_file(Path::new(path)) {
                Ok(config) => config,
                Err(e) => {
                    println!("Error: {}", e);
                    return;
                }
            }
        }
        None => TrackConfig::default(),
    };

    println!("Frames: {}, budget: {} opcodes/frame", frames, budget);
    println!();

    let terrain = match run(&config, frames, budget) {
        Ok(terrain) => terrain,
        Err(e) => {
            println!("Error: generation failed: {}", e);
            return;
        }
    };

    let stats = terrain.stats();
    println!();
    println!("┌─ TRACK STATS ────────────────────────────────────────────────────┐");
    println!("│ Tiles built:        {}", stats.tiles_built);
    println!("│ Tiles evicted:      {}", stats.tiles_evicted);
    println!("│ Addons placed:      {}", stats.addons_placed);
    println!("│ Addons evicted:     {}", stats.addons_evicted);
    println!("│ Opcodes executed:   {}", stats.opcodes_executed);
    println!("└──────────────────────────────────────────────────────────────────┘");
}
