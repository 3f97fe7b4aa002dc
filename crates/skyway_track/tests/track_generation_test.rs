//! Integration tests for budgeted track generation.

use skyway_shared::CONTINUITY_EPSILON;
use skyway_track::{
    AddonAssets, Budget, Chicane, Curve, Gap, Slope, Staircase, Straight, Structure, Terrain,
    TileBuilder, TrackConfig,
};

fn rotation(index: usize) -> Box<dyn Structure> {
    match index % 6 {
        0 => Box::new(Straight::new(6)),
        1 => Box::new(Curve::new(4, 0.12)),
        2 => Box::new(Slope::new(3, 0.15)),
        3 => Box::new(Gap::new(1)),
        4 => Box::new(Staircase::new(3, 0.5)),
        _ => Box::new(Chicane::new(3, 0.1)),
    }
}

fn terrain(config: &TrackConfig) -> Terrain {
    Terrain::new(config, AddonAssets::headless()).unwrap()
}

#[test]
fn test_endless_run_stays_bounded() {
    let config = TrackConfig {
        eviction_horizon: 10,
        ..TrackConfig::test()
    };
    let mut terrain = terrain(&config);
    let mut structures = 0;

    for _ in 0..3000 {
        if terrain.is_idle() {
            terrain.enqueue_structure(rotation(structures)).unwrap();
            structures += 1;
        }
        terrain.generate_chunks(Budget::Ops(8)).unwrap();

        // Player trails the newest tile by four
        let player = terrain.stats().tiles_built.saturating_sub(4);
        terrain.remove_old_tiles(player);

        assert!(terrain.tile_count() <= config.tile_capacity());
        assert!(terrain.addon_count() <= config.addon_capacity());

        let oldest = terrain.tile(0).unwrap().id();
        assert!(player.saturating_sub(oldest) <= config.eviction_horizon);
        for addon in terrain.addons() {
            assert!(addon.anchor_tile_id().unwrap() >= oldest);
        }
    }

    let stats = terrain.stats();
    assert!(stats.tiles_built > 1000, "only {} tiles built", stats.tiles_built);
    assert_eq!(stats.tiles_built - stats.tiles_evicted, terrain.tile_count() as u64);
    assert_eq!(stats.addons_placed - stats.addons_evicted, terrain.addon_count() as u64);

    // Live ids stay consecutive after thousands of evictions
    let ids: Vec<u64> = terrain.tiles().map(|t| t.id()).collect();
    for pair in ids.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[test]
fn test_budget_independence() {
    let config = TrackConfig::test();
    let mut drained = terrain(&config);
    let mut stepped = terrain(&config);
    for i in 0..12 {
        drained.enqueue_structure(rotation(i)).unwrap();
        stepped.enqueue_structure(rotation(i)).unwrap();
    }

    let total = drained.generate_chunks(Budget::Drain).unwrap();
    let mut steps = 0;
    while !stepped.is_idle() {
        steps += stepped.generate_chunks(Budget::Ops(3)).unwrap();
    }

    assert_eq!(steps, total);
    assert_eq!(drained.stats(), stepped.stats());
    assert_eq!(drained.tile_count(), stepped.tile_count());
    for (a, b) in drained.tiles().zip(stepped.tiles()) {
        assert_eq!(a, b);
    }
    assert_eq!(drained.addon_count(), stepped.addon_count());
    for (a, b) in drained.addons().zip(stepped.addons()) {
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.placement(), b.placement());
    }
}

#[test]
fn test_straight_then_curve() {
    let mut terrain = terrain(&TrackConfig::test());
    terrain.enqueue_structure(Box::new(Straight::new(5))).unwrap();
    terrain.enqueue_structure(Box::new(Curve::new(3, 0.1))).unwrap();
    terrain.generate_chunks(Budget::Drain).unwrap();

    assert_eq!(terrain.tile_count(), 9);

    let tiles: Vec<_> = terrain.tiles().collect();
    for pair in tiles.windows(2) {
        assert!(pair[0].far_left().approx_eq(pair[1].near_left(), CONTINUITY_EPSILON));
        assert!(pair[0].far_right().approx_eq(pair[1].near_right(), CONTINUITY_EPSILON));
    }

    // Each curve tile's near edge is turned a further 0.1 rad
    let angles: Vec<f32> = tiles
        .iter()
        .map(|t| {
            let lateral = t.near_right() - t.near_left();
            (-lateral.z).atan2(lateral.x)
        })
        .collect();
    for angle in &angles[..6] {
        assert!(angle.abs() < 1e-5);
    }
    for (k, angle) in angles[6..].iter().enumerate() {
        let expected = 0.1 * (k + 1) as f32;
        assert!((angle - expected).abs() < 1e-4, "tile {} turned {}", k + 6, angle);
    }
    assert!((terrain.tile_builder().horizontal_angle() - 0.3).abs() < 1e-5);
}

#[test]
fn test_rows_and_fields_follow_the_surface() {
    let config = TrackConfig::test();
    let mut terrain = terrain(&config);
    let route: Vec<Box<dyn Structure>> = vec![
        Box::new(Straight::new(4)),
        Box::new(Curve::new(10, 0.15)),
        Box::new(Straight::new(4)),
        Box::new(Slope::new(3, 0.15)),
        Box::new(Straight::new(4)),
        Box::new(Curve::new(4, -0.12)),
        Box::new(Straight::new(6)),
    ];
    for structure in route {
        terrain.enqueue_structure(structure).unwrap();
    }
    terrain.generate_chunks(Budget::Drain).unwrap();

    // Every row line crosses its owning tile laterally
    let builder = terrain.tile_builder();
    let half_spacing = config.row_spacing * 0.5;
    for seq in 0..builder.row_total() {
        let row = builder.row(seq).unwrap();
        let owner = terrain.tiles().find(|t| t.id() == row.tile_id).unwrap();
        let heading = owner.forward().try_normalize().unwrap();
        let lead = (row.left - row.right).dot(heading);
        assert!(lead.abs() <= half_spacing + 1e-4, "row {seq} of tile {} leans {lead}", row.tile_id);
    }

    // Placed fields sit on the ribbon, and never on the still-provisional tile
    let newest = terrain.tiles().next_back().unwrap().id();
    assert!(terrain.addon_count() > 0);
    for addon in terrain.addons() {
        let field = addon.field().unwrap();
        assert!(
            terrain.locate_tile(field.center()).is_some(),
            "{} field at {:?} is off the ribbon",
            addon.kind().name(),
            field.center()
        );
        assert!(addon.anchor_tile_id().unwrap() < newest);
    }
}

#[test]
fn test_rollback_matches_fresh_build() {
    let config = TrackConfig::test();
    let prefix = |builder: &mut TileBuilder| {
        for i in 0..6 {
            builder.add_horizontal_angle(if i % 2 == 0 { 0.1 } else { -0.05 });
            builder.add_segment(i == 3).unwrap();
        }
    };

    let mut retried = TileBuilder::new(&config).unwrap();
    prefix(&mut retried);
    retried.add_horizontal_angle(0.4);
    retried.lift(1.0);
    retried.add_segment(false).unwrap();
    retried.rollback_last().unwrap();
    retried.add_horizontal_angle(-0.2);
    retried.add_segment(false).unwrap();

    let mut fresh = TileBuilder::new(&config).unwrap();
    prefix(&mut fresh);
    fresh.add_horizontal_angle(-0.2);
    fresh.add_segment(false).unwrap();

    assert_eq!(retried.tile_count(), fresh.tile_count());
    assert_eq!(retried.next_id(), fresh.next_id());
    assert_eq!(retried.left_point_total(), fresh.left_point_total());
    assert_eq!(retried.right_point_total(), fresh.right_point_total());
    assert_eq!(retried.row_total(), fresh.row_total());
    assert_eq!(retried.history_len(), fresh.history_len());
    assert!((retried.horizontal_angle() - fresh.horizontal_angle()).abs() < 1e-6);

    for (a, b) in retried.tiles().zip(fresh.tiles()) {
        assert_eq!(a.id(), b.id());
        assert!(a.far_left().approx_eq(b.far_left(), 1e-5));
        assert!(a.far_right().approx_eq(b.far_right(), 1e-5));
    }
    for seq in 0..fresh.left_point_total() {
        let (a, b) = (retried.left_point(seq).unwrap(), fresh.left_point(seq).unwrap());
        assert!(a.approx_eq(b, 1e-5), "left point {seq}");
    }
    for seq in 0..fresh.right_point_total() {
        let (a, b) = (retried.right_point(seq).unwrap(), fresh.right_point(seq).unwrap());
        assert!(a.approx_eq(b, 1e-5), "right point {seq}");
    }
    assert_eq!(retried.rollbacks(), 1);
}
