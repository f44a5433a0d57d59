use std::time::Duration;

use forum_defence_core::{BuildingKind, CellCoord, SimulationConfig};
use forum_defence_simulation::{SaveSnapshot, Simulation, SCHEMA_VERSION};
use forum_defence_world::query;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

fn township(config: &SimulationConfig, seed: u64) -> Simulation {
    let mut simulation = Simulation::new(config.clone(), seed);
    let mut events = Vec::new();
    let layout = [
        (BuildingKind::Road, 14, 15),
        (BuildingKind::Road, 14, 14),
        (BuildingKind::Road, 14, 13),
        (BuildingKind::Well, 13, 15),
        (BuildingKind::House, 13, 14),
        (BuildingKind::Market, 12, 12),
        (BuildingKind::House, 15, 13),
        (BuildingKind::Farm, 15, 11),
        (BuildingKind::Barracks, 17, 15),
        (BuildingKind::Tower, 14, 16),
    ];
    for (kind, x, z) in layout {
        assert!(simulation.try_place(kind, CellCoord::new(x, z), &mut events));
    }
    simulation
}

fn advance(simulation: &mut Simulation, ticks: u32) {
    let mut events = Vec::new();
    for _ in 0..ticks {
        for _ in 0..4 {
            let _ = simulation.frame(Duration::from_millis(250), &mut events);
        }
    }
}

fn assert_same_counters(left: &Simulation, right: &Simulation) {
    assert_eq!(left.tick_count(), right.tick_count());
    assert_eq!(left.resources(), right.resources());
    assert_eq!(left.score(), right.score());
    assert_eq!(left.schedule(), right.schedule());
    assert_eq!(
        query::grid_snapshot(left.world()),
        query::grid_snapshot(right.world())
    );
}

#[test]
fn restored_sessions_share_one_future() {
    let config = SimulationConfig::default();
    let mut original = township(&config, 21);
    advance(&mut original, 40);
    let snapshot = original.snapshot();

    let mut left = Simulation::from_snapshot(
        config.clone(),
        snapshot.clone(),
        ChaCha8Rng::seed_from_u64(99),
    )
    .expect("snapshot restores");
    let mut right =
        Simulation::from_snapshot(config, snapshot, ChaCha8Rng::seed_from_u64(99))
            .expect("snapshot restores");
    assert_eq!(left.tick_count(), original.tick_count());
    assert_eq!(left.resources(), original.resources());
    assert!(left.agents().is_empty());
    assert!(left.invasion().is_empty());

    for _ in 0..200 {
        advance(&mut left, 1);
        advance(&mut right, 1);
        assert_same_counters(&left, &right);
    }
    assert!(left.schedule().wave >= 1);
}

#[test]
fn sessions_without_transient_units_resume_exactly() {
    let config = SimulationConfig {
        starting_population: 12,
        farm_cadence: 0,
        ..SimulationConfig::default()
    };
    let mut original = Simulation::new(config.clone(), 5);
    let mut events = Vec::new();
    for (kind, x, z) in [
        (BuildingKind::Road, 14, 15),
        (BuildingKind::Road, 14, 14),
        (BuildingKind::House, 13, 14),
        (BuildingKind::Farm, 12, 15),
    ] {
        assert!(original.try_place(kind, CellCoord::new(x, z), &mut events));
    }
    let _ = original.tick(&mut events);
    let encoded = original.snapshot().encode().expect("encodes");

    let mut restored = Simulation::new(config, 77);
    assert!(restored.load(&encoded));
    assert_same_counters(&original, &restored);

    for _ in 0..60 {
        let _ = original.tick(&mut events);
        let _ = restored.tick(&mut events);
        assert_same_counters(&original, &restored);
    }
}

#[test]
fn unusable_saves_are_ignored() {
    let config = SimulationConfig::default();
    let mut simulation = township(&config, 8);
    advance(&mut simulation, 3);
    let before = simulation.snapshot();

    assert!(!simulation.load(""));
    assert!(!simulation.load("forum:v1:not-base64!"));
    assert!(!simulation.load("castle:v1:e30"));

    let mut future = before.clone();
    future.schema_version = SCHEMA_VERSION + 1;
    let encoded = future.encode().expect("encodes");
    assert!(!simulation.load(&encoded));

    let mut torn = before.clone();
    let farm = CellCoord::new(15, 11);
    let offset = usize::try_from(farm.z() * torn.grid_size + farm.x()).expect("index");
    torn.tiles[offset] = Default::default();
    assert!(!simulation.load(&torn.encode().expect("encodes")));

    let after = simulation.snapshot();
    assert_eq!(after.tiles, before.tiles);
    assert_eq!(after.tick, before.tick);
    assert_eq!(after.resources, before.resources);
}

#[test]
fn snapshots_carry_the_documented_fields() {
    let config = SimulationConfig::default();
    let mut simulation = township(&config, 8);
    advance(&mut simulation, 2);

    let encoded = simulation.snapshot().encode().expect("encodes");
    let decoded = SaveSnapshot::decode(&encoded).expect("decodes");

    assert_eq!(decoded.schema_version, SCHEMA_VERSION);
    assert_eq!(decoded.grid_size, config.grid_size);
    assert_eq!(decoded.tick, 2);
    assert_eq!(decoded.invasion, simulation.schedule());
    assert_eq!(decoded.tiles.len(), 32 * 32);
}
