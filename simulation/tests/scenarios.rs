use std::time::Duration;

use forum_defence_core::{
    AgentKind, BuildingKind, CellCoord, Command, Event, Service, SimulationConfig,
};
use forum_defence_simulation::Simulation;

fn place(simulation: &mut Simulation, kind: BuildingKind, x: u32, z: u32) {
    let mut events = Vec::new();
    assert!(
        simulation.try_place(kind, CellCoord::new(x, z), &mut events),
        "{kind:?} at ({x}, {z}) rejected: {events:?}"
    );
}

fn run_ticks(simulation: &mut Simulation, ticks: u32) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        simulation.apply(Command::Tick, &mut events);
    }
    events
}

#[test]
fn well_on_a_capital_road_sends_out_one_water_carrier() {
    let config = SimulationConfig::default();
    let cadence = config.well_cadence;
    let mut simulation = Simulation::new(config, 11);
    let capital = simulation.world().capital().copied().expect("capital");
    assert_eq!(capital.origin, CellCoord::new(15, 15));

    place(&mut simulation, BuildingKind::Road, 14, 15);
    place(&mut simulation, BuildingKind::Well, 13, 15);

    let events = run_ticks(&mut simulation, cadence);

    let agents: Vec<_> = simulation.agents().iter().collect();
    assert_eq!(agents.len(), 1);
    let carrier = agents[0];
    assert_eq!(carrier.kind(), AgentKind::WaterCarrier);
    let cell = carrier.current();
    assert!(simulation
        .world()
        .grid()
        .tile(cell)
        .is_some_and(|tile| tile.holds(BuildingKind::Road)));
    assert_eq!(cell.manhattan_distance(CellCoord::new(13, 15)), 1);
    assert!(events.contains(&Event::AgentSpawned {
        agent: carrier.id(),
        kind: AgentKind::WaterCarrier,
        cell,
    }));
}

#[test]
fn disconnected_well_sends_out_nobody() {
    let config = SimulationConfig::default();
    let cadence = config.well_cadence;
    let mut simulation = Simulation::new(config, 11);

    place(&mut simulation, BuildingKind::Road, 2, 2);
    place(&mut simulation, BuildingKind::Well, 1, 2);
    let _ = run_ticks(&mut simulation, cadence * 2);

    assert!(simulation.agents().is_empty());
}

#[test]
fn one_fully_serviced_house_grants_its_capacity() {
    let config = SimulationConfig::default();
    let per_house = config.house_capacity;
    let mut simulation = Simulation::new(config, 3);
    place(&mut simulation, BuildingKind::House, 0, 0);
    let grid = simulation.world_mut().grid_mut();
    grid.refresh_service(CellCoord::new(0, 0), Service::Water, 10);
    grid.refresh_service(CellCoord::new(0, 0), Service::Food, 10);

    let _ = run_ticks(&mut simulation, 1);

    assert_eq!(simulation.resources().max_population, per_house);
    assert_eq!(per_house, 10);
}

#[test]
fn half_serviced_houses_grant_nothing() {
    let mut simulation = Simulation::new(SimulationConfig::default(), 3);
    place(&mut simulation, BuildingKind::House, 0, 0);
    simulation
        .world_mut()
        .grid_mut()
        .refresh_service(CellCoord::new(0, 0), Service::Water, 10);

    let _ = run_ticks(&mut simulation, 1);

    assert_eq!(simulation.resources().max_population, 0);
}

#[test]
fn starvation_costs_exactly_the_shrink_rate() {
    let starving = |population| SimulationConfig {
        starting_food: -5,
        starting_population: population,
        ..SimulationConfig::default()
    };

    let mut simulation = Simulation::new(starving(5), 1);
    let report = simulation.tick(&mut Vec::new());
    assert_eq!(report.population, 3);
    assert_eq!(report.food_delta, -5);
    assert_eq!(simulation.resources().food, -10);

    let mut simulation = Simulation::new(starving(1), 1);
    let report = simulation.tick(&mut Vec::new());
    assert_eq!(report.population, 0);
}

#[test]
fn fed_population_grows_and_pays_taxes() {
    let config = SimulationConfig {
        starting_population: 30,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config, 5);
    for x in [0, 2, 4] {
        place(&mut simulation, BuildingKind::House, x, 0);
        let grid = simulation.world_mut().grid_mut();
        grid.refresh_service(CellCoord::new(x, 0), Service::Water, 10);
        grid.refresh_service(CellCoord::new(x, 0), Service::Food, 10);
    }
    let gold = simulation.resources().gold;

    let mut events = Vec::new();
    let report = simulation.tick(&mut events);

    assert_eq!(simulation.resources().max_population, 30);
    assert_eq!(report.population, 30);
    assert_eq!(report.tax_collected, 3);
    assert_eq!(simulation.resources().gold, gold + 3);
    assert!(events.contains(&Event::TaxCollected { amount: 3 }));
    assert_eq!(simulation.score().peak_population, 30);
    assert_eq!(simulation.score().gold_earned, 3);
}

#[test]
fn losing_the_capital_freezes_the_session_until_restart() {
    let config = SimulationConfig {
        grid_size: 4,
        tick_interval_ms: 60_000,
        first_wave_delay_ticks: 1,
        spawn_jitter: 0,
        invader_damage_base: 1_000.0,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config, 7);

    let first = run_ticks(&mut simulation, 1);
    assert!(first.contains(&Event::WaveStarted { wave: 1, invaders: 3 }));

    let mut events = Vec::new();
    assert_eq!(simulation.frame(Duration::from_secs(1), &mut events), 0);
    let second = run_ticks(&mut simulation, 1);
    assert!(second.contains(&Event::CapitalDestroyed));
    assert!(simulation.is_over());
    assert!(simulation.world().capital().is_none());

    let resources = simulation.resources();
    let score = simulation.score();
    let tick = simulation.tick_count();
    let after = run_ticks(&mut simulation, 5);
    let _ = simulation.frame(Duration::from_secs(120), &mut events);

    assert!(after.is_empty());
    assert_eq!(simulation.resources(), resources);
    assert_eq!(simulation.score(), score);
    assert_eq!(simulation.tick_count(), tick);
    assert_eq!(score.waves_survived, 1);
    let mut rejected = Vec::new();
    assert!(!simulation.try_place(BuildingKind::Road, CellCoord::new(0, 0), &mut rejected));

    simulation.apply(Command::Restart, &mut events);
    assert!(!simulation.is_over());
    assert!(simulation.world().capital().is_some());
    assert!(simulation.invasion().is_empty());
}

#[test]
fn insufficient_gold_leaves_the_treasury_alone() {
    let config = SimulationConfig {
        starting_gold: 30,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config, 2);
    let mut events = Vec::new();

    assert!(!simulation.try_place(BuildingKind::Farm, CellCoord::new(0, 0), &mut events));
    assert_eq!(simulation.resources().gold, 30);
    assert!(simulation.world().grid().is_vacant(CellCoord::new(0, 0)));
    assert!(!simulation.remove_at(CellCoord::new(0, 0), &mut events));
    assert!(!simulation.remove_at(CellCoord::new(15, 15), &mut events));
    assert_eq!(simulation.world().building_count(), 1);
}

#[test]
fn towers_shoot_invaders_that_come_into_range() {
    let config = SimulationConfig {
        grid_size: 8,
        tick_interval_ms: 60_000,
        first_wave_delay_ticks: 1,
        spawn_jitter: 0,
        tower_range: 16,
        tower_damage: 100,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config, 4);
    place(&mut simulation, BuildingKind::Road, 2, 3);
    place(&mut simulation, BuildingKind::Tower, 2, 4);

    let events = run_ticks(&mut simulation, 1);

    let tower = CellCoord::new(2, 4);
    let fired = events
        .iter()
        .filter(|event| matches!(event, Event::TowerFired { from, .. } if *from == tower))
        .count();
    assert_eq!(fired, 1);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::InvaderKilled { .. })));
    let _ = run_ticks(&mut simulation, 1);
    assert_eq!(simulation.invasion().live_cells().len(), 1);
}
