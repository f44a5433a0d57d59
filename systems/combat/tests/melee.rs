use forum_defence_core::{
    AgentKind, BuildingKind, CellCoord, Event, InvaderState, SequenceRandom, SimulationConfig,
};
use forum_defence_system_agents::Agents;
use forum_defence_system_combat::Combat;
use forum_defence_system_invasion::Invasion;
use forum_defence_world::World;

struct Skirmish {
    config: SimulationConfig,
    world: World,
    agents: Agents,
    invasion: Invasion,
    combat: Combat,
}

impl Skirmish {
    fn with_soldier(config: SimulationConfig) -> (Self, forum_defence_core::AgentId) {
        let mut world = World::new(16);
        let mut funds = 1_000;
        let barracks = world
            .place(BuildingKind::Barracks, CellCoord::new(0, 0), &mut funds)
            .expect("barracks placed");
        let mut agents = Agents::new();
        let mut events = Vec::new();
        let soldier = agents
            .spawn(
                &world,
                AgentKind::Soldier,
                &barracks,
                &config,
                &mut SequenceRandom::zeroes(),
                &mut events,
            )
            .expect("soldier spawned");
        let invasion = Invasion::new(&config);

        (
            Self {
                config,
                world,
                agents,
                invasion,
                combat: Combat::new(),
            },
            soldier,
        )
    }

    fn exchange(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.combat
            .resolve_melee(&mut self.agents, &mut self.invasion, &self.config, &mut events);
        events
    }
}

#[test]
fn two_exchanges_kill_an_eight_point_invader() {
    let (mut skirmish, soldier) = Skirmish::with_soldier(SimulationConfig::default());
    let soldier_cell = skirmish.agents.get(soldier).expect("soldier").current();
    assert_eq!(soldier_cell, CellCoord::new(2, 0));
    let invader = skirmish
        .invasion
        .spawn_invader(&skirmish.world, CellCoord::new(3, 0), 8, 2);

    let first = skirmish.exchange();
    assert_eq!(
        first,
        vec![Event::SoldierHit {
            agent: soldier,
            invader,
            cell: CellCoord::new(3, 0),
        }]
    );
    assert_eq!(skirmish.invasion.get(invader).map(|i| i.hit_points()), Some(4));

    let second = skirmish.exchange();
    assert!(second.contains(&Event::InvaderKilled {
        invader,
        cell: CellCoord::new(3, 0),
    }));
    assert_eq!(
        skirmish.invasion.get(invader).map(|i| i.state()),
        Some(InvaderState::Dead)
    );
    assert_eq!(skirmish.agents.get(soldier).map(|s| s.hit_points()), Some(16));

    assert!(skirmish.exchange().is_empty());
}

#[test]
fn soldiers_out_of_reach_do_not_fight() {
    let (mut skirmish, _soldier) = Skirmish::with_soldier(SimulationConfig::default());
    let invader = skirmish
        .invasion
        .spawn_invader(&skirmish.world, CellCoord::new(5, 0), 8, 2);

    assert!(skirmish.exchange().is_empty());
    assert_eq!(skirmish.invasion.get(invader).map(|i| i.hit_points()), Some(8));
}

#[test]
fn blows_land_simultaneously() {
    let config = SimulationConfig {
        soldier_hit_points: 2,
        ..SimulationConfig::default()
    };
    let (mut skirmish, soldier) = Skirmish::with_soldier(config);
    let invader = skirmish
        .invasion
        .spawn_invader(&skirmish.world, CellCoord::new(2, 1), 4, 5);

    let events = skirmish.exchange();

    assert_eq!(
        events,
        vec![
            Event::SoldierHit {
                agent: soldier,
                invader,
                cell: CellCoord::new(2, 1),
            },
            Event::InvaderKilled {
                invader,
                cell: CellCoord::new(2, 1),
            },
            Event::SoldierFell { agent: soldier },
        ]
    );
    assert!(skirmish.agents.get(soldier).is_none());
}
