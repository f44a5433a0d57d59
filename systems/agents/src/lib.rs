#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Agent movement system for service walkers, farmers and soldiers.
//!
//! Agents move between neighbouring cells in two cadences. The tick cadence
//! only ages lifespans. The frame cadence interpolates every agent toward its
//! target cell and, on arrival, runs the grid-dependent arrival logic: house
//! service delivery and next-target selection. Interpolation between
//! arrivals never touches the grid.

use std::time::Duration;

use forum_defence_core::{
    AgentId, AgentKind, BuildingKind, CellCoord, Event, RandomSource, SimulationConfig,
};
use forum_defence_world::{perimeter_cells, BuildingRecord, Grid, World};

/// A mobile agent other than an invader.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    id: AgentId,
    kind: AgentKind,
    current: CellCoord,
    target: CellCoord,
    previous: Option<CellCoord>,
    progress: f32,
    lifespan: u32,
    hit_points: u32,
    home: CellCoord,
}

impl Agent {
    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Kind of agent.
    #[must_use]
    pub const fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Cell the agent last arrived at.
    #[must_use]
    pub const fn current(&self) -> CellCoord {
        self.current
    }

    /// Cell the agent is walking toward.
    #[must_use]
    pub const fn target(&self) -> CellCoord {
        self.target
    }

    /// Cell departed before the current one.
    #[must_use]
    pub const fn previous(&self) -> Option<CellCoord> {
        self.previous
    }

    /// Interpolation progress from `current` to `target` in `[0, 1)`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Ticks left before the agent expires.
    #[must_use]
    pub const fn lifespan(&self) -> u32 {
        self.lifespan
    }

    /// Remaining hit points; only meaningful for soldiers.
    #[must_use]
    pub const fn hit_points(&self) -> u32 {
        self.hit_points
    }

    /// Origin of the building that spawned the agent.
    #[must_use]
    pub const fn home(&self) -> CellCoord {
        self.home
    }

    /// Interpolated position in cell units for presentation.
    #[must_use]
    pub fn position(&self) -> (f32, f32) {
        let lerp = |from: u32, to: u32| from as f32 + (to as f32 - from as f32) * self.progress;
        (
            lerp(self.current.x(), self.target.x()),
            lerp(self.current.z(), self.target.z()),
        )
    }

    /// Applies melee damage, reporting whether the agent died.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.hit_points = self.hit_points.saturating_sub(amount);
        self.hit_points == 0
    }
}

/// Owner of every live agent.
#[derive(Clone, Debug, Default)]
pub struct Agents {
    agents: Vec<Agent>,
    next_agent_id: u32,
}

impl Agents {
    /// Creates an empty agent collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends an agent out of the provided source building.
    ///
    /// The start cell is the first road cell around the building's whole
    /// perimeter, preferring roads on the capital's network over stray ones.
    /// Soldiers fall back to any empty perimeter cell; road-bound agents
    /// without an adjacent road are not spawned.
    pub fn spawn<R: RandomSource>(
        &mut self,
        world: &World,
        kind: AgentKind,
        source: &BuildingRecord,
        config: &SimulationConfig,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> Option<AgentId> {
        let grid = world.grid();
        let perimeter = perimeter_cells(source.origin, source.size(), grid.size());
        let roads: Vec<CellCoord> = perimeter
            .iter()
            .copied()
            .filter(|cell| {
                grid.tile(*cell)
                    .is_some_and(|tile| tile.holds(BuildingKind::Road))
            })
            .collect();
        let network = world.road_network();
        let road = roads
            .iter()
            .copied()
            .find(|cell| network.contains(*cell))
            .or_else(|| roads.first().copied());
        let start = match road {
            Some(cell) => cell,
            None if kind.is_road_bound() => return None,
            None => perimeter.into_iter().find(|cell| grid.is_vacant(*cell))?,
        };

        let id = AgentId::new(self.next_agent_id);
        self.next_agent_id = self.next_agent_id.wrapping_add(1);
        let hit_points = if kind.is_road_bound() {
            1
        } else {
            config.soldier_hit_points
        };

        let mut agent = Agent {
            id,
            kind,
            current: start,
            target: start,
            previous: None,
            progress: 0.0,
            lifespan: config.lifespan_ticks(kind.is_road_bound()),
            hit_points,
            home: source.origin,
        };
        agent.target = if kind.is_road_bound() {
            next_road_cell(&agent, grid, rng)
        } else {
            next_patrol_cell(&agent, grid, config.patrol_radius, rng)
        };

        self.agents.push(agent);
        out.push(Event::AgentSpawned {
            agent: id,
            kind,
            cell: start,
        });
        Some(id)
    }

    /// Ages every agent by one tick and removes those whose lifespan ran out.
    pub fn age(&mut self, out: &mut Vec<Event>) {
        for agent in &mut self.agents {
            agent.lifespan = agent.lifespan.saturating_sub(1);
        }
        self.agents.retain(|agent| {
            if agent.lifespan == 0 {
                out.push(Event::AgentExpired { agent: agent.id });
                false
            } else {
                true
            }
        });
    }

    /// Interpolates every agent toward its target and runs arrival logic.
    ///
    /// `invaders` lists the cells of live invaders; soldiers chase the nearest
    /// one and patrol around their barracks when the list is empty.
    pub fn advance_frame<R: RandomSource>(
        &mut self,
        dt: Duration,
        grid: &mut Grid,
        invaders: &[CellCoord],
        config: &SimulationConfig,
        rng: &mut R,
    ) {
        let step = dt.as_secs_f32() * config.agent_speed;
        if step <= 0.0 {
            return;
        }

        for agent in &mut self.agents {
            agent.progress += step;
            if agent.progress < 1.0 {
                continue;
            }
            agent.progress = 0.0;
            arrive(agent, grid, invaders, config, rng);
        }
    }

    /// Removes the agent with the provided identifier.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let index = self.agents.iter().position(|agent| agent.id == id)?;
        Some(self.agents.remove(index))
    }

    /// Agent with the provided identifier.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    /// Mutable agent with the provided identifier.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id == id)
    }

    /// Iterates over live agents in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Identifiers of every live soldier in spawn order.
    #[must_use]
    pub fn soldier_ids(&self) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter(|agent| agent.kind == AgentKind::Soldier)
            .map(|agent| agent.id)
            .collect()
    }

    /// Number of live agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Reports whether no agent is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Removes every agent and resets identifier allocation.
    pub fn clear(&mut self) {
        self.agents.clear();
        self.next_agent_id = 0;
    }
}

fn arrive<R: RandomSource>(
    agent: &mut Agent,
    grid: &mut Grid,
    invaders: &[CellCoord],
    config: &SimulationConfig,
    rng: &mut R,
) {
    if agent.target != agent.current {
        agent.previous = Some(agent.current);
        agent.current = agent.target;
    }

    if agent.kind.is_road_bound() {
        deliver_services(agent, grid, config.service_duration_ticks);
        agent.target = next_road_cell(agent, grid, rng);
    } else if let Some(quarry) = nearest(agent.current, invaders) {
        agent.target = chase_step(agent.current, quarry, grid);
    } else {
        agent.target = next_patrol_cell(agent, grid, config.patrol_radius, rng);
    }
}

fn deliver_services(agent: &Agent, grid: &mut Grid, ticks: u32) {
    let Some(service) = agent.kind.service() else {
        return;
    };
    let size = grid.size();
    let reach: Vec<CellCoord> = std::iter::once(agent.current)
        .chain(agent.current.neighbors(size))
        .collect();
    for cell in reach {
        let is_house = grid
            .tile(cell)
            .is_some_and(|tile| tile.holds(BuildingKind::House));
        if is_house {
            grid.refresh_service(cell, service, ticks);
        }
    }
}

fn next_road_cell<R: RandomSource>(agent: &Agent, grid: &Grid, rng: &mut R) -> CellCoord {
    choose_neighbor(agent, grid, rng, |cell| grid.is_connective(cell))
}

fn next_patrol_cell<R: RandomSource>(
    agent: &Agent,
    grid: &Grid,
    radius: u32,
    rng: &mut R,
) -> CellCoord {
    if agent.current.manhattan_distance(agent.home) > radius {
        return chase_step(agent.current, agent.home, grid);
    }
    choose_neighbor(agent, grid, rng, |cell| {
        is_soldier_walkable(grid, cell) && cell.manhattan_distance(agent.home) <= radius
    })
}

/// Picks a random allowed neighbour other than the cell just departed,
/// backtracking when that is the only option and staying put otherwise.
fn choose_neighbor<R, F>(agent: &Agent, grid: &Grid, rng: &mut R, allowed: F) -> CellCoord
where
    R: RandomSource,
    F: Fn(CellCoord) -> bool,
{
    let candidates: Vec<CellCoord> = agent
        .current
        .neighbors(grid.size())
        .filter(|cell| Some(*cell) != agent.previous && allowed(*cell))
        .collect();

    if !candidates.is_empty() {
        return candidates[rng.index(candidates.len())];
    }

    match agent.previous {
        Some(previous) if allowed(previous) => previous,
        _ => agent.current,
    }
}

fn is_soldier_walkable(grid: &Grid, cell: CellCoord) -> bool {
    grid.tile(cell)
        .is_some_and(|tile| tile.is_empty() || tile.is_connective())
}

fn nearest(from: CellCoord, cells: &[CellCoord]) -> Option<CellCoord> {
    cells
        .iter()
        .copied()
        .min_by_key(|cell| from.manhattan_distance(*cell))
}

/// One step toward `quarry`, preferring the axis with the larger delta and
/// falling back to the other axis when the preferred cell is blocked.
fn chase_step(from: CellCoord, quarry: CellCoord, grid: &Grid) -> CellCoord {
    let dx = i64::from(quarry.x()) - i64::from(from.x());
    let dz = i64::from(quarry.z()) - i64::from(from.z());
    let step_x = (dx != 0).then(|| from.offset(signum(dx), 0, grid.size())).flatten();
    let step_z = (dz != 0).then(|| from.offset(0, signum(dz), grid.size())).flatten();

    let (preferred, fallback) = if dx.abs() >= dz.abs() {
        (step_x, step_z)
    } else {
        (step_z, step_x)
    };

    [preferred, fallback]
        .into_iter()
        .flatten()
        .find(|cell| is_soldier_walkable(grid, *cell))
        .unwrap_or(from)
}

fn signum(delta: i64) -> i32 {
    match delta {
        d if d > 0 => 1,
        d if d < 0 => -1,
        _ => 0,
    }
}
