#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation orchestrator for Forum Defence.
//!
//! [`Simulation`] owns the world, the agent and invader collections and the
//! economy, and drives them on two cadences. A fixed-period tick runs the
//! economic, spawning and combat rules in a fixed order; a continuous frame
//! update accumulates time toward the next tick and interpolates movement
//! in between. Collaborators drive it through [`Command`]s and observe it
//! through the [`Event`]s every call appends to its out buffer.

pub mod economy;
mod snapshot;

use std::time::Duration;

use chrono::Utc;
use forum_defence_core::{
    BuildingKind, CellCoord, Command, Event, InvasionSchedule, PlacementError, RandomSource,
    Resources, Score, SimulationConfig,
};
use forum_defence_system_agents::Agents;
use forum_defence_system_combat::Combat;
use forum_defence_system_invasion::Invasion;
use forum_defence_world::{query as world_query, BuildingRecord, World};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use tracing::{debug, info, warn};

pub use snapshot::{SaveSnapshot, SnapshotError, SCHEMA_VERSION};

/// Summary of one simulation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Number of the tick that just ran.
    pub tick: u64,
    /// Gold collected in taxes.
    pub tax_collected: u32,
    /// Net change applied to the food stock.
    pub food_delta: i64,
    /// Population after the adjustment step.
    pub population: u32,
    /// The session is over; nothing was simulated if it already was.
    pub session_over: bool,
}

/// Complete single-threaded simulation session.
#[derive(Debug)]
pub struct Simulation<R: RandomSource = ChaCha8Rng> {
    config: SimulationConfig,
    world: World,
    agents: Agents,
    invasion: Invasion,
    combat: Combat,
    resources: Resources,
    score: Score,
    tick: u64,
    accumulator: Duration,
    paused: bool,
    session_over: bool,
    rng: R,
}

impl Simulation<ChaCha8Rng> {
    /// Creates a session driven by a ChaCha generator seeded with `seed`.
    #[must_use]
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self::with_random(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Creates a session whose random choices are drawn from `rng`.
    #[must_use]
    pub fn with_random(config: SimulationConfig, rng: R) -> Self {
        Self {
            world: World::new(config.grid_size),
            agents: Agents::new(),
            invasion: Invasion::new(&config),
            combat: Combat::new(),
            resources: Resources::opening(&config),
            score: Score::default(),
            tick: 0,
            accumulator: Duration::ZERO,
            paused: false,
            session_over: false,
            config,
            rng,
        }
    }

    /// Rebuilds a session from a snapshot; agents and invaders start empty.
    pub fn from_snapshot(
        config: SimulationConfig,
        snapshot: SaveSnapshot,
        rng: R,
    ) -> Result<Self, SnapshotError> {
        let mut simulation = Self::with_random(config, rng);
        simulation.restore(snapshot)?;
        Ok(simulation)
    }

    /// Executes a command, appending every resulting event to `out`.
    pub fn apply(&mut self, command: Command, out: &mut Vec<Event>) {
        match command {
            Command::PlaceBuilding { kind, origin } => {
                let _ = self.try_place(kind, origin, out);
            }
            Command::RemoveBuilding { cell } => {
                let _ = self.remove_at(cell, out);
            }
            Command::Tick => {
                let _ = self.tick(out);
            }
            Command::Frame { dt } => {
                let _ = self.frame(dt, out);
            }
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Restart => self.restart(),
        }
    }

    /// Attempts to place a building, paying for it from the treasury.
    ///
    /// Returns `false` and leaves all state untouched when the footprint is
    /// invalid, gold is short, or the session is over.
    pub fn try_place(
        &mut self,
        kind: BuildingKind,
        origin: CellCoord,
        out: &mut Vec<Event>,
    ) -> bool {
        let placed = if self.session_over {
            Err(PlacementError::SessionOver)
        } else {
            self.world.place(kind, origin, &mut self.resources.gold)
        };

        match placed {
            Ok(record) => {
                out.push(Event::BuildingPlaced {
                    kind: record.kind,
                    origin: record.origin,
                });
                true
            }
            Err(reason) => {
                out.push(Event::PlacementRejected {
                    kind,
                    origin,
                    reason,
                });
                false
            }
        }
    }

    /// Removes the building covering `cell`.
    ///
    /// Empty cells and the capital are ignored, as is everything once the
    /// session is over. Removal refunds nothing.
    pub fn remove_at(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> bool {
        if self.session_over {
            return false;
        }
        let Some(record) = self.world.remove_at(cell) else {
            return false;
        };
        out.push(Event::BuildingRemoved {
            kind: record.kind,
            origin: record.origin,
        });
        true
    }

    /// Runs exactly one simulation tick.
    ///
    /// Ticks run even while paused so a stopped session can be stepped; once
    /// the capital has fallen nothing changes until [`Simulation::restart`].
    pub fn tick(&mut self, out: &mut Vec<Event>) -> TickReport {
        if self.session_over {
            return self.report(0, 0);
        }

        self.tick += 1;
        self.world.grid_mut().age_services();
        if self.world.refresh_connectivity() {
            debug!(
                tick = self.tick,
                reachable = self.world.road_network().len(),
                "road network recomputed"
            );
        }

        let active: Vec<BuildingRecord> = self
            .world
            .buildings()
            .filter(|building| !building.kind.is_connective() && self.world.is_connected(building))
            .copied()
            .collect();
        let farms = active
            .iter()
            .filter(|building| building.kind == BuildingKind::Farm)
            .count();
        let farms = u32::try_from(farms).unwrap_or(u32::MAX);

        let food_delta = economy::food_delta(&self.config, farms, self.resources.population);
        self.resources.food = self.resources.food.saturating_add(food_delta);

        self.spawn_agents(&active, out);
        self.agents.age(out);

        let outcome = self
            .invasion
            .tick(&mut self.world, &self.config, &mut self.rng, out);
        if outcome.capital_destroyed {
            warn!(tick = self.tick, wave = self.invasion.schedule().wave, "session over");
            self.session_over = true;
            self.score.waves_survived = self.invasion.schedule().wave;
            return self.report(0, food_delta);
        }

        self.combat
            .resolve_melee(&mut self.agents, &mut self.invasion, &self.config, out);
        let towers: Vec<CellCoord> = active
            .iter()
            .filter(|building| building.kind == BuildingKind::Tower)
            .map(|building| building.origin)
            .filter(|cell| {
                self.world
                    .grid()
                    .tile(*cell)
                    .is_some_and(|tile| tile.holds(BuildingKind::Tower))
            })
            .collect();
        self.combat
            .fire_towers(&towers, &mut self.invasion, &self.config, out);

        let serviced = world_query::fully_serviced_houses(&self.world);
        self.resources.max_population = economy::capacity(&self.config, serviced);
        self.resources.population = economy::adjust_population(
            &self.config,
            self.resources.population,
            self.resources.max_population,
            self.resources.food,
        );

        let tax = economy::tax(&self.config, self.resources.population);
        if tax > 0 {
            self.resources.gold = self.resources.gold.saturating_add(tax);
            out.push(Event::TaxCollected { amount: tax });
        }

        self.score.peak_population = self.score.peak_population.max(self.resources.population);
        self.score.waves_survived = self.invasion.schedule().wave;
        self.score.gold_earned = self.score.gold_earned.saturating_add(u64::from(tax));

        self.report(tax, food_delta)
    }

    /// Advances wall-clock time by `dt`.
    ///
    /// Runs every tick that falls due, then interpolates agents and invaders.
    /// Returns the number of ticks run. Nothing happens while paused or once
    /// the session is over.
    pub fn frame(&mut self, dt: Duration, out: &mut Vec<Event>) -> u32 {
        if self.paused || self.session_over {
            return 0;
        }

        let interval = self.config.tick_interval();
        self.accumulator = self.accumulator.saturating_add(dt);
        let mut ran = 0;
        while self.accumulator >= interval {
            self.accumulator -= interval;
            let _ = self.tick(out);
            ran += 1;
            if self.session_over {
                self.accumulator = Duration::ZERO;
                return ran;
            }
        }

        let invaders = self.invasion.live_cells();
        self.agents.advance_frame(
            dt,
            self.world.grid_mut(),
            &invaders,
            &self.config,
            &mut self.rng,
        );
        self.invasion
            .advance_frame(dt, self.world.grid(), &self.config);
        ran
    }

    /// Suspends both cadences.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes both cadences without catching up on the time spent paused.
    pub fn resume(&mut self) {
        self.paused = false;
        self.accumulator = Duration::ZERO;
    }

    /// Resets every piece of mutable state to a capital-only grid.
    pub fn restart(&mut self) {
        info!(grid_size = self.config.grid_size, "session restarted");
        self.world = World::new(self.config.grid_size);
        self.agents.clear();
        self.invasion = Invasion::new(&self.config);
        self.resources = Resources::opening(&self.config);
        self.score = Score::default();
        self.tick = 0;
        self.accumulator = Duration::ZERO;
        self.paused = false;
        self.session_over = false;
    }

    /// Captures the persisted state at the current tick boundary.
    #[must_use]
    pub fn snapshot(&self) -> SaveSnapshot {
        SaveSnapshot {
            schema_version: SCHEMA_VERSION,
            timestamp: Utc::now(),
            grid_size: self.world.grid().size(),
            tiles: world_query::grid_snapshot(&self.world),
            resources: self.resources,
            score: self.score,
            tick: self.tick,
            invasion: self.invasion.schedule(),
        }
    }

    /// Replaces the session state with a snapshot.
    ///
    /// On error the session is left untouched.
    pub fn restore(&mut self, snapshot: SaveSnapshot) -> Result<(), SnapshotError> {
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(SnapshotError::SchemaMismatch(snapshot.schema_version));
        }
        let world = World::from_tiles(snapshot.grid_size, snapshot.tiles)
            .ok_or(SnapshotError::CorruptGrid)?;

        self.session_over = world.capital().is_none();
        self.world = world;
        self.agents.clear();
        self.invasion = Invasion::from_schedule(snapshot.invasion);
        self.resources = snapshot.resources;
        self.score = snapshot.score;
        self.tick = snapshot.tick;
        self.accumulator = Duration::ZERO;
        self.paused = false;
        Ok(())
    }

    /// Loads an encoded snapshot, treating any failure as "no usable save".
    ///
    /// Returns `true` when the snapshot was applied.
    pub fn load(&mut self, encoded: &str) -> bool {
        match SaveSnapshot::decode(encoded).and_then(|snapshot| self.restore(snapshot)) {
            Ok(()) => {
                info!(tick = self.tick, "snapshot loaded");
                true
            }
            Err(error) => {
                warn!(%error, "ignoring unusable snapshot");
                false
            }
        }
    }

    /// Tuning the session runs with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for editors and scripted setups.
    ///
    /// Changes made here bypass the treasury.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Live agents.
    #[must_use]
    pub fn agents(&self) -> &Agents {
        &self.agents
    }

    /// Invaders and the wave schedule.
    #[must_use]
    pub fn invasion(&self) -> &Invasion {
        &self.invasion
    }

    /// Current treasury, granary and population.
    #[must_use]
    pub fn resources(&self) -> Resources {
        self.resources
    }

    /// Current score aggregates.
    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    /// Current wave number and countdown.
    #[must_use]
    pub fn schedule(&self) -> InvasionSchedule {
        self.invasion.schedule()
    }

    /// Number of ticks simulated since the session started.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Reports whether both cadences are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether the capital has fallen.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.session_over
    }

    fn spawn_agents(&mut self, active: &[BuildingRecord], out: &mut Vec<Event>) {
        for building in active {
            let Some(kind) = building.kind.spawned_agent() else {
                continue;
            };
            let Some(cadence) = self.config.spawn_cadence(building.kind) else {
                continue;
            };
            if self.tick % u64::from(cadence) != 0 {
                continue;
            }
            let _ = self.agents.spawn(
                &self.world,
                kind,
                building,
                &self.config,
                &mut self.rng,
                out,
            );
        }
    }

    fn report(&self, tax_collected: u32, food_delta: i64) -> TickReport {
        TickReport {
            tick: self.tick,
            tax_collected,
            food_delta,
            population: self.resources.population,
            session_over: self.session_over,
        }
    }
}
