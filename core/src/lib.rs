#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Forum Defence simulation.
//!
//! This crate defines the vocabulary every other crate speaks: grid cells,
//! the static building catalog, agent and invader kinds, the commands
//! collaborators submit, and the events the simulation broadcasts back.
//! Nothing in here owns mutable game state; the authoritative grid lives in
//! the world crate and the mobile entities live in their respective systems.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod config;
mod random;

pub use config::SimulationConfig;
pub use random::{RandomSource, SequenceRandom};

/// Location of a single grid cell expressed as `x` and `z` coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    z: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }

    /// Offsets the cell by the provided signed delta, staying inside a square
    /// grid of `size` cells per side.
    #[must_use]
    pub fn offset(self, dx: i32, dz: i32, size: u32) -> Option<CellCoord> {
        let x = self.x.checked_add_signed(dx)?;
        let z = self.z.checked_add_signed(dz)?;
        if x < size && z < size {
            Some(CellCoord::new(x, z))
        } else {
            None
        }
    }

    /// Enumerates the in-bounds 4-connected neighbours of the cell.
    ///
    /// Neighbours are yielded north, east, south, west so every caller walks
    /// them in the same order.
    pub fn neighbors(self, size: u32) -> impl Iterator<Item = CellCoord> {
        [(0, -1), (1, 0), (0, 1), (-1, 0)]
            .into_iter()
            .filter_map(move |(dx, dz)| self.offset(dx, dz, size))
    }
}

/// Unique identifier assigned to a placed building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a walker or soldier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an invader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvaderId(u32);

impl InvaderId {
    /// Creates a new invader identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Closed catalog of building kinds that may occupy grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Connective road tile walked by service walkers.
    Road,
    /// Dwelling whose capacity depends on water and food service.
    House,
    /// Food producer that also sends out farmers.
    Farm,
    /// Source of water carriers.
    Well,
    /// Source of food carriers.
    Market,
    /// Source of soldiers.
    Barracks,
    /// Fortification that invaders must break through.
    Wall,
    /// Fortification that fires at nearby invaders every tick.
    Tower,
    /// Forum at the root of the road network; losing it ends the session.
    Capital,
}

impl BuildingKind {
    /// Every kind in catalog order.
    pub const ALL: [BuildingKind; 9] = [
        Self::Road,
        Self::House,
        Self::Farm,
        Self::Well,
        Self::Market,
        Self::Barracks,
        Self::Wall,
        Self::Tower,
        Self::Capital,
    ];

    /// Edge length of the square footprint measured in cells.
    #[must_use]
    pub const fn footprint(self) -> u32 {
        match self {
            Self::Farm | Self::Market | Self::Barracks | Self::Capital => 2,
            Self::Road | Self::House | Self::Well | Self::Wall | Self::Tower => 1,
        }
    }

    /// Gold deducted when the building is placed.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Road => 5,
            Self::House => 20,
            Self::Farm => 40,
            Self::Well => 25,
            Self::Market => 50,
            Self::Barracks => 80,
            Self::Wall => 10,
            Self::Tower => 60,
            Self::Capital => 0,
        }
    }

    /// Hit points a freshly placed building starts with.
    #[must_use]
    pub const fn max_hit_points(self) -> u32 {
        match self {
            Self::Road => 20,
            Self::House => 50,
            Self::Farm => 60,
            Self::Well => 40,
            Self::Market => 60,
            Self::Barracks => 100,
            Self::Wall => 150,
            Self::Tower => 120,
            Self::Capital => 500,
        }
    }

    /// Reports whether the kind belongs to the connective road/plaza network.
    #[must_use]
    pub const fn is_connective(self) -> bool {
        matches!(self, Self::Road | Self::Capital)
    }

    /// Reports whether the kind is a wall or tower.
    #[must_use]
    pub const fn is_fortification(self) -> bool {
        matches!(self, Self::Wall | Self::Tower)
    }

    /// Agent kind periodically sent out by an active building of this kind.
    #[must_use]
    pub const fn spawned_agent(self) -> Option<AgentKind> {
        match self {
            Self::Well => Some(AgentKind::WaterCarrier),
            Self::Market => Some(AgentKind::FoodCarrier),
            Self::Farm => Some(AgentKind::Farmer),
            Self::Barracks => Some(AgentKind::Soldier),
            Self::Road | Self::House | Self::Wall | Self::Tower | Self::Capital => None,
        }
    }
}

/// Timed services a house needs to reach its capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Service {
    /// Delivered by water carriers.
    Water,
    /// Delivered by food carriers.
    Food,
}

/// Kinds of mobile agents other than invaders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// Road-bound walker refreshing the water service of nearby houses.
    WaterCarrier,
    /// Road-bound walker refreshing the food service of nearby houses.
    FoodCarrier,
    /// Road-bound producer walker without a delivery.
    Farmer,
    /// Free-roaming melee unit that hunts invaders.
    Soldier,
}

impl AgentKind {
    /// Service refreshed by the agent when it passes a house.
    #[must_use]
    pub const fn service(self) -> Option<Service> {
        match self {
            Self::WaterCarrier => Some(Service::Water),
            Self::FoodCarrier => Some(Service::Food),
            Self::Farmer | Self::Soldier => None,
        }
    }

    /// Reports whether the agent may only walk on road or plaza cells.
    #[must_use]
    pub const fn is_road_bound(self) -> bool {
        !matches!(self, Self::Soldier)
    }
}

/// Lifecycle of a single invader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvaderState {
    /// Walking along its planned path toward the capital.
    Moving,
    /// Hitting the building occupying its cell.
    Attacking,
    /// Killed; removed at the end of the tick.
    Dead,
}

/// Reasons a placement request may be rejected by the construction manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested footprint extends beyond the grid.
    #[error("footprint extends beyond the grid")]
    OutOfBounds,
    /// The requested footprint overlaps an occupied cell.
    #[error("footprint overlaps an occupied cell")]
    Occupied,
    /// The treasury holds less gold than the building costs.
    #[error("not enough gold for the building")]
    InsufficientFunds,
    /// A capital already stands on the grid.
    #[error("a capital already stands on the grid")]
    DuplicateCapital,
    /// The capital fell and the session awaits a restart.
    #[error("the session is over until restart")]
    SessionOver,
}

/// Commands that express every mutation collaborators may request.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Attempts to place a building anchored at the provided origin cell.
    PlaceBuilding {
        /// Kind of building to construct.
        kind: BuildingKind,
        /// Upper-left cell of the footprint.
        origin: CellCoord,
    },
    /// Removes whichever building covers the provided cell.
    RemoveBuilding {
        /// Any cell of the targeted footprint.
        cell: CellCoord,
    },
    /// Advances the simulation by exactly one tick.
    Tick,
    /// Advances the frame clock, running any ticks that fall due first.
    Frame {
        /// Wall-clock time elapsed since the previous frame.
        dt: Duration,
    },
    /// Suspends both the tick and frame cadences.
    Pause,
    /// Resumes play with a fresh tick accumulator.
    Resume,
    /// Clears every mutable state back to the capital-only grid.
    Restart,
}

/// Events broadcast by the simulation so collaborators can react without polling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a building was placed.
    BuildingPlaced {
        /// Kind of building placed.
        kind: BuildingKind,
        /// Upper-left cell of the footprint.
        origin: CellCoord,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Kind of building requested.
        kind: BuildingKind,
        /// Origin provided with the request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a building was removed by request.
    BuildingRemoved {
        /// Kind of building removed.
        kind: BuildingKind,
        /// Upper-left cell of the former footprint.
        origin: CellCoord,
    },
    /// Reports that invaders damaged a building without destroying it.
    BuildingDamaged {
        /// Kind of building hit.
        kind: BuildingKind,
        /// Upper-left cell of the footprint.
        origin: CellCoord,
        /// Hit points left after the hit.
        hit_points: u32,
        /// Hit points the building started with.
        max_hit_points: u32,
    },
    /// Reports that invaders destroyed a building.
    BuildingDestroyed {
        /// Kind of building destroyed.
        kind: BuildingKind,
        /// Upper-left cell of the former footprint.
        origin: CellCoord,
    },
    /// Gold collected from the population this tick.
    TaxCollected {
        /// Amount of gold added to the treasury.
        amount: u32,
    },
    /// The next wave is about to start.
    WaveWarning {
        /// Number the upcoming wave will carry.
        wave: u32,
        /// Ticks left before it spawns.
        ticks_remaining: u32,
    },
    /// A wave of invaders spawned.
    WaveStarted {
        /// Number of the wave that spawned.
        wave: u32,
        /// Invaders spawned for the wave.
        invaders: u32,
    },
    /// A service walker, producer or soldier left its building.
    AgentSpawned {
        /// Identifier assigned to the agent.
        agent: AgentId,
        /// Kind of agent spawned.
        kind: AgentKind,
        /// Cell the agent starts on.
        cell: CellCoord,
    },
    /// An agent ran out of lifespan.
    AgentExpired {
        /// Identifier of the expired agent.
        agent: AgentId,
    },
    /// A soldier and an invader exchanged melee blows.
    SoldierHit {
        /// Soldier taking part in the exchange.
        agent: AgentId,
        /// Invader taking part in the exchange.
        invader: InvaderId,
        /// Cell the invader stood on.
        cell: CellCoord,
    },
    /// A soldier was killed in melee.
    SoldierFell {
        /// Identifier of the fallen soldier.
        agent: AgentId,
    },
    /// A tower fired at an invader.
    TowerFired {
        /// Cell of the tower.
        from: CellCoord,
        /// Cell of the invader that was hit.
        to: CellCoord,
    },
    /// An invader was killed.
    InvaderKilled {
        /// Identifier of the killed invader.
        invader: InvaderId,
        /// Cell the invader died on.
        cell: CellCoord,
    },
    /// The capital fell; the session is over until restart.
    CapitalDestroyed,
}

/// Treasury, granary and population counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Gold available for construction.
    pub gold: u32,
    /// Food stock; negative values mean the city is starving.
    pub food: i64,
    /// Current population.
    pub population: u32,
    /// Capacity derived each tick from fully serviced houses.
    pub max_population: u32,
}

impl Resources {
    /// Creates the opening resource state described by the configuration.
    #[must_use]
    pub fn opening(config: &SimulationConfig) -> Self {
        Self {
            gold: config.starting_gold,
            food: config.starting_food,
            population: config.starting_population,
            max_population: 0,
        }
    }
}

/// Monotonic score aggregates reset only by an explicit restart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Highest population ever reached.
    pub peak_population: u32,
    /// Waves survived, equal to the current wave number.
    pub waves_survived: u32,
    /// Gold collected in taxes over the whole session.
    pub gold_earned: u64,
}

/// Persisted progress of the invasion schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvasionSchedule {
    /// Number of the most recent wave; zero before the first wave.
    pub wave: u32,
    /// Ticks left before the next wave spawns.
    pub ticks_until_next_wave: u32,
}
