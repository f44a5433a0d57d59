#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Invasion engine: wave scheduling, invader routing and building attacks.
//!
//! Invaders follow a breadth-first route to the capital. Arriving on a cell
//! that holds any building other than a road switches the invader to
//! attacking; once the building falls it walks on along a fresh route.
//! Scheduling and attacks run on the tick cadence, walking on the frame
//! cadence.

mod routing;
mod waves;

use std::time::Duration;

use forum_defence_core::{
    BuildingKind, CellCoord, Event, InvaderId, InvaderState, InvasionSchedule, RandomSource,
    SimulationConfig,
};
use forum_defence_world::{BuildingRecord, DamageOutcome, Grid, World};
use tracing::{debug, info};

pub use routing::{find_path_with, route};
pub use waves::{invader_damage, invader_hit_points, wave_interval, wave_size};

/// A hostile unit marching on the capital.
#[derive(Clone, Debug, PartialEq)]
pub struct Invader {
    id: InvaderId,
    current: CellCoord,
    target: CellCoord,
    progress: f32,
    hit_points: u32,
    max_hit_points: u32,
    damage: u32,
    state: InvaderState,
    path: Vec<CellCoord>,
    path_index: usize,
    cooldown: u32,
}

impl Invader {
    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> InvaderId {
        self.id
    }

    /// Cell the invader last arrived at.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.current
    }

    /// Cell the invader is walking toward.
    #[must_use]
    pub const fn target(&self) -> CellCoord {
        self.target
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hit_points(&self) -> u32 {
        self.hit_points
    }

    /// Hit points at spawn.
    #[must_use]
    pub const fn max_hit_points(&self) -> u32 {
        self.max_hit_points
    }

    /// Damage dealt per hit against buildings and soldiers.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Current state of the invader.
    #[must_use]
    pub const fn state(&self) -> InvaderState {
        self.state
    }

    /// Ticks left before the next building hit.
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Reports whether the invader has not been killed.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != InvaderState::Dead
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

    fn set_route(&mut self, path: Vec<CellCoord>) {
        self.target = path.first().copied().unwrap_or(self.current);
        self.path = path;
        self.path_index = 0;
        self.progress = 0.0;
    }

    fn start_attacking(&mut self) {
        self.state = InvaderState::Attacking;
        self.cooldown = 1;
        self.target = self.current;
        self.progress = 0.0;
    }
}

/// Signals raised by one invasion tick that the orchestrator must act on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvasionOutcome {
    /// Buildings destroyed this tick; their tiles are already cleared.
    pub destroyed: Vec<BuildingRecord>,
    /// The capital fell; the session is over.
    pub capital_destroyed: bool,
}

/// Wave schedule plus every invader currently on the map.
#[derive(Clone, Debug)]
pub struct Invasion {
    invaders: Vec<Invader>,
    next_invader_id: u32,
    wave: u32,
    ticks_until_next_wave: u32,
    warning: bool,
}

impl Invasion {
    /// Creates an invasion with no invaders and the opening delay armed.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self::from_schedule(InvasionSchedule {
            wave: 0,
            ticks_until_next_wave: config.first_wave_delay_ticks,
        })
    }

    /// Resumes a persisted schedule with an empty battlefield.
    #[must_use]
    pub fn from_schedule(schedule: InvasionSchedule) -> Self {
        Self {
            invaders: Vec::new(),
            next_invader_id: 0,
            wave: schedule.wave,
            ticks_until_next_wave: schedule.ticks_until_next_wave,
            warning: false,
        }
    }

    /// Current wave number and countdown.
    #[must_use]
    pub const fn schedule(&self) -> InvasionSchedule {
        InvasionSchedule {
            wave: self.wave,
            ticks_until_next_wave: self.ticks_until_next_wave,
        }
    }

    /// Reports whether the next wave is inside the warning window.
    #[must_use]
    pub const fn warning(&self) -> bool {
        self.warning
    }

    /// Runs one simulation tick: schedule, attacks, then the dead sweep.
    pub fn tick<R: RandomSource>(
        &mut self,
        world: &mut World,
        config: &SimulationConfig,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> InvasionOutcome {
        self.advance_schedule(world, config, rng, out);
        let outcome = self.resolve_attacks(world, config, out);
        self.invaders.retain(Invader::is_alive);
        outcome
    }

    /// Advances every moving invader toward its next waypoint.
    ///
    /// Arrival on a cell holding a building other than a road starts an
    /// attack that fires on the next tick.
    pub fn advance_frame(&mut self, dt: Duration, grid: &Grid, config: &SimulationConfig) {
        let step = dt.as_secs_f32() * config.invader_speed;
        if step <= 0.0 {
            return;
        }

        for invader in &mut self.invaders {
            if invader.state != InvaderState::Moving || invader.target == invader.current {
                continue;
            }
            invader.progress += step;
            if invader.progress < 1.0 {
                continue;
            }

            invader.current = invader.target;
            invader.progress = 0.0;
            if holds_target(grid, invader.current) {
                invader.start_attacking();
                continue;
            }
            invader.path_index += 1;
            invader.target = invader
                .path
                .get(invader.path_index)
                .copied()
                .unwrap_or(invader.current);
        }
    }

    /// Places one invader with the provided strength at `cell`.
    ///
    /// The invader is routed to the capital, or starts attacking at once
    /// when it lands on a building.
    pub fn spawn_invader(
        &mut self,
        world: &World,
        cell: CellCoord,
        hit_points: u32,
        damage: u32,
    ) -> InvaderId {
        let id = InvaderId::new(self.next_invader_id);
        self.next_invader_id = self.next_invader_id.wrapping_add(1);

        let mut invader = Invader {
            id,
            current: cell,
            target: cell,
            progress: 0.0,
            hit_points,
            max_hit_points: hit_points,
            damage,
            state: InvaderState::Moving,
            path: Vec::new(),
            path_index: 0,
            cooldown: 0,
        };
        if holds_target(world.grid(), cell) {
            invader.start_attacking();
        } else {
            invader.set_route(route(world.grid().size(), cell, &world.capital_cells()));
        }

        self.invaders.push(invader);
        id
    }

    /// Nearest live invader within `max_range` Manhattan steps of `cell`.
    ///
    /// Ties keep the earliest spawned invader.
    #[must_use]
    pub fn find_nearest(&self, cell: CellCoord, max_range: u32) -> Option<&Invader> {
        self.invaders
            .iter()
            .filter(|invader| invader.is_alive())
            .map(|invader| (cell.manhattan_distance(invader.current), invader))
            .filter(|(distance, _)| *distance <= max_range)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, invader)| invader)
    }

    /// Applies damage, marking the invader dead at zero hit points.
    ///
    /// Returns `true` only for the hit that killed it.
    pub fn damage(&mut self, id: InvaderId, amount: u32) -> bool {
        let Some(invader) = self
            .invaders
            .iter_mut()
            .find(|invader| invader.id == id && invader.is_alive())
        else {
            return false;
        };
        invader.hit_points = invader.hit_points.saturating_sub(amount);
        if invader.hit_points == 0 {
            invader.state = InvaderState::Dead;
            return true;
        }
        false
    }

    /// Invader with the provided identifier, dead or alive.
    #[must_use]
    pub fn get(&self, id: InvaderId) -> Option<&Invader> {
        self.invaders.iter().find(|invader| invader.id == id)
    }

    /// Iterates over every invader still on the map.
    pub fn iter(&self) -> impl Iterator<Item = &Invader> {
        self.invaders.iter()
    }

    /// Cells occupied by live invaders.
    #[must_use]
    pub fn live_cells(&self) -> Vec<CellCoord> {
        self.invaders
            .iter()
            .filter(|invader| invader.is_alive())
            .map(|invader| invader.current)
            .collect()
    }

    /// Number of invaders on the map, including those killed this tick.
    #[must_use]
    pub fn len(&self) -> usize {
        self.invaders.len()
    }

    /// Reports whether the map holds no invader.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invaders.is_empty()
    }

    fn advance_schedule<R: RandomSource>(
        &mut self,
        world: &World,
        config: &SimulationConfig,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        self.ticks_until_next_wave = self.ticks_until_next_wave.saturating_sub(1);

        if self.ticks_until_next_wave > 0 {
            if !self.warning && self.ticks_until_next_wave <= config.wave_warning_ticks {
                self.warning = true;
                info!(
                    wave = self.wave + 1,
                    ticks = self.ticks_until_next_wave,
                    "invaders sighted"
                );
                out.push(Event::WaveWarning {
                    wave: self.wave + 1,
                    ticks_remaining: self.ticks_until_next_wave,
                });
            }
            return;
        }

        self.wave = self.wave.saturating_add(1);
        self.warning = false;
        self.ticks_until_next_wave = wave_interval(config, self.wave);

        let count = wave_size(config, self.wave);
        let hit_points = invader_hit_points(config, self.wave);
        let damage = invader_damage(config, self.wave);
        let size = world.grid().size();
        let edge = rng.index(4);
        for _ in 0..count {
            let Some(cell) = edge_cell(size, edge, rng.offset(config.spawn_jitter)) else {
                break;
            };
            let _ = self.spawn_invader(world, cell, hit_points, damage);
        }

        info!(wave = self.wave, invaders = count, edge, "wave started");
        out.push(Event::WaveStarted {
            wave: self.wave,
            invaders: count,
        });
    }

    fn resolve_attacks(
        &mut self,
        world: &mut World,
        config: &SimulationConfig,
        out: &mut Vec<Event>,
    ) -> InvasionOutcome {
        let mut outcome = InvasionOutcome::default();
        let goals_size = world.grid().size();

        for invader in &mut self.invaders {
            if invader.state != InvaderState::Attacking {
                continue;
            }
            invader.cooldown = invader.cooldown.saturating_sub(1);
            if invader.cooldown > 0 {
                continue;
            }

            match world.damage_at(invader.current, invader.damage) {
                Some(DamageOutcome::Damaged {
                    building,
                    hit_points,
                }) => {
                    invader.cooldown = config.attack_cooldown_ticks.max(1);
                    out.push(Event::BuildingDamaged {
                        kind: building.kind,
                        origin: building.origin,
                        hit_points,
                        max_hit_points: building.kind.max_hit_points(),
                    });
                }
                Some(DamageOutcome::Destroyed(building)) => {
                    debug!(kind = ?building.kind, origin = ?building.origin, "building razed");
                    out.push(Event::BuildingDestroyed {
                        kind: building.kind,
                        origin: building.origin,
                    });
                    outcome.destroyed.push(building);
                    invader.state = InvaderState::Moving;
                    invader.set_route(route(goals_size, invader.current, &world.capital_cells()));
                }
                Some(DamageOutcome::CapitalDestroyed(_)) => {
                    out.push(Event::CapitalDestroyed);
                    outcome.capital_destroyed = true;
                    return outcome;
                }
                None => {
                    invader.state = InvaderState::Moving;
                    invader.set_route(route(goals_size, invader.current, &world.capital_cells()));
                }
            }
        }

        outcome
    }
}

/// Reports whether the cell holds a building invaders must break through.
fn holds_target(grid: &Grid, cell: CellCoord) -> bool {
    grid.tile(cell)
        .and_then(|tile| tile.kind())
        .is_some_and(|kind| kind != BuildingKind::Road)
}

/// Spawn cell on edge `edge` (north, east, south, west) offset from its midpoint.
fn edge_cell(size: u32, edge: usize, offset: i32) -> Option<CellCoord> {
    let last = size.checked_sub(1)?;
    let along = i64::from(size / 2) + i64::from(offset);
    let along = u32::try_from(along.clamp(0, i64::from(last))).ok()?;
    let cell = match edge {
        0 => CellCoord::new(along, 0),
        1 => CellCoord::new(last, along),
        2 => CellCoord::new(along, last),
        _ => CellCoord::new(0, along),
    };
    Some(cell)
}
