//! Tuning knobs for every fixed constant the simulation relies on.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::BuildingKind;

/// Aggregated tuning knobs controlling the economy, agents and invasion.
///
/// Every field has a reference default, and deserialisation fills missing
/// keys from those defaults so partial configuration files stay valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of cells along each edge of the square grid.
    pub grid_size: u32,
    /// Length of one simulation tick in milliseconds.
    pub tick_interval_ms: u64,
    /// Gold in the treasury at the start of a session.
    pub starting_gold: u32,
    /// Food in the granary at the start of a session.
    pub starting_food: i64,
    /// Population at the start of a session.
    pub starting_population: u32,
    /// Population each fully serviced house supports.
    pub house_capacity: u32,
    /// Ticks a delivered service stays active on a house.
    pub service_duration_ticks: u32,
    /// Ticks a service walker or farmer lives.
    pub walker_lifespan_ticks: u32,
    /// Ticks a soldier lives.
    pub soldier_lifespan_ticks: u32,
    /// Hit points of a freshly spawned soldier.
    pub soldier_hit_points: u32,
    /// Damage a soldier deals per melee exchange.
    pub soldier_damage: u32,
    /// Manhattan radius around the barracks soldiers patrol within.
    pub patrol_radius: u32,
    /// Manhattan range within which soldiers look for melee opponents.
    pub engagement_range: u32,
    /// Agent walking speed in tiles per second.
    pub agent_speed: f32,
    /// Invader walking speed in tiles per second.
    pub invader_speed: f32,
    /// Food produced by each connected farm per tick.
    pub farm_food_per_tick: i64,
    /// Food eaten by each citizen per tick.
    pub food_per_citizen: i64,
    /// Citizens gained per tick while fed and under capacity.
    pub growth_per_tick: u32,
    /// Citizens lost per tick while starving or over capacity.
    pub shrink_per_tick: u32,
    /// Percentage of the population collected as gold each tick.
    pub tax_percent: u32,
    /// Tick modulo at which connected wells send a water carrier.
    pub well_cadence: u32,
    /// Tick modulo at which connected markets send a food carrier.
    pub market_cadence: u32,
    /// Tick modulo at which connected farms send a farmer.
    pub farm_cadence: u32,
    /// Tick modulo at which connected barracks send a soldier.
    pub barracks_cadence: u32,
    /// Manhattan range of tower fire.
    pub tower_range: u32,
    /// Damage a tower deals per shot.
    pub tower_damage: u32,
    /// Ticks before the first wave.
    pub first_wave_delay_ticks: u32,
    /// Interval between waves before any shrinking.
    pub wave_interval_base: u32,
    /// Ticks removed from the interval per wave survived.
    pub wave_interval_step: u32,
    /// Shortest interval the schedule ever shrinks to.
    pub wave_interval_floor: u32,
    /// Countdown at or below which the wave warning is raised.
    pub wave_warning_ticks: u32,
    /// Invaders in the first wave.
    pub wave_size_base: f32,
    /// Invaders added per subsequent wave.
    pub wave_size_per_wave: f32,
    /// Invader hit points in the first wave.
    pub invader_hit_points_base: f32,
    /// Invader hit points added per subsequent wave.
    pub invader_hit_points_per_wave: f32,
    /// Invader damage per hit in the first wave.
    pub invader_damage_base: f32,
    /// Invader damage added per subsequent wave.
    pub invader_damage_per_wave: f32,
    /// Largest offset from the edge midpoint an invader spawns at.
    pub spawn_jitter: u32,
    /// Ticks between consecutive invader hits on a building.
    pub attack_cooldown_ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: 32,
            tick_interval_ms: 1_000,
            starting_gold: 500,
            starting_food: 60,
            starting_population: 0,
            house_capacity: 10,
            service_duration_ticks: 10,
            walker_lifespan_ticks: 30,
            soldier_lifespan_ticks: 60,
            soldier_hit_points: 20,
            soldier_damage: 4,
            patrol_radius: 4,
            engagement_range: 8,
            agent_speed: 2.0,
            invader_speed: 1.0,
            farm_food_per_tick: 12,
            food_per_citizen: 1,
            growth_per_tick: 1,
            shrink_per_tick: 2,
            tax_percent: 10,
            well_cadence: 5,
            market_cadence: 6,
            farm_cadence: 8,
            barracks_cadence: 15,
            tower_range: 5,
            tower_damage: 3,
            first_wave_delay_ticks: 120,
            wave_interval_base: 90,
            wave_interval_step: 5,
            wave_interval_floor: 30,
            wave_warning_ticks: 10,
            wave_size_base: 3.0,
            wave_size_per_wave: 1.5,
            invader_hit_points_base: 8.0,
            invader_hit_points_per_wave: 2.0,
            invader_damage_base: 2.0,
            invader_damage_per_wave: 0.5,
            spawn_jitter: 3,
            attack_cooldown_ticks: 2,
        }
    }
}

impl SimulationConfig {
    /// Length of one simulation tick.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Tick modulo at which an active building of `kind` sends out its agent.
    ///
    /// Kinds without an agent, and cadences configured as zero, never spawn.
    #[must_use]
    pub fn spawn_cadence(&self, kind: BuildingKind) -> Option<u32> {
        let cadence = match kind {
            BuildingKind::Well => self.well_cadence,
            BuildingKind::Market => self.market_cadence,
            BuildingKind::Farm => self.farm_cadence,
            BuildingKind::Barracks => self.barracks_cadence,
            _ => return None,
        };
        (cadence > 0).then_some(cadence)
    }

    /// Lifespan in ticks granted to a freshly spawned agent of the given family.
    #[must_use]
    pub const fn lifespan_ticks(&self, road_bound: bool) -> u32 {
        if road_bound {
            self.walker_lifespan_ticks
        } else {
            self.soldier_lifespan_ticks
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_producers_have_a_cadence() {
        let config = SimulationConfig::default();
        assert_eq!(config.spawn_cadence(BuildingKind::Well), Some(5));
        assert_eq!(config.spawn_cadence(BuildingKind::Barracks), Some(15));
        assert_eq!(config.spawn_cadence(BuildingKind::House), None);
        assert_eq!(config.spawn_cadence(BuildingKind::Tower), None);
    }

    #[test]
    fn zero_cadence_disables_spawning() {
        let config = SimulationConfig {
            well_cadence: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.spawn_cadence(BuildingKind::Well), None);
    }

    #[test]
    fn zero_tick_interval_is_clamped() {
        let config = SimulationConfig {
            tick_interval_ms: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }
}
