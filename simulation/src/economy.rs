//! Pure economic rules applied once per tick.

use forum_defence_core::SimulationConfig;

/// Net change of the food stock: production minus consumption.
#[must_use]
pub fn food_delta(config: &SimulationConfig, active_farms: u32, population: u32) -> i64 {
    let produced = i64::from(active_farms).saturating_mul(config.farm_food_per_tick);
    let eaten = i64::from(population).saturating_mul(config.food_per_citizen);
    produced.saturating_sub(eaten)
}

/// Population ceiling granted by fully serviced houses.
#[must_use]
pub fn capacity(config: &SimulationConfig, serviced_houses: u32) -> u32 {
    config.house_capacity.saturating_mul(serviced_houses)
}

/// Moves the population one step toward `capacity`.
///
/// A negative food stock shrinks the population at the fixed rate down to
/// zero. Otherwise a surplus grows it up to capacity, and a population above
/// capacity shrinks at the fixed rate without dropping below it.
#[must_use]
pub fn adjust_population(
    config: &SimulationConfig,
    population: u32,
    capacity: u32,
    food: i64,
) -> u32 {
    if food < 0 {
        return population.saturating_sub(config.shrink_per_tick);
    }
    if population > capacity {
        return population
            .saturating_sub(config.shrink_per_tick)
            .max(capacity);
    }
    if food > 0 && population < capacity {
        return population.saturating_add(config.growth_per_tick).min(capacity);
    }
    population
}

/// Gold collected from the population this tick, rounded down.
#[must_use]
pub fn tax(config: &SimulationConfig, population: u32) -> u32 {
    let collected = u64::from(population) * u64::from(config.tax_percent) / 100;
    u32::try_from(collected).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starvation_shrinks_at_the_fixed_rate() {
        let config = SimulationConfig::default();
        assert_eq!(adjust_population(&config, 7, 50, -1), 5);
        assert_eq!(adjust_population(&config, 1, 50, -1), 0);
    }

    #[test]
    fn surplus_grows_toward_capacity() {
        let config = SimulationConfig {
            growth_per_tick: 3,
            ..SimulationConfig::default()
        };
        assert_eq!(adjust_population(&config, 0, 10, 5), 3);
        assert_eq!(adjust_population(&config, 9, 10, 5), 10);
        assert_eq!(adjust_population(&config, 4, 10, 0), 4);
    }

    #[test]
    fn overcrowding_shrinks_to_capacity() {
        let config = SimulationConfig::default();
        assert_eq!(adjust_population(&config, 15, 10, 5), 13);
        assert_eq!(adjust_population(&config, 11, 10, 5), 10);
        assert_eq!(adjust_population(&config, 10, 10, 5), 10);
    }

    #[test]
    fn tax_and_food_follow_the_reference_rates() {
        let config = SimulationConfig::default();
        assert_eq!(tax(&config, 25), 2);
        assert_eq!(tax(&config, 9), 0);
        assert_eq!(food_delta(&config, 2, 10), 14);
        assert_eq!(food_delta(&config, 0, 3), -3);
        assert_eq!(capacity(&config, 3), 30);
    }
}
