//! Wave escalation curves.
//!
//! Wave numbers are 1-based: wave 1 uses the base values unchanged.

use forum_defence_core::SimulationConfig;

/// Ticks between wave `wave` and the next one.
///
/// Shrinks by a fixed step per wave and holds at the configured floor.
#[must_use]
pub fn wave_interval(config: &SimulationConfig, wave: u32) -> u32 {
    config
        .wave_interval_base
        .saturating_sub(config.wave_interval_step.saturating_mul(wave))
        .max(config.wave_interval_floor)
}

/// Number of invaders spawned by the wave.
#[must_use]
pub fn wave_size(config: &SimulationConfig, wave: u32) -> u32 {
    scaled(config.wave_size_base, config.wave_size_per_wave, wave)
}

/// Hit points of every invader spawned by the wave.
#[must_use]
pub fn invader_hit_points(config: &SimulationConfig, wave: u32) -> u32 {
    scaled(
        config.invader_hit_points_base,
        config.invader_hit_points_per_wave,
        wave,
    )
    .max(1)
}

/// Damage dealt per hit by invaders of the wave.
#[must_use]
pub fn invader_damage(config: &SimulationConfig, wave: u32) -> u32 {
    scaled(config.invader_damage_base, config.invader_damage_per_wave, wave)
}

fn scaled(base: f32, per_wave: f32, wave: u32) -> u32 {
    let steps = wave.saturating_sub(1) as f32;
    let value = (base + per_wave * steps).floor();
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= u32::MAX as f32 {
        u32::MAX
    } else {
        value as u32
    }
}
