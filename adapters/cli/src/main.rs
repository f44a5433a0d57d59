#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Forum Defence session headlessly.

mod layout;
mod settings;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use forum_defence_core::Event;
use forum_defence_simulation::Simulation;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use layout::LayoutChoice;

/// Headless Forum Defence simulation runner.
#[derive(Debug, Parser)]
#[command(name = "forum-defence", version)]
struct CliArgs {
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 300)]
    ticks: u32,

    /// Seed for every random choice the simulation makes.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// TOML file overriding simulation tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Snapshot file to resume from; unusable saves start a fresh session.
    #[arg(long)]
    load: Option<PathBuf>,

    /// File receiving the snapshot taken after the last tick.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Layout built around the capital of a fresh session.
    #[arg(long, value_enum, default_value_t = LayoutChoice::Starter)]
    layout: LayoutChoice,

    /// Frame updates interpolated within each tick.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    frames_per_tick: u32,
}

/// Entry point for the Forum Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    let config = settings::load(args.config.as_deref())?;
    let interval = config.tick_interval();
    let mut simulation = Simulation::new(config, args.seed);
    let mut events = Vec::new();

    let resumed = args
        .load
        .as_deref()
        .is_some_and(|path| match fs::read_to_string(path) {
            Ok(contents) => simulation.load(&contents),
            Err(error) => {
                warn!(path = %path.display(), %error, "save file unavailable");
                false
            }
        });
    if !resumed {
        let placed = layout::build(&mut simulation, args.layout, &mut events);
        info!(placed, layout = ?args.layout, "layout built");
    }
    drain(&mut events);

    let frames = frame_durations(interval, args.frames_per_tick);
    for _ in 0..args.ticks {
        for dt in &frames {
            let _ = simulation.frame(*dt, &mut events);
        }
        drain(&mut events);
        if simulation.is_over() {
            break;
        }
    }

    let resources = simulation.resources();
    let score = simulation.score();
    println!(
        "tick {} | gold {} | food {} | population {}/{} | wave {} | peak {} | gold earned {}{}",
        simulation.tick_count(),
        resources.gold,
        resources.food,
        resources.population,
        resources.max_population,
        score.waves_survived,
        score.peak_population,
        score.gold_earned,
        if simulation.is_over() { " | capital lost" } else { "" },
    );

    if let Some(path) = &args.save {
        let encoded = simulation
            .snapshot()
            .encode()
            .context("failed to encode snapshot")?;
        fs::write(path, encoded)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        info!(path = %path.display(), "snapshot saved");
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Splits one tick interval into `frames` steps that add up exactly.
fn frame_durations(interval: Duration, frames: u32) -> Vec<Duration> {
    let frames = frames.max(1);
    let step = interval / frames;
    let mut durations = vec![step; usize::try_from(frames - 1).unwrap_or(0)];
    durations.push(interval.saturating_sub(step * (frames - 1)));
    durations
}

fn drain(events: &mut Vec<Event>) {
    for event in events.drain(..) {
        match event {
            Event::WaveWarning {
                wave,
                ticks_remaining,
            } => info!(wave, ticks_remaining, "wave approaching"),
            Event::WaveStarted { wave, invaders } => info!(wave, invaders, "wave started"),
            Event::BuildingDestroyed { kind, origin } => {
                info!(?kind, ?origin, "building destroyed");
            }
            Event::CapitalDestroyed => warn!("the capital has fallen"),
            other => debug!(event = ?other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_steps_sum_to_the_interval() {
        let interval = Duration::from_millis(1_000);
        for frames in [1, 3, 4, 7] {
            let steps = frame_durations(interval, frames);
            assert_eq!(steps.len(), usize::try_from(frames).expect("small"));
            assert_eq!(steps.iter().sum::<Duration>(), interval);
        }
    }

    #[test]
    fn arguments_parse_with_defaults() {
        let args = CliArgs::try_parse_from(["forum-defence", "--ticks", "10", "--layout", "empty"])
            .expect("parses");

        assert_eq!(args.ticks, 10);
        assert_eq!(args.seed, 0);
        assert_eq!(args.layout, LayoutChoice::Empty);
        assert_eq!(args.frames_per_tick, 4);
        assert!(args.load.is_none());
    }

    #[test]
    fn zero_frames_per_tick_is_rejected() {
        assert!(CliArgs::try_parse_from(["forum-defence", "--frames-per-tick", "0"]).is_err());
    }
}
