//! Loading of simulation tuning from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use forum_defence_core::SimulationConfig;

/// Reads tuning overrides, falling back to the reference values.
///
/// Keys missing from the file keep their defaults.
pub(crate) fn load(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&contents).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn parse(contents: &str) -> Result<SimulationConfig> {
    toml::from_str(contents).context("invalid simulation config toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_only_override_named_keys() {
        let config = parse("grid_size = 16\nwave_size_base = 5\n").expect("parses");

        assert_eq!(config.grid_size, 16);
        assert_eq!(config.wave_size_base, 5.0);
        assert_eq!(config.house_capacity, SimulationConfig::default().house_capacity);
    }

    #[test]
    fn missing_path_uses_defaults() {
        assert_eq!(load(None).expect("defaults"), SimulationConfig::default());
    }

    #[test]
    fn malformed_files_are_reported() {
        assert!(parse("grid_size = \"large\"").is_err());
    }
}
