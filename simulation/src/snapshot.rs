//! Save snapshots and their single-line transfer encoding.
//!
//! A snapshot is written as `forum:v1:<payload>`, where the payload is the
//! unpadded base64 encoding of the JSON document. The document repeats the
//! schema version so a payload pasted under the wrong header is still
//! rejected.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use forum_defence_core::{InvasionSchedule, Resources, Score};
use forum_defence_world::Tile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version of the persisted document layout.
pub const SCHEMA_VERSION: u32 = 1;

const SNAPSHOT_DOMAIN: &str = "forum";
const SNAPSHOT_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Complete persisted state of a session taken at a tick boundary.
///
/// Agents and invaders are transient and are not part of the snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    /// Layout version of the document.
    pub schema_version: u32,
    /// Wall-clock time the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Cells per grid edge.
    pub grid_size: u32,
    /// Row-major tiles.
    pub tiles: Vec<Tile>,
    /// Treasury, granary and population.
    pub resources: Resources,
    /// Score aggregates.
    pub score: Score,
    /// Number of ticks simulated so far.
    pub tick: u64,
    /// Wave number and countdown.
    pub invasion: InvasionSchedule,
}

impl SaveSnapshot {
    /// Encodes the snapshot into a single-line transfer string.
    pub fn encode(&self) -> Result<String, SnapshotError> {
        let json = serde_json::to_vec(self)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_DOMAIN}{FIELD_DELIMITER}{SNAPSHOT_VERSION}{FIELD_DELIMITER}{encoded}"
        ))
    }

    /// Decodes a transfer string produced by [`SaveSnapshot::encode`].
    pub fn decode(value: &str) -> Result<Self, SnapshotError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().ok_or(SnapshotError::MissingPrefix)?;
        let version = parts.next().ok_or(SnapshotError::MissingVersion)?;
        let payload = parts.next().ok_or(SnapshotError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(SnapshotError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let snapshot: Self = serde_json::from_slice(&bytes)?;
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(SnapshotError::SchemaMismatch(snapshot.schema_version));
        }
        Ok(snapshot)
    }
}

/// Reasons a snapshot cannot be used.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("snapshot string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The payload segment was missing.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The prefix segment named another format.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The header carried an unknown version.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The document carried an unknown schema version.
    #[error("snapshot schema version {0} is not supported")]
    SchemaMismatch(u32),
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The JSON document could not be parsed or written.
    #[error("could not parse snapshot payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    /// The tiles do not describe whole building footprints.
    #[error("snapshot grid is corrupt")]
    CorruptGrid,
}
