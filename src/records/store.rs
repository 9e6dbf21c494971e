//! On-disk persistence of raw ride records.
//!
//! Fetched rides are kept as one JSON file per ride, named after the ride
//! id, in the same wire shape the portal delivered. Files written here can
//! be reloaded and exported at any later time.

use crate::records::types::{RecordError, Ride};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of persisted ride records.
pub const RECORD_EXTENSION: &str = "json";

/// Load a ride record from a file written by [`save_ride`] (or fetched
/// directly from the portal).
pub fn load_ride(path: &Path) -> Result<Ride, RecordError> {
    let raw = fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value = serde_json::from_str(&raw)?;
    Ride::from_value(value)
}

/// Write a ride record to `<dir>/<ride id>.json`, overwriting any
/// previous download of the same ride.
pub fn save_ride(dir: &Path, ride: &Ride) -> Result<PathBuf, RecordError> {
    let path = dir.join(format!("{}.{}", ride.id, RECORD_EXTENSION));
    let body = serde_json::to_string(ride)?;

    fs::write(&path, body).map_err(|source| RecordError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::debug!("Stored ride {} at {}", ride.id, path.display());

    Ok(path)
}
