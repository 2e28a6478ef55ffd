use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

/// A feature with at least this many vertices is reported.
pub const DEFAULT_MAX_VERTICES: usize = 1900;

/// Great-circle length in meters above which a segment is reported. Deployed
/// inspections have used both 2 km and 20 km here; 20 km is the default.
pub const DEFAULT_LONG_SEGMENT_METERS: f64 = 20_000.0;

/// Thresholds for the length-based checks. All other checks are
/// parameter-free.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vertex count from which a feature counts as excessively long.
    pub max_vertices: usize,
    /// Segment length in meters above which (strictly) a segment is reported.
    pub long_segment_meters: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_vertices: DEFAULT_MAX_VERTICES,
            long_segment_meters: DEFAULT_LONG_SEGMENT_METERS,
        }
    }
}

impl Config {
    /// Reads a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Could not open configuration file {}.", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Could not parse configuration file {}.", path.display()))
    }
}
