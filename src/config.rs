//! Cycle configuration.
//!
//! Reads a TOML file such as:
//!
//! ```toml
//! [solver]
//! time_limit_secs = 60
//!
//! [objective]
//! day_weights = [5, 4, 3, 2, 1, 0]
//! block_weights = [3, 2, 1, 0]
//! room_fit_base = 40
//! room_fit_floor = 1
//!
//! [output]
//! directory = "out"
//! format = "json"
//! ```
//!
//! Every section and field is optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{TimetableError, TimetableResult};
use crate::milp::ObjectiveWeights;

/// Full configuration for a timetabling cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    pub solver: SolverSettings,
    pub objective: ObjectiveWeights,
    pub output: OutputSettings,
}

/// Solver settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Wall-clock limit for one solve; absent = no limit.
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
}

impl SolverSettings {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Xlsx,
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("schedules")
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::default(),
        }
    }
}

impl TimetableConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    /// `Config` if the file cannot be read or parsed, or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> TimetableResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            TimetableError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        content.parse()
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// `Config` for a zero time limit, invalid objective weights, or an
    /// `xlsx` format without the `xlsx` feature.
    pub fn validate(&self) -> TimetableResult<()> {
        if self.solver.time_limit_secs == Some(0) {
            return Err(TimetableError::Config(
                "solver.time_limit_secs must be positive".to_string(),
            ));
        }
        self.objective.validate()?;
        if self.output.format == OutputFormat::Xlsx && !cfg!(feature = "xlsx") {
            return Err(TimetableError::Config(
                "output.format = \"xlsx\" requires the `xlsx` feature".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::str::FromStr for TimetableConfig {
    type Err = TimetableError;

    fn from_str(content: &str) -> TimetableResult<Self> {
        let config: TimetableConfig = toml::from_str(content)
            .map_err(|e| TimetableError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
