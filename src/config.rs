//! Build configuration shared by leaves and trees
//!
//! Every field changes the digests produced, so producers and verifiers of
//! the same roots must agree on the whole config.

use crate::canonical::JsonStyle;
use crate::model::HashAlgorithm;
use crate::sequence::{BranchingTable, MAX_BRANCHING_FACTOR};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Absolute tolerance around φ and φ⁻¹ for the coherence flag
pub const DEFAULT_COHERENCE_TOLERANCE: f64 = 0.01;

/// Parameters for leaf digests and tree folding
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhiConfig {
    /// Hash function for leaf digests and group digests
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
    /// Canonical JSON convention for state serialization
    #[serde(default)]
    pub json_style: JsonStyle,
    /// Tolerance around φ / φ⁻¹ for the coherence flag
    #[serde(default = "default_tolerance")]
    pub coherence_tolerance: f64,
    /// Upper bound on per-level fan-out
    #[serde(default = "default_max_branching_factor")]
    pub max_branching_factor: usize,
}

fn default_tolerance() -> f64 {
    DEFAULT_COHERENCE_TOLERANCE
}

fn default_max_branching_factor() -> usize {
    MAX_BRANCHING_FACTOR
}

impl Default for PhiConfig {
    fn default() -> Self {
        PhiConfig {
            hash_algorithm: HashAlgorithm::default(),
            json_style: JsonStyle::default(),
            coherence_tolerance: DEFAULT_COHERENCE_TOLERANCE,
            max_branching_factor: MAX_BRANCHING_FACTOR,
        }
    }
}

impl PhiConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PhiConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the values describe a usable configuration
    pub fn validate(&self) -> Result<()> {
        if !self.coherence_tolerance.is_finite() || self.coherence_tolerance <= 0.0 {
            return Err(Error::Config(format!(
                "coherence tolerance must be a positive number, got {}",
                self.coherence_tolerance
            )));
        }
        self.branching_table().map(|_| ())
    }

    /// Branching table capped at `max_branching_factor`
    pub fn branching_table(&self) -> Result<BranchingTable> {
        BranchingTable::with_max(self.max_branching_factor)
    }

    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    pub fn with_json_style(mut self, style: JsonStyle) -> Self {
        self.json_style = style;
        self
    }

    pub fn with_max_branching_factor(mut self, max: usize) -> Self {
        self.max_branching_factor = max;
        self
    }
}
