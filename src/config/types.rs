//! Configuration data types.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;

use super::defaults::{DEFAULT_CLOSE_BELOW, DEFAULT_EXACT_BELOW, DEFAULT_THEMES_DIR};
use crate::learner::LearnerOptions;
use crate::neighbor::NeighborOptions;
use crate::validation::ValidationOptions;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub learner: LearnerOptions,
    pub neighbor: NeighborOptions,
    pub validation: ValidationConfig,
}

impl Config {
    /// Validation options with `exclude` applied to both the pool and the
    /// graded set.
    pub fn validation_options(&self) -> ValidationOptions {
        let v = &self.validation;
        let mut pool: BTreeSet<String> = v.exclude_from_pool.iter().cloned().collect();
        let mut grading: BTreeSet<String> = v.exclude_from_grading.iter().cloned().collect();
        pool.extend(v.exclude.iter().cloned());
        grading.extend(v.exclude.iter().cloned());
        ValidationOptions {
            exclude_from_pool: pool,
            exclude_from_grading: grading,
            fields: None,
            exact_below: v.exact_below,
            close_below: v.close_below,
        }
    }
}

/// Where themes and learned rules live.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub themes_dir: PathBuf,
    /// Learned rule file (TOML or JSON). The built-in rules apply when unset.
    pub rules: Option<PathBuf>,
    /// Ignore `generated` extended sections when learning and grading.
    pub skip_generated: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            themes_dir: PathBuf::from(DEFAULT_THEMES_DIR),
            rules: None,
            skip_generated: false,
        }
    }
}

/// Leave-one-out grading settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Outlier themes removed from both the pool and the graded set.
    pub exclude: Vec<String>,
    pub exclude_from_pool: Vec<String>,
    pub exclude_from_grading: Vec<String>,
    pub exact_below: f64,
    pub close_below: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            exclude_from_pool: Vec::new(),
            exclude_from_grading: Vec::new(),
            exact_below: DEFAULT_EXACT_BELOW,
            close_below: DEFAULT_CLOSE_BELOW,
        }
    }
}

/// Which file, if any, the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` path.
    Explicit(PathBuf),
    /// `./paletteer.toml`.
    Local,
    /// `<config root>/paletteer/paletteer.toml`.
    Global(PathBuf),
    BuiltInDefaults,
}

/// Configuration plus where it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}
