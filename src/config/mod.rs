//! Configuration loading.
//!
//! Precedence, highest first: environment variables, `--config` path,
//! `./paletteer.toml`, `<config root>/paletteer/paletteer.toml`, built-in
//! defaults. Only the first file found is read; files are not merged.

mod defaults;
mod types;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, ENV_RULES, ENV_THEMES_DIR};
pub use types::{Config, ConfigSource, CorpusConfig, LoadedConfig, ValidationConfig};

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_config_text(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&text)?;
    apply_env_overrides(&mut config, &env_lookup);
    validate(&config)?;
    tracing::debug!(source = ?source, "loaded config");
    Ok(LoadedConfig { config, source })
}

/// Read config text from the highest-precedence file that exists.
fn read_config_text<FRead, FRoot>(
    path_override: Option<&Path>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    // An explicit path must exist.
    if let Some(path) = path_override {
        let text = read_file(path)?;
        return Ok((text, ConfigSource::Explicit(path.to_path_buf())));
    }
    if let Ok(text) = read_file(Path::new(CONFIG_FILE_NAME)) {
        return Ok((text, ConfigSource::Local));
    }
    if let Some(dir) = config_root() {
        let global = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if let Ok(text) = read_file(&global) {
            return Ok((text, ConfigSource::Global(global)));
        }
    }
    Ok((String::new(), ConfigSource::BuiltInDefaults))
}

fn apply_env_overrides<FEnv>(config: &mut Config, env_lookup: &FEnv)
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(dir) = non_empty(env_lookup(ENV_THEMES_DIR)) {
        config.corpus.themes_dir = PathBuf::from(dir);
    }
    if let Some(rules) = non_empty(env_lookup(ENV_RULES)) {
        config.corpus.rules = Some(PathBuf::from(rules));
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let learner = &config.learner;
    if learner.acceptance_threshold <= 0.0 {
        return Err(ConfigError::Invalid(
            "learner.acceptance_threshold must be positive".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&learner.dominance_ratio) {
        return Err(ConfigError::Invalid(
            "learner.dominance_ratio must be within 0..=1".to_string(),
        ));
    }
    if config.neighbor.acceptance_threshold <= 0.0 {
        return Err(ConfigError::Invalid(
            "neighbor.acceptance_threshold must be positive".to_string(),
        ));
    }
    let validation = &config.validation;
    if validation.exact_below > validation.close_below {
        return Err(ConfigError::Invalid(format!(
            "validation.exact_below ({}) exceeds validation.close_below ({})",
            validation.exact_below, validation.close_below
        )));
    }
    Ok(())
}

/// Global config root: `$XDG_CONFIG_HOME`, else `~/.config`, else the
/// platform config directory.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
