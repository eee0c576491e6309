//! Default configuration constants.

/// Config file name looked up in the working directory and the global
/// config directory.
pub(super) const CONFIG_FILE_NAME: &str = "paletteer.toml";
/// Subdirectory of the global config root.
pub(super) const CONFIG_DIR_NAME: &str = "paletteer";
/// Themes directory used when nothing else is configured.
pub(super) const DEFAULT_THEMES_DIR: &str = "themes";

/// Overrides `[corpus].themes_dir`.
pub(super) const ENV_THEMES_DIR: &str = "PALETTEER_THEMES_DIR";
/// Overrides `[corpus].rules`.
pub(super) const ENV_RULES: &str = "PALETTEER_RULES";

/// Distance below which a prediction counts as exact.
pub(super) const DEFAULT_EXACT_BELOW: f64 = 1.0;
/// Distance below which a prediction counts as close.
pub(super) const DEFAULT_CLOSE_BELOW: f64 = 10.0;
