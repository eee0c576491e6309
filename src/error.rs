//! Unified error types for palette analysis and theme maintenance.

use crate::palette::ExtendedField;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ColorFormatError
// ---------------------------------------------------------------------------

/// A color string that is not a 6-digit hex RGB value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorFormatError {
    /// Wrong number of hex digits after stripping `#`.
    WrongLength { input: String, digits: usize },
    /// Correct length but contains a non-hex character.
    InvalidDigit { input: String },
}

impl fmt::Display for ColorFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength { input, digits } => write!(
                f,
                "invalid hex color `{input}`: expected 6 hex digits, found {digits}"
            ),
            Self::InvalidDigit { input } => {
                write!(f, "invalid hex color `{input}`: non-hex digit")
            }
        }
    }
}

impl std::error::Error for ColorFormatError {}

// ---------------------------------------------------------------------------
// UnknownKeyError
// ---------------------------------------------------------------------------

/// Which closed key space a lookup failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Slot,
    Field,
    Feature,
    Source,
}

impl KeyKind {
    fn label(self) -> &'static str {
        match self {
            Self::Slot => "base16 slot",
            Self::Field => "extended field",
            Self::Feature => "feature",
            Self::Source => "extended_source",
        }
    }
}

/// A string key that does not name a known slot, field, feature or source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyError {
    pub kind: KeyKind,
    pub key: String,
}

impl UnknownKeyError {
    pub fn new(kind: KeyKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }
}

impl fmt::Display for UnknownKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} `{}`", self.kind.label(), self.key)
    }
}

impl std::error::Error for UnknownKeyError {}

// ---------------------------------------------------------------------------
// ThemeError
// ---------------------------------------------------------------------------

/// Errors reading, parsing, or writing a theme document.
#[derive(Debug)]
pub enum ThemeError {
    Io(PathBuf, std::io::Error),
    Yaml(PathBuf, serde_yaml::Error),
    /// Document has no `base16` section.
    MissingBase16,
    /// `base16` section lacks one of the 16 slots.
    MissingSlot(String),
    /// A slot value is not a valid color.
    Color { slot: String, source: ColorFormatError },
    Invalid(String),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "io `{}`: {e}", path.display()),
            Self::Yaml(path, e) => write!(f, "yaml `{}`: {e}", path.display()),
            Self::MissingBase16 => write!(f, "no base16 palette"),
            Self::MissingSlot(slot) => write!(f, "base16 palette is missing `{slot}`"),
            Self::Color { slot, source } => write!(f, "{slot}: {source}"),
            Self::Invalid(msg) => write!(f, "invalid theme: {msg}"),
        }
    }
}

impl std::error::Error for ThemeError {}

// ---------------------------------------------------------------------------
// RulesError
// ---------------------------------------------------------------------------

/// Errors loading or saving a serialized rule set.
#[derive(Debug)]
pub enum RulesError {
    Io(std::io::Error),
    Parse(String),
    Serialize(String),
    /// A rule set with no rule for this field.
    Missing(ExtendedField),
    /// A threshold rule for `rule` filed under `filed`.
    Misfiled {
        filed: ExtendedField,
        rule: ExtendedField,
    },
}

impl fmt::Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(msg) => write!(f, "parse: {msg}"),
            Self::Serialize(msg) => write!(f, "serialize: {msg}"),
            Self::Missing(field) => write!(f, "rule set has no rule for `{field}`"),
            Self::Misfiled { filed, rule } => {
                write!(f, "rule filed under `{filed}` is for `{rule}`")
            }
        }
    }
}

impl std::error::Error for RulesError {}

impl From<std::io::Error> for RulesError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// InferenceError
// ---------------------------------------------------------------------------

/// Per-theme inference failures. These skip one theme, never the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// Every candidate neighbor was excluded (self, deny-list, or unlabeled).
    NoNeighbor { theme: String },
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoNeighbor { theme } => write!(f, "no eligible neighbor for `{theme}`"),
        }
    }
}

impl std::error::Error for InferenceError {}

// ---------------------------------------------------------------------------
// Error (top-level)
// ---------------------------------------------------------------------------

/// Top-level error type for CLI operations.
#[derive(Debug)]
pub enum Error {
    Color(ColorFormatError),
    Key(UnknownKeyError),
    Theme(ThemeError),
    Rules(RulesError),
    Config(ConfigError),
    Inference(InferenceError),
    /// A named theme does not exist in the corpus.
    UnknownTheme(String),
    /// Reading or writing a report or rule file.
    File(PathBuf, std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(e) => write!(f, "color: {e}"),
            Self::Key(e) => write!(f, "key: {e}"),
            Self::Theme(e) => write!(f, "theme: {e}"),
            Self::Rules(e) => write!(f, "rules: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Inference(e) => write!(f, "inference: {e}"),
            Self::UnknownTheme(id) => write!(f, "no theme named `{id}` in corpus"),
            Self::File(path, e) => write!(f, "`{}`: {e}", path.display()),
            Self::Json(e) => write!(f, "json: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ColorFormatError> for Error {
    fn from(e: ColorFormatError) -> Self {
        Self::Color(e)
    }
}

impl From<UnknownKeyError> for Error {
    fn from(e: UnknownKeyError) -> Self {
        Self::Key(e)
    }
}

impl From<ThemeError> for Error {
    fn from(e: ThemeError) -> Self {
        Self::Theme(e)
    }
}

impl From<RulesError> for Error {
    fn from(e: RulesError) -> Self {
        Self::Rules(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<InferenceError> for Error {
    fn from(e: InferenceError) -> Self {
        Self::Inference(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
