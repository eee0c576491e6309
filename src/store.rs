//! On-disk theme documents: `<themes_dir>/<theme-id>/theme.yml`.
//!
//! Documents are held as an order-preserving YAML mapping so sections this
//! crate does not understand survive a rewrite. Marking a theme's source is
//! a text-level insert that leaves every other byte alone.

use crate::color::Rgb;
use crate::corpus::{Corpus, ExtendedSource, LabeledTheme};
use crate::error::{ColorFormatError, ThemeError};
use crate::palette::{ExtendedField, ExtendedPalette, Palette, Slot};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

pub const THEME_FILE: &str = "theme.yml";

const BASE16_KEY: &str = "base16";
const EXTENDED_KEY: &str = "extended";
const SOURCE_KEY: &str = "extended_source";

/// Section order used when a document is rewritten.
const KEY_ORDER: [&str; 6] = ["meta", BASE16_KEY, "ansi", "special", SOURCE_KEY, EXTENDED_KEY];

/// One parsed `theme.yml`.
#[derive(Debug, Clone)]
pub struct ThemeDocument {
    id: String,
    path: PathBuf,
    doc: Mapping,
}

impl ThemeDocument {
    pub fn load(id: impl Into<String>, path: &Path) -> Result<Self, ThemeError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ThemeError::Io(path.to_path_buf(), e))?;
        Self::parse(id, path, &text)
    }

    pub fn parse(id: impl Into<String>, path: &Path, text: &str) -> Result<Self, ThemeError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| ThemeError::Yaml(path.to_path_buf(), e))?;
        let Value::Mapping(doc) = value else {
            return Err(ThemeError::Invalid("document is not a mapping".to_string()));
        };
        Ok(Self {
            id: id.into(),
            path: path.to_path_buf(),
            doc,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The 16 base colors. Fails when the section or a slot is missing or a
    /// color is malformed.
    pub fn palette(&self) -> Result<Palette, ThemeError> {
        let Some(Value::Mapping(section)) = self.doc.get(BASE16_KEY) else {
            return Err(ThemeError::MissingBase16);
        };
        let mut entries = Vec::with_capacity(Slot::ALL.len());
        for (key, value) in section {
            let Some(key) = key.as_str() else {
                continue;
            };
            let Ok(slot) = key.parse::<Slot>() else {
                tracing::warn!(theme = %self.id, key, "ignoring unknown base16 key");
                continue;
            };
            entries.push((slot, color_value(key, value)?));
        }
        Palette::from_slots(entries).map_err(|slot| ThemeError::MissingSlot(slot.to_string()))
    }

    /// True when the `extended` section carries `diagnostic_error`.
    pub fn has_extended(&self) -> bool {
        matches!(
            self.doc.get(EXTENDED_KEY),
            Some(Value::Mapping(section))
                if section.contains_key(ExtendedField::DiagnosticError.key())
        )
    }

    /// Parsed `extended` section. Unknown keys are dropped with a warning.
    pub fn extended(&self) -> Result<Option<ExtendedPalette>, ThemeError> {
        let Some(Value::Mapping(section)) = self.doc.get(EXTENDED_KEY) else {
            return Ok(None);
        };
        let mut extended = ExtendedPalette::new();
        for (key, value) in section {
            let Some(key) = key.as_str() else {
                continue;
            };
            match key.parse::<ExtendedField>() {
                Ok(field) => extended.insert(field, color_value(key, value)?),
                Err(e) => tracing::warn!(theme = %self.id, error = %e, "dropping extended key"),
            }
        }
        Ok(Some(extended))
    }

    pub fn source(&self) -> Result<Option<ExtendedSource>, ThemeError> {
        match self.doc.get(SOURCE_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => s
                .parse()
                .map(Some)
                .map_err(|e| ThemeError::Invalid(format!("{SOURCE_KEY}: {e}"))),
            Some(other) => Err(ThemeError::Invalid(format!(
                "{SOURCE_KEY} must be a string, got {other:?}"
            ))),
        }
    }

    pub fn to_labeled(&self) -> Result<LabeledTheme, ThemeError> {
        let theme = LabeledTheme::new(self.id.clone(), self.palette()?);
        Ok(match self.extended()? {
            Some(extended) => theme.with_extended(extended, self.source()?),
            None => theme,
        })
    }

    /// Replace the extended section and its provenance tag.
    pub fn set_extended(&mut self, extended: &ExtendedPalette, source: ExtendedSource) {
        let section: Mapping = extended
            .iter()
            .map(|(field, color)| {
                (
                    Value::String(field.key().to_string()),
                    Value::String(color.to_hex()),
                )
            })
            .collect();
        self.doc.insert(
            Value::String(SOURCE_KEY.to_string()),
            Value::String(source.key().to_string()),
        );
        self.doc.insert(
            Value::String(EXTENDED_KEY.to_string()),
            Value::Mapping(section),
        );
    }

    /// YAML text with sections in canonical order, unknown sections last.
    pub fn render(&self) -> Result<String, ThemeError> {
        let mut ordered = Mapping::new();
        for key in KEY_ORDER {
            if let Some(value) = self.doc.get(key) {
                ordered.insert(Value::String(key.to_string()), value.clone());
            }
        }
        for (key, value) in &self.doc {
            if !ordered.contains_key(key) {
                ordered.insert(key.clone(), value.clone());
            }
        }
        serde_yaml::to_string(&Value::Mapping(ordered))
            .map_err(|e| ThemeError::Yaml(self.path.clone(), e))
    }

    pub fn save(&self) -> Result<(), ThemeError> {
        let text = self.render()?;
        std::fs::write(&self.path, text).map_err(|e| ThemeError::Io(self.path.clone(), e))
    }
}

/// Accepts quoted strings and bare integers (`000000`). A bare value YAML
/// reads as a float (`1e1234`) has lost its digits and is rejected.
fn color_value(key: &str, value: &Value) -> Result<Rgb, ThemeError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_u64() {
            Some(v) => format!("{v:06}"),
            None => n.to_string(),
        },
        other => format!("{other:?}"),
    };
    text.parse().map_err(|source: ColorFormatError| ThemeError::Color {
        slot: key.to_string(),
        source,
    })
}

/// Tag the extended palette with `source` at the text level.
///
/// An empty top-level `extended_source:` line (YAML null) is filled in
/// place; otherwise the tag is inserted just above the top-level
/// `extended:` line. Returns `None` when the document already carries a
/// non-null tag or has no top-level `extended:` line.
pub fn mark_source_text(text: &str, source: ExtendedSource) -> Option<String> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let tag = format!("{SOURCE_KEY}: {source}\n");

    if let Some(idx) = lines
        .iter()
        .position(|line| top_level_value(line, SOURCE_KEY).is_some())
    {
        let value = top_level_value(lines[idx], SOURCE_KEY)?;
        if !is_yaml_null(value) {
            return None;
        }
        let mut out = String::with_capacity(text.len() + 16);
        for (i, line) in lines.iter().enumerate() {
            out.push_str(if i == idx { tag.as_str() } else { *line });
        }
        return Some(out);
    }

    let idx = lines
        .iter()
        .position(|line| top_level_value(line, EXTENDED_KEY).is_some())?;
    let mut out = String::with_capacity(text.len() + tag.len());
    for (i, line) in lines.iter().enumerate() {
        if i == idx {
            out.push_str(&tag);
        }
        out.push_str(line);
    }
    Some(out)
}

/// The text after `key:` when `line` is that top-level key.
fn top_level_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.strip_prefix(key)?.trim_start().strip_prefix(':')
}

fn is_yaml_null(value: &str) -> bool {
    let value = value.split('#').next().unwrap_or_default().trim();
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

/// Apply [`mark_source_text`] to a file in place. Returns whether the file
/// changed.
pub fn mark_source(path: &Path, source: ExtendedSource) -> Result<bool, ThemeError> {
    let text = std::fs::read_to_string(path).map_err(|e| ThemeError::Io(path.to_path_buf(), e))?;
    match mark_source_text(&text, source) {
        Some(updated) => {
            std::fs::write(path, updated).map_err(|e| ThemeError::Io(path.to_path_buf(), e))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// A theme directory containing `theme.yml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeEntry {
    pub id: String,
    pub path: PathBuf,
}

/// Theme directories under `dir`, sorted by id.
pub fn discover(dir: &Path) -> Result<Vec<ThemeEntry>, ThemeError> {
    let read = std::fs::read_dir(dir).map_err(|e| ThemeError::Io(dir.to_path_buf(), e))?;
    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| ThemeError::Io(dir.to_path_buf(), e))?;
        let path = entry.path().join(THEME_FILE);
        if !path.is_file() {
            continue;
        }
        let Some(id) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        entries.push(ThemeEntry { id, path });
    }
    entries.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(entries)
}

/// A theme that could not be loaded into the corpus.
#[derive(Debug)]
pub struct LoadWarning {
    pub theme: String,
    pub error: ThemeError,
}

#[derive(Debug)]
pub struct CorpusLoad {
    pub corpus: Corpus,
    pub warnings: Vec<LoadWarning>,
}

/// Load every theme under `dir`. Broken themes are skipped and reported,
/// never fatal.
pub fn load_corpus(dir: &Path) -> Result<CorpusLoad, ThemeError> {
    let mut themes = Vec::new();
    let mut warnings = Vec::new();
    for entry in discover(dir)? {
        match ThemeDocument::load(entry.id.clone(), &entry.path).and_then(|doc| doc.to_labeled()) {
            Ok(theme) => themes.push(theme),
            Err(error) => {
                tracing::warn!(theme = %entry.id, %error, "skipping theme");
                warnings.push(LoadWarning {
                    theme: entry.id,
                    error,
                });
            }
        }
    }
    tracing::debug!(themes = themes.len(), skipped = warnings.len(), "loaded corpus");
    Ok(CorpusLoad {
        corpus: Corpus::new(themes),
        warnings,
    })
}
