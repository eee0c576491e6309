//! Base16 slots, the 16-color palette, and the semantic extended palette.

use crate::color::Rgb;
use crate::error::{KeyKind, UnknownKeyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the 16 named positions in a base16 palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Slot {
    Base00,
    Base01,
    Base02,
    Base03,
    Base04,
    Base05,
    Base06,
    Base07,
    Base08,
    Base09,
    Base0A,
    Base0B,
    Base0C,
    Base0D,
    Base0E,
    Base0F,
}

impl Slot {
    pub const ALL: [Slot; 16] = [
        Self::Base00,
        Self::Base01,
        Self::Base02,
        Self::Base03,
        Self::Base04,
        Self::Base05,
        Self::Base06,
        Self::Base07,
        Self::Base08,
        Self::Base09,
        Self::Base0A,
        Self::Base0B,
        Self::Base0C,
        Self::Base0D,
        Self::Base0E,
        Self::Base0F,
    ];

    /// The eight accent slots, `base08`..`base0F`.
    pub const ACCENTS: [Slot; 8] = [
        Self::Base08,
        Self::Base09,
        Self::Base0A,
        Self::Base0B,
        Self::Base0C,
        Self::Base0D,
        Self::Base0E,
        Self::Base0F,
    ];

    /// Key as written in theme files (`base0A`, not `base0a`).
    pub fn key(self) -> &'static str {
        match self {
            Self::Base00 => "base00",
            Self::Base01 => "base01",
            Self::Base02 => "base02",
            Self::Base03 => "base03",
            Self::Base04 => "base04",
            Self::Base05 => "base05",
            Self::Base06 => "base06",
            Self::Base07 => "base07",
            Self::Base08 => "base08",
            Self::Base09 => "base09",
            Self::Base0A => "base0A",
            Self::Base0B => "base0B",
            Self::Base0C => "base0C",
            Self::Base0D => "base0D",
            Self::Base0E => "base0E",
            Self::Base0F => "base0F",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Slot {
    type Err = UnknownKeyError;

    /// Slot keys are matched case-insensitively after the `base` prefix so
    /// `base0a` and `base0A` both resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|slot| slot.key().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownKeyError::new(KeyKind::Slot, s))
    }
}

impl TryFrom<String> for Slot {
    type Error = UnknownKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Slot> for String {
    fn from(value: Slot) -> Self {
        value.key().to_string()
    }
}

/// A complete base16 palette: exactly one color per slot.
///
/// Slots may hold identical colors; nothing here enforces distinctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette {
    colors: [Rgb; 16],
}

impl Palette {
    pub fn new(colors: [Rgb; 16]) -> Self {
        Self { colors }
    }

    /// Build from slot/color pairs. Returns the first missing slot on failure.
    pub fn from_slots<I>(entries: I) -> Result<Self, Slot>
    where
        I: IntoIterator<Item = (Slot, Rgb)>,
    {
        let mut colors: [Option<Rgb>; 16] = [None; 16];
        for (slot, color) in entries {
            colors[slot.index()] = Some(color);
        }
        let mut out = [Rgb::new(0, 0, 0); 16];
        for slot in Slot::ALL {
            out[slot.index()] = colors[slot.index()].ok_or(slot)?;
        }
        Ok(Self { colors: out })
    }

    pub fn get(&self, slot: Slot) -> Rgb {
        self.colors[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, Rgb)> + '_ {
        Slot::ALL.iter().map(move |slot| (*slot, self.get(*slot)))
    }

    /// Closest slot to `color`; earlier slots win exact ties.
    pub fn closest_slot(&self, color: Rgb) -> (Slot, f64) {
        let mut best = (Slot::Base00, f64::INFINITY);
        for (slot, candidate) in self.iter() {
            let dist = color.distance(candidate);
            if dist < best.1 {
                best = (slot, dist);
            }
        }
        best
    }

    /// Closest slot when strictly within `acceptance`, else `None`
    /// (the color is treated as blended/derived rather than slot-sourced).
    pub fn derived_slot(&self, color: Rgb, acceptance: f64) -> Option<Slot> {
        let (slot, dist) = self.closest_slot(color);
        (dist < acceptance).then_some(slot)
    }

    /// Sum of per-slot RGB distances.
    pub fn distance(&self, other: &Palette) -> f64 {
        Slot::ALL
            .iter()
            .map(|slot| self.get(*slot).distance(other.get(*slot)))
            .sum()
    }
}

/// Category grouping for extended fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldCategory {
    Diagnostic,
    Syntax,
    Ui,
    Git,
}

impl FieldCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Diagnostic => "diagnostic",
            Self::Syntax => "syntax",
            Self::Ui => "ui",
            Self::Git => "git",
        }
    }
}

/// Semantic color roles of the extended palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExtendedField {
    DiagnosticError,
    DiagnosticWarning,
    DiagnosticInfo,
    DiagnosticHint,
    DiagnosticOk,
    SyntaxComment,
    SyntaxString,
    SyntaxFunction,
    SyntaxKeyword,
    SyntaxType,
    SyntaxNumber,
    SyntaxConstant,
    SyntaxOperator,
    SyntaxVariable,
    SyntaxParameter,
    SyntaxPreproc,
    SyntaxSpecial,
    UiAccent,
    UiBorder,
    UiSelection,
    UiFloatBg,
    UiCursorLine,
    GitAdd,
    GitChange,
    GitDelete,
}

impl ExtendedField {
    pub const ALL: [ExtendedField; 25] = [
        Self::DiagnosticError,
        Self::DiagnosticWarning,
        Self::DiagnosticInfo,
        Self::DiagnosticHint,
        Self::DiagnosticOk,
        Self::SyntaxComment,
        Self::SyntaxString,
        Self::SyntaxFunction,
        Self::SyntaxKeyword,
        Self::SyntaxType,
        Self::SyntaxNumber,
        Self::SyntaxConstant,
        Self::SyntaxOperator,
        Self::SyntaxVariable,
        Self::SyntaxParameter,
        Self::SyntaxPreproc,
        Self::SyntaxSpecial,
        Self::UiAccent,
        Self::UiBorder,
        Self::UiSelection,
        Self::UiFloatBg,
        Self::UiCursorLine,
        Self::GitAdd,
        Self::GitChange,
        Self::GitDelete,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::DiagnosticError => "diagnostic_error",
            Self::DiagnosticWarning => "diagnostic_warning",
            Self::DiagnosticInfo => "diagnostic_info",
            Self::DiagnosticHint => "diagnostic_hint",
            Self::DiagnosticOk => "diagnostic_ok",
            Self::SyntaxComment => "syntax_comment",
            Self::SyntaxString => "syntax_string",
            Self::SyntaxFunction => "syntax_function",
            Self::SyntaxKeyword => "syntax_keyword",
            Self::SyntaxType => "syntax_type",
            Self::SyntaxNumber => "syntax_number",
            Self::SyntaxConstant => "syntax_constant",
            Self::SyntaxOperator => "syntax_operator",
            Self::SyntaxVariable => "syntax_variable",
            Self::SyntaxParameter => "syntax_parameter",
            Self::SyntaxPreproc => "syntax_preproc",
            Self::SyntaxSpecial => "syntax_special",
            Self::UiAccent => "ui_accent",
            Self::UiBorder => "ui_border",
            Self::UiSelection => "ui_selection",
            Self::UiFloatBg => "ui_float_bg",
            Self::UiCursorLine => "ui_cursor_line",
            Self::GitAdd => "git_add",
            Self::GitChange => "git_change",
            Self::GitDelete => "git_delete",
        }
    }

    pub fn category(self) -> FieldCategory {
        match self {
            Self::DiagnosticError
            | Self::DiagnosticWarning
            | Self::DiagnosticInfo
            | Self::DiagnosticHint
            | Self::DiagnosticOk => FieldCategory::Diagnostic,
            Self::SyntaxComment
            | Self::SyntaxString
            | Self::SyntaxFunction
            | Self::SyntaxKeyword
            | Self::SyntaxType
            | Self::SyntaxNumber
            | Self::SyntaxConstant
            | Self::SyntaxOperator
            | Self::SyntaxVariable
            | Self::SyntaxParameter
            | Self::SyntaxPreproc
            | Self::SyntaxSpecial => FieldCategory::Syntax,
            Self::UiAccent
            | Self::UiBorder
            | Self::UiSelection
            | Self::UiFloatBg
            | Self::UiCursorLine => FieldCategory::Ui,
            Self::GitAdd | Self::GitChange | Self::GitDelete => FieldCategory::Git,
        }
    }

    /// Slot a field falls back to when nothing better is known.
    pub fn conventional_slot(self) -> Slot {
        match self {
            Self::DiagnosticError => Slot::Base08,
            Self::DiagnosticWarning => Slot::Base0A,
            Self::DiagnosticInfo => Slot::Base0C,
            Self::DiagnosticHint => Slot::Base0E,
            Self::DiagnosticOk => Slot::Base0B,
            Self::SyntaxComment => Slot::Base04,
            Self::SyntaxString => Slot::Base0C,
            Self::SyntaxFunction => Slot::Base09,
            Self::SyntaxKeyword => Slot::Base0B,
            Self::SyntaxType => Slot::Base0C,
            Self::SyntaxNumber => Slot::Base09,
            Self::SyntaxConstant => Slot::Base0A,
            Self::SyntaxOperator => Slot::Base04,
            Self::SyntaxVariable => Slot::Base05,
            Self::SyntaxParameter => Slot::Base0D,
            Self::SyntaxPreproc => Slot::Base0E,
            Self::SyntaxSpecial => Slot::Base0C,
            Self::UiAccent => Slot::Base0C,
            Self::UiBorder => Slot::Base03,
            Self::UiSelection => Slot::Base02,
            Self::UiFloatBg => Slot::Base01,
            Self::UiCursorLine => Slot::Base01,
            Self::GitAdd => Slot::Base0B,
            Self::GitChange => Slot::Base09,
            Self::GitDelete => Slot::Base08,
        }
    }
}

impl fmt::Display for ExtendedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ExtendedField {
    type Err = UnknownKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.key() == normalized)
            .ok_or_else(|| UnknownKeyError::new(KeyKind::Field, s))
    }
}

impl TryFrom<String> for ExtendedField {
    type Error = UnknownKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExtendedField> for String {
    fn from(value: ExtendedField) -> Self {
        value.key().to_string()
    }
}

/// Field-to-color map. Ground truth may be partial; generated output is
/// always complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtendedPalette {
    colors: BTreeMap<ExtendedField, Rgb>,
}

impl ExtendedPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: ExtendedField, color: Rgb) {
        self.colors.insert(field, color);
    }

    pub fn get(&self, field: ExtendedField) -> Option<Rgb> {
        self.colors.get(&field).copied()
    }

    pub fn contains(&self, field: ExtendedField) -> bool {
        self.colors.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// All 25 fields present.
    pub fn is_complete(&self) -> bool {
        self.colors.len() == ExtendedField::ALL.len()
    }

    /// The corpus convention for "this theme has an extended palette".
    pub fn is_labeled(&self) -> bool {
        self.contains(ExtendedField::DiagnosticError)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExtendedField, Rgb)> + '_ {
        self.colors.iter().map(|(field, color)| (*field, *color))
    }
}

impl FromIterator<(ExtendedField, Rgb)> for ExtendedPalette {
    fn from_iter<T: IntoIterator<Item = (ExtendedField, Rgb)>>(iter: T) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}
