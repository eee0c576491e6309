//! Frozen per-field decision rules and their serialized form.

use crate::error::RulesError;
use crate::features::{Feature, FeatureVector};
use crate::palette::{ExtendedField, Slot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Comparison applied to a feature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "gt")]
    Greater,
    #[serde(rename = "lt")]
    Less,
}

impl Direction {
    /// Strict comparison; a value equal to the threshold never matches.
    pub fn matches(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Greater => value > threshold,
            Self::Less => value < threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::Less => "<",
        }
    }
}

/// "If `feature` `direction` `threshold` then `slot_a` else `slot_b`."
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionRule {
    pub field: ExtendedField,
    pub slot_a: Slot,
    pub slot_b: Slot,
    pub feature: Feature,
    pub threshold: f64,
    pub direction: Direction,
    /// Fraction of training themes this rule classified correctly.
    pub training_accuracy: f64,
}

impl DecisionRule {
    pub fn choose(&self, features: &FeatureVector) -> Slot {
        if self
            .direction
            .matches(features.get(self.feature), self.threshold)
        {
            self.slot_a
        } else {
            self.slot_b
        }
    }
}

impl fmt::Display for DecisionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.1} -> {} else {} ({:.1}%)",
            self.feature,
            self.direction.symbol(),
            self.threshold,
            self.slot_a,
            self.slot_b,
            self.training_accuracy * 100.0
        )
    }
}

/// How one extended field is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRule {
    /// Every labeled theme agreed on this slot.
    Universal { slot: Slot },
    /// No discriminating rule; majority (or conventional) slot.
    Default { slot: Slot },
    Threshold(DecisionRule),
}

impl FieldRule {
    pub fn resolve(&self, features: &FeatureVector) -> Slot {
        match self {
            Self::Universal { slot } | Self::Default { slot } => *slot,
            Self::Threshold(rule) => rule.choose(features),
        }
    }

    /// The feature this rule reads, if any.
    pub fn feature(&self) -> Option<Feature> {
        match self {
            Self::Threshold(rule) => Some(rule.feature),
            Self::Universal { .. } | Self::Default { .. } => None,
        }
    }
}

impl fmt::Display for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal { slot } => write!(f, "always {slot}"),
            Self::Default { slot } => write!(f, "default {slot}"),
            Self::Threshold(rule) => rule.fmt(f),
        }
    }
}

/// Exactly one [`FieldRule`] per [`ExtendedField`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<ExtendedField, FieldRule>",
    into = "BTreeMap<ExtendedField, FieldRule>"
)]
pub struct RuleSet {
    rules: BTreeMap<ExtendedField, FieldRule>,
}

impl RuleSet {
    /// Build from a complete map. Missing fields or a threshold rule filed
    /// under the wrong field are rejected.
    pub fn from_rules(rules: BTreeMap<ExtendedField, FieldRule>) -> Result<Self, RulesError> {
        if let Some(missing) = ExtendedField::ALL
            .iter()
            .find(|field| !rules.contains_key(field))
        {
            return Err(RulesError::Missing(*missing));
        }
        for (field, rule) in &rules {
            if let FieldRule::Threshold(decision) = rule {
                if decision.field != *field {
                    return Err(RulesError::Misfiled {
                        filed: *field,
                        rule: decision.field,
                    });
                }
            }
        }
        Ok(Self { rules })
    }

    /// Build from a map the caller filled for every field.
    pub(crate) fn from_complete(rules: BTreeMap<ExtendedField, FieldRule>) -> Self {
        debug_assert!(ExtendedField::ALL.iter().all(|f| rules.contains_key(f)));
        Self { rules }
    }

    /// Rule for `field`. Always present by construction.
    pub fn rule(&self, field: ExtendedField) -> FieldRule {
        self.rules
            .get(&field)
            .copied()
            .unwrap_or(FieldRule::Default {
                slot: field.conventional_slot(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExtendedField, FieldRule)> + '_ {
        self.rules.iter().map(|(field, rule)| (*field, *rule))
    }

    /// The production rule set learned from the 18-theme reference corpus.
    pub fn builtin() -> Self {
        use Direction::{Greater as GT, Less as LT};
        use ExtendedField as F;
        use Feature::{Dist0BTo0C, Dist0DTo0C, Hue0B, Sat08};
        use Slot::{Base01, Base02, Base03, Base04, Base05, Base08, Base09};
        use Slot::{Base0A, Base0B, Base0C, Base0D, Base0E};

        let universal = [
            (F::DiagnosticError, Base08),
            (F::DiagnosticOk, Base0B),
            (F::SyntaxVariable, Base05),
            (F::GitAdd, Base0B),
            (F::GitDelete, Base08),
        ];
        let defaults = [
            (F::SyntaxOperator, Base04),
            (F::SyntaxParameter, Base0D),
            (F::SyntaxPreproc, Base0E),
            (F::SyntaxSpecial, Base0C),
            (F::UiSelection, Base02),
            (F::UiFloatBg, Base01),
            (F::UiCursorLine, Base01),
        ];
        let thresholds = [
            (F::DiagnosticWarning, Dist0BTo0C, GT, 84.0, (Base09, Base0A), 0.765),
            (F::DiagnosticInfo, Sat08, GT, 76.1, (Base0D, Base0C), 0.889),
            (F::DiagnosticHint, Dist0BTo0C, LT, 112.3, (Base0C, Base0E), 0.917),
            (F::SyntaxComment, Dist0DTo0C, GT, 49.9, (Base03, Base04), 0.824),
            (F::SyntaxString, Dist0BTo0C, LT, 112.3, (Base0B, Base0C), 0.875),
            (F::SyntaxFunction, Dist0DTo0C, GT, 49.9, (Base0D, Base09), 0.857),
            (F::SyntaxKeyword, Dist0BTo0C, LT, 112.3, (Base0E, Base0B), 0.923),
            (F::SyntaxType, Sat08, GT, 69.6, (Base0A, Base0C), 0.882),
            (F::SyntaxNumber, Hue0B, LT, 104.2, (Base0E, Base09), 0.933),
            (F::SyntaxConstant, Hue0B, GT, 85.3, (Base09, Base0A), 0.857),
            (F::UiAccent, Sat08, GT, 69.6, (Base0D, Base0C), 0.889),
            (F::UiBorder, Sat08, GT, 69.6, (Base02, Base03), 0.875),
            (F::GitChange, Dist0BTo0C, LT, 154.3, (Base0A, Base09), 0.846),
        ];

        let mut rules = BTreeMap::new();
        for (field, slot) in universal {
            rules.insert(field, FieldRule::Universal { slot });
        }
        for (field, slot) in defaults {
            rules.insert(field, FieldRule::Default { slot });
        }
        for (field, feature, direction, threshold, (slot_a, slot_b), accuracy) in thresholds {
            let rule = DecisionRule {
                field,
                slot_a,
                slot_b,
                feature,
                threshold,
                direction,
                training_accuracy: accuracy,
            };
            rules.insert(field, FieldRule::Threshold(rule));
        }

        Self { rules }
    }

    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&text).map_err(|e| RulesError::Parse(e.to_string()))
        } else {
            toml::from_str(&text).map_err(|e| RulesError::Parse(e.to_string()))
        }
    }

    pub fn to_toml(&self) -> Result<String, RulesError> {
        toml::to_string_pretty(self).map_err(|e| RulesError::Serialize(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, RulesError> {
        serde_json::to_string_pretty(self).map_err(|e| RulesError::Serialize(e.to_string()))
    }
}

impl TryFrom<BTreeMap<ExtendedField, FieldRule>> for RuleSet {
    type Error = RulesError;

    fn try_from(value: BTreeMap<ExtendedField, FieldRule>) -> Result<Self, Self::Error> {
        Self::from_rules(value)
    }
}

impl From<RuleSet> for BTreeMap<ExtendedField, FieldRule> {
    fn from(value: RuleSet) -> Self {
        value.rules
    }
}
