//! Production inference: evaluate a frozen [`RuleSet`] against a palette.

use crate::color::Rgb;
use crate::features::FeatureVector;
use crate::palette::{ExtendedField, ExtendedPalette, Palette, Slot};
use crate::rules::{FieldRule, RuleSet};

/// Applies a rule set field by field.
///
/// Holds no mutable state, so one instance can serve any number of
/// concurrent callers.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBasedGenerator {
    rules: RuleSet,
}

/// Why a field got the color it did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecision {
    pub field: ExtendedField,
    pub rule: FieldRule,
    pub slot: Slot,
    pub color: Rgb,
}

impl RuleBasedGenerator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn builtin() -> Self {
        Self::new(RuleSet::builtin())
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Complete extended palette for `palette`. Pure and deterministic.
    pub fn generate(&self, palette: &Palette) -> ExtendedPalette {
        self.explain(palette)
            .into_iter()
            .map(|decision| (decision.field, decision.color))
            .collect()
    }

    /// Per-field decisions in field order, for previews and debugging.
    pub fn explain(&self, palette: &Palette) -> Vec<FieldDecision> {
        let features = FeatureVector::extract(palette);
        ExtendedField::ALL
            .iter()
            .map(|field| {
                let rule = self.rules.rule(*field);
                let slot = rule.resolve(&features);
                FieldDecision {
                    field: *field,
                    rule,
                    slot,
                    color: palette.get(slot),
                }
            })
            .collect()
    }
}

impl Default for RuleBasedGenerator {
    fn default() -> Self {
        Self::builtin()
    }
}

/// [`RuleBasedGenerator::generate`] with the built-in rule set.
pub fn generate(palette: &Palette) -> ExtendedPalette {
    RuleBasedGenerator::builtin().generate(palette)
}
