//! Offline rule learning: one exhaustive single-feature threshold search per
//! extended field.
//!
//! For every field the learner collects the slot each labeled theme used for
//! it, then either emits a constant rule or searches every
//! `(feature, threshold, direction)` triple for the best separation of the
//! two most common slots.
//!
//! Tie-break: features are scanned in [`Feature::ALL`] order (lexicographic
//! by name), thresholds ascending, `Greater` before `Less`, and a candidate
//! only displaces the incumbent when strictly more accurate. The first
//! feature name, then the lowest threshold, then `Greater` therefore wins.

use crate::corpus::Corpus;
use crate::features::{Feature, FeatureVector};
use crate::palette::{ExtendedField, Slot};
use crate::rules::{DecisionRule, Direction, FieldRule, RuleSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables for [`RuleLearner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerOptions {
    /// A ground-truth color counts as slot-derived when strictly closer
    /// than this to its nearest slot.
    pub acceptance_threshold: f64,
    /// Top-choice share at or above which no threshold is searched.
    pub dominance_ratio: f64,
    /// Minimum observations backing the runner-up choice.
    pub min_minority: usize,
    /// Minimum slot-derived observations before a threshold is searched.
    pub min_samples: usize,
}

impl Default for LearnerOptions {
    fn default() -> Self {
        Self {
            acceptance_threshold: 50.0,
            dominance_ratio: 0.85,
            min_minority: 2,
            min_samples: 5,
        }
    }
}

/// Why a field ended up with a constant rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DefaultReason {
    /// No theme had a slot-derived color for the field.
    NoData,
    /// Every observation chose the same slot.
    Unanimous,
    Dominant { share: f64 },
    TooFewSamples { count: usize },
    MinorityTooSmall { count: usize },
    /// No feature takes more than one value across the two choices.
    NoSeparatingFeature,
}

/// How often one slot was chosen for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotTally {
    pub slot: Slot,
    pub count: usize,
}

/// Learning trace for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldLearning {
    pub field: ExtendedField,
    /// Ranked by count descending, then slot order.
    pub tallies: Vec<SlotTally>,
    /// Themes whose color for this field was not near any slot.
    pub excluded: usize,
    pub rule: FieldRule,
    pub reason: Option<DefaultReason>,
}

impl FieldLearning {
    pub fn observations(&self) -> usize {
        self.tallies.iter().map(|t| t.count).sum()
    }
}

/// A learned rule set plus the per-field trace that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnedRules {
    pub rules: RuleSet,
    pub report: Vec<FieldLearning>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleLearner {
    options: LearnerOptions,
}

struct Observation {
    features: FeatureVector,
    slot: Slot,
}

struct Candidate {
    feature: Feature,
    threshold: f64,
    direction: Direction,
    accuracy: f64,
}

impl RuleLearner {
    pub fn new(options: LearnerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LearnerOptions {
        &self.options
    }

    /// Learn one rule per extended field from the labeled themes in `corpus`.
    pub fn learn(&self, corpus: &Corpus) -> LearnedRules {
        let mut rules = BTreeMap::new();
        let mut report = Vec::with_capacity(ExtendedField::ALL.len());
        for field in ExtendedField::ALL {
            let learning = self.learn_field(corpus, field);
            tracing::debug!(field = %field, rule = %learning.rule, "learned rule");
            rules.insert(field, learning.rule);
            report.push(learning);
        }
        LearnedRules {
            rules: RuleSet::from_complete(rules),
            report,
        }
    }

    fn learn_field(&self, corpus: &Corpus, field: ExtendedField) -> FieldLearning {
        let (observations, excluded) = self.observe(corpus, field);
        let tallies = rank(&observations);
        let constant = |slot: Slot, universal: bool, reason: DefaultReason| FieldLearning {
            field,
            tallies: tallies.clone(),
            excluded,
            rule: if universal {
                FieldRule::Universal { slot }
            } else {
                FieldRule::Default { slot }
            },
            reason: Some(reason),
        };

        let Some(top) = tallies.first().copied() else {
            return constant(field.conventional_slot(), false, DefaultReason::NoData);
        };
        let total = observations.len();
        let Some(runner_up) = tallies.get(1).copied() else {
            return constant(top.slot, true, DefaultReason::Unanimous);
        };

        let share = top.count as f64 / total as f64;
        if share >= self.options.dominance_ratio {
            return constant(top.slot, false, DefaultReason::Dominant { share });
        }
        if total < self.options.min_samples {
            return constant(top.slot, false, DefaultReason::TooFewSamples { count: total });
        }
        if runner_up.count < self.options.min_minority {
            let count = runner_up.count;
            return constant(top.slot, false, DefaultReason::MinorityTooSmall { count });
        }

        let (a, b) = (top.slot, runner_up.slot);
        let subset: Vec<&Observation> = observations
            .iter()
            .filter(|obs| obs.slot == a || obs.slot == b)
            .collect();
        match best_split(&subset, a, b) {
            Some(best) => FieldLearning {
                field,
                tallies,
                excluded,
                rule: FieldRule::Threshold(DecisionRule {
                    field,
                    slot_a: a,
                    slot_b: b,
                    feature: best.feature,
                    threshold: best.threshold,
                    direction: best.direction,
                    training_accuracy: best.accuracy,
                }),
                reason: None,
            },
            None => constant(a, false, DefaultReason::NoSeparatingFeature),
        }
    }

    /// Slot-derived observations for `field`, plus the count of themes whose
    /// color was too far from every slot.
    fn observe(&self, corpus: &Corpus, field: ExtendedField) -> (Vec<Observation>, usize) {
        let mut observations = Vec::new();
        let mut excluded = 0;
        for theme in corpus.labeled() {
            let Some(color) = theme.ground_truth().and_then(|ext| ext.get(field)) else {
                continue;
            };
            match theme
                .palette()
                .derived_slot(color, self.options.acceptance_threshold)
            {
                Some(slot) => observations.push(Observation {
                    features: theme.features(),
                    slot,
                }),
                None => excluded += 1,
            }
        }
        (observations, excluded)
    }
}

fn rank(observations: &[Observation]) -> Vec<SlotTally> {
    let mut counts: BTreeMap<Slot, usize> = BTreeMap::new();
    for obs in observations {
        *counts.entry(obs.slot).or_default() += 1;
    }
    let mut tallies: Vec<SlotTally> = counts
        .into_iter()
        .map(|(slot, count)| SlotTally { slot, count })
        .collect();
    // Stable sort keeps slot order among equal counts.
    tallies.sort_by(|x, y| y.count.cmp(&x.count));
    tallies
}

fn best_split(subset: &[&Observation], a: Slot, b: Slot) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for feature in Feature::ALL {
        let mut values: Vec<f64> = subset.iter().map(|obs| obs.features.get(feature)).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            for direction in [Direction::Greater, Direction::Less] {
                let correct = subset
                    .iter()
                    .filter(|obs| {
                        let predicted = if direction.matches(obs.features.get(feature), threshold)
                        {
                            a
                        } else {
                            b
                        };
                        predicted == obs.slot
                    })
                    .count();
                let accuracy = correct as f64 / subset.len() as f64;
                if best.as_ref().map_or(true, |incumbent| accuracy > incumbent.accuracy) {
                    best = Some(Candidate {
                        feature,
                        threshold,
                        direction,
                        accuracy,
                    });
                }
            }
        }
    }
    best
}

/// Convenience wrapper around [`RuleLearner::learn`].
pub fn learn(corpus: &Corpus, options: &LearnerOptions) -> LearnedRules {
    RuleLearner::new(*options).learn(corpus)
}

/// Per-field slot-choice frequencies across the labeled corpus, without
/// learning anything. Backs the `analyze` report.
pub fn slot_frequencies(corpus: &Corpus, acceptance_threshold: f64) -> Vec<FieldLearning> {
    let options = LearnerOptions {
        acceptance_threshold,
        ..LearnerOptions::default()
    };
    RuleLearner::new(options).learn(corpus).report
}
