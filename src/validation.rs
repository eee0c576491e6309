//! Leave-one-out grading of generated or neighbor-inferred palettes against
//! held-out ground truth.

use crate::color::Rgb;
use crate::corpus::{Corpus, LabeledTheme};
use crate::error::InferenceError;
use crate::generator::RuleBasedGenerator;
use crate::learner::{LearnerOptions, RuleLearner};
use crate::neighbor::{NeighborInferer, NeighborOptions};
use crate::palette::{ExtendedField, ExtendedPalette};
use crate::rules::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How predictions are produced for each held-out theme.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Grade one fixed rule set against every theme.
    Frozen(RuleSet),
    /// Relearn on the corpus minus the held-out theme, then generate.
    Relearn(LearnerOptions),
    Neighbor(NeighborOptions),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Frozen(_) => "rules",
            Self::Relearn(_) => "relearn",
            Self::Neighbor(_) => "neighbor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Themes removed from the training corpus or neighbor pool.
    pub exclude_from_pool: BTreeSet<String>,
    /// Themes never graded.
    pub exclude_from_grading: BTreeSet<String>,
    /// Fields to grade; `None` grades all of them.
    pub fields: Option<BTreeSet<ExtendedField>>,
    pub exact_below: f64,
    pub close_below: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            exclude_from_pool: BTreeSet::new(),
            exclude_from_grading: BTreeSet::new(),
            fields: None,
            exact_below: 1.0,
            close_below: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Exact,
    Close,
    Different,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub exact: usize,
    pub close: usize,
    pub different: usize,
}

impl Tally {
    pub fn record(&mut self, grade: Grade) {
        match grade {
            Grade::Exact => self.exact += 1,
            Grade::Close => self.close += 1,
            Grade::Different => self.different += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.exact + self.close + self.different
    }

    /// `(exact + close) / total`, or 0.0 when nothing was graded.
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.exact + self.close) as f64 / total as f64,
        }
    }

    fn merge(&mut self, other: &Tally) {
        self.exact += other.exact;
        self.close += other.close;
        self.different += other.different;
    }
}

/// One graded field of one theme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldComparison {
    pub field: ExtendedField,
    pub predicted: Rgb,
    pub actual: Rgb,
    pub distance: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeOutcome {
    pub theme: String,
    /// Set by the neighbor strategy.
    pub neighbor: Option<String>,
    pub tally: Tally,
    /// Comparisons graded `Different`.
    pub misses: Vec<FieldComparison>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTheme {
    pub theme: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub strategy: String,
    pub themes: Vec<ThemeOutcome>,
    pub fields: BTreeMap<ExtendedField, Tally>,
    pub overall: Tally,
    pub skipped: Vec<SkippedTheme>,
}

impl ValidationReport {
    /// Miss counts per field, most-missed first, then field order.
    pub fn misses_by_field(&self) -> Vec<(ExtendedField, usize)> {
        let mut misses: Vec<(ExtendedField, usize)> = self
            .fields
            .iter()
            .filter(|(_, tally)| tally.different > 0)
            .map(|(field, tally)| (*field, tally.different))
            .collect();
        misses.sort_by(|a, b| b.1.cmp(&a.1));
        misses
    }

    pub fn accuracy_by_field(&self) -> BTreeMap<ExtendedField, f64> {
        self.fields
            .iter()
            .map(|(field, tally)| (*field, tally.accuracy()))
            .collect()
    }

    pub fn baseline(&self) -> Baseline {
        Baseline {
            strategy: self.strategy.clone(),
            overall: self.overall,
            fields: self.fields.clone(),
        }
    }
}

/// Recorded grading tallies used to detect drift between runs.
///
/// Counts rather than accuracies, so a baseline read back from JSON
/// compares equal to the run that wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub strategy: String,
    pub overall: Tally,
    pub fields: BTreeMap<ExtendedField, Tally>,
}

/// A field whose tally differs from the recorded baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub field: ExtendedField,
    pub recorded: Option<Tally>,
    pub current: Option<Tally>,
}

impl Baseline {
    /// Fields whose tally is not exactly the recorded one.
    pub fn compare(&self, current: &Baseline) -> Vec<Drift> {
        let fields: BTreeSet<ExtendedField> = self
            .fields
            .keys()
            .chain(current.fields.keys())
            .copied()
            .collect();
        fields
            .into_iter()
            .filter_map(|field| {
                let recorded = self.fields.get(&field).copied();
                let now = current.fields.get(&field).copied();
                (recorded != now).then_some(Drift {
                    field,
                    recorded,
                    current: now,
                })
            })
            .collect()
    }
}

enum Predictor {
    Frozen(RuleBasedGenerator),
    Relearn(RuleLearner),
    Neighbor(NeighborOptions),
}

impl Predictor {
    fn predict(
        &self,
        pool: &Corpus,
        corpus: &Corpus,
        theme: &LabeledTheme,
    ) -> Result<(ExtendedPalette, Option<String>), InferenceError> {
        match self {
            Self::Frozen(generator) => Ok((generator.generate(theme.palette()), None)),
            Self::Relearn(learner) => {
                let learned = learner.learn(&pool.without(theme.id()));
                let generator = RuleBasedGenerator::new(learned.rules);
                Ok((generator.generate(theme.palette()), None))
            }
            Self::Neighbor(options) => {
                let inferer = NeighborInferer::new(corpus, options.clone());
                let prediction = inferer.infer(theme.palette(), Some(theme.id()))?;
                Ok((prediction.palette, Some(prediction.neighbor)))
            }
        }
    }
}

pub struct ValidationHarness<'a> {
    corpus: &'a Corpus,
    options: ValidationOptions,
}

impl<'a> ValidationHarness<'a> {
    pub fn new(corpus: &'a Corpus, options: ValidationOptions) -> Self {
        Self { corpus, options }
    }

    pub fn run(&self, strategy: &Strategy) -> ValidationReport {
        let pool = self.pool();
        let predictor = self.prepare(strategy);
        let mut report = ValidationReport {
            strategy: strategy.name().to_string(),
            themes: Vec::new(),
            fields: BTreeMap::new(),
            overall: Tally::default(),
            skipped: Vec::new(),
        };

        for theme in self.corpus.labeled() {
            if self.options.exclude_from_grading.contains(theme.id()) {
                continue;
            }
            let (predicted, neighbor) = match predictor.predict(&pool, self.corpus, theme) {
                Ok(prediction) => prediction,
                Err(e) => {
                    tracing::warn!(theme = theme.id(), error = %e, "skipping theme");
                    report.skipped.push(SkippedTheme {
                        theme: theme.id().to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let outcome = self.grade(theme, &predicted, neighbor, &mut report.fields);
            report.overall.merge(&outcome.tally);
            report.themes.push(outcome);
        }
        report
    }

    fn prepare(&self, strategy: &Strategy) -> Predictor {
        match strategy {
            Strategy::Frozen(rules) => Predictor::Frozen(RuleBasedGenerator::new(rules.clone())),
            Strategy::Relearn(options) => Predictor::Relearn(RuleLearner::new(*options)),
            Strategy::Neighbor(options) => {
                let mut options = options.clone();
                options
                    .deny_list
                    .extend(self.options.exclude_from_pool.iter().cloned());
                Predictor::Neighbor(options)
            }
        }
    }

    /// The corpus minus `exclude_from_pool`, used as training data.
    fn pool(&self) -> Corpus {
        Corpus::new(
            self.corpus
                .iter()
                .filter(|theme| !self.options.exclude_from_pool.contains(theme.id()))
                .cloned()
                .collect(),
        )
    }

    fn grade(
        &self,
        theme: &LabeledTheme,
        predicted: &ExtendedPalette,
        neighbor: Option<String>,
        fields: &mut BTreeMap<ExtendedField, Tally>,
    ) -> ThemeOutcome {
        let mut outcome = ThemeOutcome {
            theme: theme.id().to_string(),
            neighbor,
            tally: Tally::default(),
            misses: Vec::new(),
        };
        let Some(truth) = theme.ground_truth() else {
            return outcome;
        };
        for (field, predicted) in predicted.iter() {
            if let Some(selected) = &self.options.fields {
                if !selected.contains(&field) {
                    continue;
                }
            }
            let Some(actual) = truth.get(field) else {
                continue;
            };
            let distance = predicted.distance(actual);
            let grade = self.bucket(distance);
            outcome.tally.record(grade);
            fields.entry(field).or_default().record(grade);
            if grade == Grade::Different {
                outcome.misses.push(FieldComparison {
                    field,
                    predicted,
                    actual,
                    distance,
                    grade,
                });
            }
        }
        outcome
    }

    fn bucket(&self, distance: f64) -> Grade {
        if distance < self.options.exact_below {
            Grade::Exact
        } else if distance < self.options.close_below {
            Grade::Close
        } else {
            Grade::Different
        }
    }
}
