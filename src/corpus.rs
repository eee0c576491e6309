//! Labeled themes and the immutable corpus snapshot shared by the learner,
//! the generator's validation, and neighbor inference.

use crate::error::{KeyKind, UnknownKeyError};
use crate::features::FeatureVector;
use crate::palette::{ExtendedPalette, Palette};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

/// Provenance of a theme's extended section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtendedSource {
    /// Hand-authored. Never overwritten without an explicit force.
    Plugin,
    /// Produced by the generator; safe to regenerate.
    Generated,
}

impl ExtendedSource {
    pub fn key(self) -> &'static str {
        match self {
            Self::Plugin => "plugin",
            Self::Generated => "generated",
        }
    }
}

impl fmt::Display for ExtendedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ExtendedSource {
    type Err = UnknownKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plugin" => Ok(Self::Plugin),
            "generated" => Ok(Self::Generated),
            _ => Err(UnknownKeyError::new(KeyKind::Source, s)),
        }
    }
}

/// One theme: id, base16 palette, and optional ground truth.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTheme {
    id: String,
    palette: Palette,
    extended: Option<ExtendedPalette>,
    source: Option<ExtendedSource>,
}

impl LabeledTheme {
    pub fn new(id: impl Into<String>, palette: Palette) -> Self {
        Self {
            id: id.into(),
            palette,
            extended: None,
            source: None,
        }
    }

    pub fn with_extended(
        mut self,
        extended: ExtendedPalette,
        source: Option<ExtendedSource>,
    ) -> Self {
        self.extended = Some(extended);
        self.source = source;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The extended section as loaded, labeled or not.
    pub fn extended(&self) -> Option<&ExtendedPalette> {
        self.extended.as_ref()
    }

    /// Ground truth usable for learning and grading: an extended section
    /// that carries at least `diagnostic_error`.
    pub fn ground_truth(&self) -> Option<&ExtendedPalette> {
        self.extended.as_ref().filter(|ext| ext.is_labeled())
    }

    pub fn source(&self) -> Option<ExtendedSource> {
        self.source
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector::extract(&self.palette)
    }
}

/// Read-only collection of themes ordered by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    themes: Vec<LabeledTheme>,
}

impl Corpus {
    /// Sort by id. When ids repeat, the first occurrence is kept.
    pub fn new(mut themes: Vec<LabeledTheme>) -> Self {
        themes.sort_by(|a, b| a.id.cmp(&b.id));
        themes.dedup_by(|later, earlier| later.id == earlier.id);
        Self { themes }
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LabeledTheme> {
        self.themes
            .binary_search_by(|theme| theme.id.as_str().cmp(id))
            .ok()
            .map(|idx| &self.themes[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabeledTheme> {
        self.themes.iter()
    }

    /// Themes carrying ground truth.
    pub fn labeled(&self) -> impl Iterator<Item = &LabeledTheme> {
        self.themes
            .iter()
            .filter(|theme| theme.ground_truth().is_some())
    }

    /// A copy in which `generated` extended sections no longer count as
    /// ground truth. The themes themselves stay.
    pub fn without_generated_labels(&self) -> Corpus {
        Corpus {
            themes: self
                .themes
                .iter()
                .map(|theme| match theme.source {
                    Some(ExtendedSource::Generated) => LabeledTheme {
                        extended: None,
                        source: None,
                        ..theme.clone()
                    },
                    _ => theme.clone(),
                })
                .collect(),
        }
    }

    /// A copy without `id`, used for leave-one-out folds.
    pub fn without(&self, id: &str) -> Corpus {
        Corpus {
            themes: self
                .themes
                .iter()
                .filter(|theme| theme.id != id)
                .cloned()
                .collect(),
        }
    }
}

/// Atomically swappable corpus snapshot for long-running callers.
///
/// Readers clone an `Arc` and keep using it even while a reload installs a
/// replacement, so nobody observes a partially-loaded corpus.
#[derive(Debug, Default)]
pub struct SharedCorpus {
    current: RwLock<Arc<Corpus>>,
}

impl SharedCorpus {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            current: RwLock::new(Arc::new(corpus)),
        }
    }

    pub fn snapshot(&self) -> Arc<Corpus> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Install `corpus` and return the snapshot it replaced.
    pub fn replace(&self, corpus: Corpus) -> Arc<Corpus> {
        let next = Arc::new(corpus);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}
