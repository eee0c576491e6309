//! Nearest-neighbor inference: borrow the field-to-slot mapping of the most
//! similar labeled palette and apply it to the target's own slots.

use crate::corpus::{Corpus, LabeledTheme};
use crate::error::InferenceError;
use crate::palette::{ExtendedField, ExtendedPalette, Palette, Slot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tunables for [`NeighborInferer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborOptions {
    /// Looser than the learner's: a mapping only needs the right slot, not
    /// a faithful color.
    pub acceptance_threshold: f64,
    /// Theme ids never used as neighbors.
    pub deny_list: BTreeSet<String>,
}

impl Default for NeighborOptions {
    fn default() -> Self {
        Self {
            acceptance_threshold: 100.0,
            deny_list: BTreeSet::new(),
        }
    }
}

/// Field-to-slot assignments learned from one theme.
pub type SlotMapping = BTreeMap<ExtendedField, Slot>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborPrediction {
    pub neighbor: String,
    pub distance: f64,
    pub mapping: SlotMapping,
    pub palette: ExtendedPalette,
}

#[derive(Debug, Clone)]
pub struct NeighborInferer<'a> {
    corpus: &'a Corpus,
    options: NeighborOptions,
}

impl<'a> NeighborInferer<'a> {
    pub fn new(corpus: &'a Corpus, options: NeighborOptions) -> Self {
        Self { corpus, options }
    }

    /// Closest eligible labeled theme. `exclude` names the query theme in
    /// leave-one-out runs. Distance ties go to the first id.
    pub fn nearest(
        &self,
        target: &Palette,
        exclude: Option<&str>,
    ) -> Option<(&'a LabeledTheme, f64)> {
        let mut best: Option<(&LabeledTheme, f64)> = None;
        for theme in self.corpus.labeled() {
            if Some(theme.id()) == exclude || self.options.deny_list.contains(theme.id()) {
                continue;
            }
            let distance = target.distance(theme.palette());
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((theme, distance));
            }
        }
        best
    }

    /// Predict an extended palette for `target`.
    pub fn infer(
        &self,
        target: &Palette,
        exclude: Option<&str>,
    ) -> Result<NeighborPrediction, InferenceError> {
        let (neighbor, distance) = self.nearest(target, exclude).ok_or_else(|| {
            InferenceError::NoNeighbor {
                theme: exclude.unwrap_or("<palette>").to_string(),
            }
        })?;
        let mapping = learn_mapping(neighbor, self.options.acceptance_threshold);
        tracing::debug!(
            neighbor = neighbor.id(),
            distance,
            fields = mapping.len(),
            "selected neighbor"
        );
        let palette = apply_mapping(&mapping, target);
        Ok(NeighborPrediction {
            neighbor: neighbor.id().to_string(),
            distance,
            mapping,
            palette,
        })
    }
}

/// For every ground-truth field of `theme`, the theme's own closest slot,
/// when within `acceptance_threshold`.
pub fn learn_mapping(theme: &LabeledTheme, acceptance_threshold: f64) -> SlotMapping {
    let Some(truth) = theme.ground_truth() else {
        return SlotMapping::new();
    };
    truth
        .iter()
        .filter_map(|(field, color)| {
            theme
                .palette()
                .derived_slot(color, acceptance_threshold)
                .map(|slot| (field, slot))
        })
        .collect()
}

/// Read each mapped slot from `target`.
pub fn apply_mapping(mapping: &SlotMapping, target: &Palette) -> ExtendedPalette {
    mapping
        .iter()
        .map(|(field, slot)| (*field, target.get(*slot)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::testsupport::{gruvbox_dark_hard, labeled, labeled_with, palette_with};

    fn corpus() -> Corpus {
        let base = gruvbox_dark_hard();
        let near = palette_with(&[(Slot::Base00, Rgb::new(0x20, 0x20, 0x20))]);
        let far = palette_with(&[
            (Slot::Base00, Rgb::new(0xff, 0xff, 0xff)),
            (Slot::Base07, Rgb::new(0x00, 0x00, 0x00)),
        ]);
        Corpus::new(vec![
            labeled("base", base),
            labeled("near", near),
            labeled("far", far),
        ])
    }

    #[test]
    fn nearest_excludes_the_query_theme() {
        let corpus = corpus();
        let inferer = NeighborInferer::new(&corpus, NeighborOptions::default());
        let target = gruvbox_dark_hard();
        let (self_match, d) = inferer.nearest(&target, None).unwrap();
        assert_eq!(self_match.id(), "base");
        assert_eq!(d, 0.0);
        let (other, _) = inferer.nearest(&target, Some("base")).unwrap();
        assert_eq!(other.id(), "near");
    }

    #[test]
    fn deny_list_removes_candidates() {
        let corpus = corpus();
        let options = NeighborOptions {
            deny_list: ["near".to_string()].into_iter().collect(),
            ..NeighborOptions::default()
        };
        let inferer = NeighborInferer::new(&corpus, options);
        let prediction = inferer.infer(&gruvbox_dark_hard(), Some("base")).unwrap();
        assert_eq!(prediction.neighbor, "far");
    }

    #[test]
    fn no_eligible_neighbor_is_an_error() {
        let corpus = Corpus::new(vec![labeled("only", gruvbox_dark_hard())]);
        let inferer = NeighborInferer::new(&corpus, NeighborOptions::default());
        let err = inferer.infer(&gruvbox_dark_hard(), Some("only")).unwrap_err();
        assert_eq!(
            err,
            InferenceError::NoNeighbor {
                theme: "only".into()
            }
        );
    }

    #[test]
    fn distance_ties_go_to_first_id() {
        let p = gruvbox_dark_hard();
        let corpus = Corpus::new(vec![labeled("b", p), labeled("a", p)]);
        let inferer = NeighborInferer::new(&corpus, NeighborOptions::default());
        assert_eq!(inferer.nearest(&p, None).unwrap().0.id(), "a");
    }

    #[test]
    fn mapping_is_applied_to_target_slots() {
        let source = gruvbox_dark_hard();
        let truth: ExtendedPalette = [
            (ExtendedField::DiagnosticError, source.get(Slot::Base08)),
            (ExtendedField::UiAccent, source.get(Slot::Base0E)),
        ]
        .into_iter()
        .collect();
        let corpus = Corpus::new(vec![labeled_with("src", source, truth)]);
        let target = palette_with(&[(Slot::Base0E, Rgb::new(0xaa, 0x55, 0xee))]);
        let inferer = NeighborInferer::new(&corpus, NeighborOptions::default());
        let prediction = inferer.infer(&target, None).unwrap();
        assert_eq!(prediction.mapping.len(), 2);
        assert_eq!(
            prediction.palette.get(ExtendedField::UiAccent),
            Some(Rgb::new(0xaa, 0x55, 0xee))
        );
        assert!(!prediction.palette.contains(ExtendedField::GitAdd));
    }

    #[test]
    fn colors_beyond_acceptance_are_not_mapped() {
        let source = gruvbox_dark_hard();
        let truth: ExtendedPalette = [
            (ExtendedField::DiagnosticError, source.get(Slot::Base08)),
            (ExtendedField::UiAccent, Rgb::new(0, 0, 255)),
        ]
        .into_iter()
        .collect();
        let theme = labeled_with("src", source, truth);
        let mapping = learn_mapping(&theme, 100.0);
        assert_eq!(mapping.get(&ExtendedField::DiagnosticError), Some(&Slot::Base08));
        assert!(!mapping.contains_key(&ExtendedField::UiAccent));
    }

    #[test]
    fn leave_one_out_never_returns_self() {
        let corpus = corpus();
        let inferer = NeighborInferer::new(&corpus, NeighborOptions::default());
        for theme in corpus.labeled() {
            let prediction = inferer.infer(theme.palette(), Some(theme.id())).unwrap();
            assert_ne!(prediction.neighbor, theme.id());
        }
    }
}
