//! Batch operations over a themes directory: mark hand-authored extended
//! palettes, fill in missing ones, and regenerate generated ones.
//!
//! A theme tagged `plugin`, or carrying an extended palette with no tag at
//! all, is never written unless `force` is set.

use crate::corpus::ExtendedSource;
use crate::error::ThemeError;
use crate::generator::RuleBasedGenerator;
use crate::store::{self, ThemeDocument, ThemeEntry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Tag untagged extended palettes as `plugin`.
    MarkExisting,
    /// Fill themes with no extended palette.
    Generate,
    /// `Generate`, plus recompute every `generated` theme.
    Regenerate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub dry_run: bool,
    /// Also overwrite `plugin` and untagged themes.
    pub force: bool,
}

/// What happens to one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    SkipNoBase16,
    Mark,
    SkipProtected,
    SkipUnmarked,
    Generate,
    Regenerate,
    Unchanged,
}

impl SyncAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::SkipNoBase16 => "skip (no base16)",
            Self::Mark => "mark plugin",
            Self::SkipProtected => "skip (plugin)",
            Self::SkipUnmarked => "skip (unmarked)",
            Self::Generate => "generate",
            Self::Regenerate => "regenerate",
            Self::Unchanged => "unchanged",
        }
    }

    pub fn writes(self) -> bool {
        matches!(self, Self::Mark | Self::Generate | Self::Regenerate)
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decide the action for one loaded document.
pub fn plan(doc: &ThemeDocument, mode: SyncMode, force: bool) -> SyncAction {
    if doc.palette().is_err() {
        return SyncAction::SkipNoBase16;
    }
    let has_extended = doc.has_extended();
    // An unreadable tag is treated like `plugin`.
    let source = doc.source().unwrap_or(Some(ExtendedSource::Plugin));

    if mode == SyncMode::MarkExisting {
        return if has_extended && source.is_none() {
            SyncAction::Mark
        } else {
            SyncAction::Unchanged
        };
    }

    if !force {
        if source == Some(ExtendedSource::Plugin) {
            return SyncAction::SkipProtected;
        }
        if has_extended && source.is_none() {
            return SyncAction::SkipUnmarked;
        }
    }
    if !has_extended {
        return SyncAction::Generate;
    }
    if mode == SyncMode::Regenerate {
        return SyncAction::Regenerate;
    }
    SyncAction::Unchanged
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedChange {
    pub theme: String,
    pub path: PathBuf,
    pub action: SyncAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub dry_run: bool,
    pub changes: Vec<PlannedChange>,
}

impl SyncSummary {
    pub fn counts(&self) -> BTreeMap<SyncAction, usize> {
        let mut counts = BTreeMap::new();
        for change in &self.changes {
            *counts.entry(change.action).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, action: SyncAction) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }

    /// Changes that were (or in a dry run, would be) written.
    pub fn written(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes.iter().filter(|c| c.action.writes())
    }
}

/// Plan and, unless `dry_run`, apply `mode` to every entry.
///
/// Documents that fail to load are reported as `SkipNoBase16`; only write
/// failures abort the run.
pub fn run(
    entries: &[ThemeEntry],
    generator: &RuleBasedGenerator,
    mode: SyncMode,
    options: SyncOptions,
) -> Result<SyncSummary, ThemeError> {
    let mut summary = SyncSummary {
        dry_run: options.dry_run,
        changes: Vec::with_capacity(entries.len()),
    };
    for entry in entries {
        let doc = match ThemeDocument::load(entry.id.clone(), &entry.path) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(theme = %entry.id, error = %e, "unreadable theme");
                None
            }
        };
        let action = doc
            .as_ref()
            .map_or(SyncAction::SkipNoBase16, |doc| plan(doc, mode, options.force));
        tracing::info!(theme = %entry.id, action = %action, dry_run = options.dry_run, "sync");

        let action = match (doc, options.dry_run) {
            (Some(mut doc), false) => apply(&mut doc, action, generator)?,
            _ => action,
        };
        summary.changes.push(PlannedChange {
            theme: entry.id.clone(),
            path: entry.path.clone(),
            action,
        });
    }
    Ok(summary)
}

/// Carry out `action` and return what actually happened.
fn apply(
    doc: &mut ThemeDocument,
    action: SyncAction,
    generator: &RuleBasedGenerator,
) -> Result<SyncAction, ThemeError> {
    match action {
        SyncAction::Mark => {
            if !store::mark_source(doc.path(), ExtendedSource::Plugin)? {
                tracing::warn!(theme = %doc.id(), "no line to tag, left unmarked");
                return Ok(SyncAction::Unchanged);
            }
        }
        SyncAction::Generate | SyncAction::Regenerate => {
            let extended = generator.generate(&doc.palette()?);
            doc.set_extended(&extended, ExtendedSource::Generated);
            doc.save()?;
        }
        SyncAction::SkipNoBase16
        | SyncAction::SkipProtected
        | SyncAction::SkipUnmarked
        | SyncAction::Unchanged => {}
    }
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::palette::ExtendedPalette;
    use crate::testsupport::{gruvbox_dark_hard, theme_yaml, TestTempDir};
    use std::path::Path;

    fn doc_with(source: Option<ExtendedSource>, extended: bool) -> ThemeDocument {
        let p = gruvbox_dark_hard();
        let ext = generate(&p);
        let text = theme_yaml("t", &p, source, extended.then_some(&ext));
        ThemeDocument::parse("t", Path::new("t/theme.yml"), &text).unwrap()
    }

    #[test]
    fn plan_generate_mode() {
        use ExtendedSource::{Generated, Plugin};
        let cases = [
            (Some(Plugin), true, SyncAction::SkipProtected),
            (None, true, SyncAction::SkipUnmarked),
            (Some(Generated), true, SyncAction::Unchanged),
            (None, false, SyncAction::Generate),
            (Some(Generated), false, SyncAction::Generate),
        ];
        for (source, extended, expected) in cases {
            let doc = doc_with(source, extended);
            let action = plan(&doc, SyncMode::Generate, false);
            assert_eq!(action, expected, "{source:?} {extended}");
        }
    }

    #[test]
    fn plan_regenerate_mode_respects_force() {
        use ExtendedSource::{Generated, Plugin};
        let regen = |source, extended, force| {
            plan(&doc_with(source, extended), SyncMode::Regenerate, force)
        };
        assert_eq!(regen(Some(Generated), true, false), SyncAction::Regenerate);
        assert_eq!(regen(Some(Plugin), true, false), SyncAction::SkipProtected);
        assert_eq!(regen(None, true, false), SyncAction::SkipUnmarked);
        assert_eq!(regen(Some(Plugin), true, true), SyncAction::Regenerate);
        assert_eq!(regen(None, true, true), SyncAction::Regenerate);
        assert_eq!(regen(None, false, false), SyncAction::Generate);
    }

    #[test]
    fn plan_mark_existing_mode() {
        use ExtendedSource::Plugin;
        let mark = |source, extended| {
            plan(&doc_with(source, extended), SyncMode::MarkExisting, false)
        };
        assert_eq!(mark(None, true), SyncAction::Mark);
        assert_eq!(mark(Some(Plugin), true), SyncAction::Unchanged);
        assert_eq!(mark(None, false), SyncAction::Unchanged);
    }

    #[test]
    fn plan_skips_documents_without_base16() {
        let doc = ThemeDocument::parse("t", Path::new("t"), "meta:\n  name: x\n").unwrap();
        assert_eq!(plan(&doc, SyncMode::Generate, true), SyncAction::SkipNoBase16);
    }

    #[test]
    fn unknown_source_tag_is_protected() {
        let text = format!(
            "{}extended_source: handmade\n",
            theme_yaml("t", &gruvbox_dark_hard(), None, None)
        );
        let doc = ThemeDocument::parse("t", Path::new("t"), &text).unwrap();
        assert_eq!(plan(&doc, SyncMode::Generate, false), SyncAction::SkipProtected);
    }

    fn fixture() -> (TestTempDir, Vec<ThemeEntry>) {
        let dir = TestTempDir::new("sync");
        let p = gruvbox_dark_hard();
        let ext = generate(&p);
        let stale: ExtendedPalette = ext
            .iter()
            .map(|(field, _)| (field, crate::color::Rgb::new(1, 2, 3)))
            .collect();
        dir.write_theme("fresh", &theme_yaml("fresh", &p, None, None));
        let plugin = Some(ExtendedSource::Plugin);
        let generated = Some(ExtendedSource::Generated);
        dir.write_theme("hand", &theme_yaml("hand", &p, plugin, Some(&ext)));
        dir.write_theme("old", &theme_yaml("old", &p, generated, Some(&stale)));
        dir.write_theme("untagged", &theme_yaml("untagged", &p, None, Some(&ext)));
        dir.write_theme("broken", "meta:\n  name: broken\n");
        let entries = store::discover(dir.path()).unwrap();
        (dir, entries)
    }

    fn read(dir: &TestTempDir, id: &str) -> String {
        std::fs::read_to_string(dir.child(&format!("{id}/theme.yml"))).unwrap()
    }

    #[test]
    fn dry_run_writes_nothing() {
        let (dir, entries) = fixture();
        let before: Vec<String> = entries.iter().map(|e| read(&dir, &e.id)).collect();
        let options = SyncOptions {
            dry_run: true,
            force: true,
        };
        let generator = RuleBasedGenerator::builtin();
        let summary = run(&entries, &generator, SyncMode::Regenerate, options).unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.written().count(), 4);
        let after: Vec<String> = entries.iter().map(|e| read(&dir, &e.id)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn regenerate_updates_generated_and_spares_protected() {
        let (dir, entries) = fixture();
        let hand = read(&dir, "hand");
        let untagged = read(&dir, "untagged");
        let summary = run(
            &entries,
            &RuleBasedGenerator::builtin(),
            SyncMode::Regenerate,
            SyncOptions::default(),
        )
        .unwrap();
        assert_eq!(summary.count(SyncAction::Generate), 1);
        assert_eq!(summary.count(SyncAction::Regenerate), 1);
        assert_eq!(summary.count(SyncAction::SkipProtected), 1);
        assert_eq!(summary.count(SyncAction::SkipUnmarked), 1);
        assert_eq!(summary.count(SyncAction::SkipNoBase16), 1);
        assert_eq!(read(&dir, "hand"), hand);
        assert_eq!(read(&dir, "untagged"), untagged);

        let old = ThemeDocument::load("old", &dir.child("old/theme.yml")).unwrap();
        assert_eq!(old.extended().unwrap(), Some(generate(&gruvbox_dark_hard())));
        let fresh = ThemeDocument::load("fresh", &dir.child("fresh/theme.yml")).unwrap();
        assert_eq!(fresh.source().unwrap(), Some(ExtendedSource::Generated));
    }

    #[test]
    fn mark_existing_tags_only_untagged_themes() {
        let (dir, entries) = fixture();
        let summary = run(
            &entries,
            &RuleBasedGenerator::builtin(),
            SyncMode::MarkExisting,
            SyncOptions::default(),
        )
        .unwrap();
        assert_eq!(summary.count(SyncAction::Mark), 1);
        let untagged = ThemeDocument::load("untagged", &dir.child("untagged/theme.yml")).unwrap();
        assert_eq!(untagged.source().unwrap(), Some(ExtendedSource::Plugin));
        let counts = summary.counts();
        assert_eq!(counts.get(&SyncAction::Unchanged), Some(&3));
    }

    #[test]
    fn mark_existing_fills_an_empty_tag_once() {
        let dir = TestTempDir::new("sync-null-tag");
        let text = "extended_source:\nextended:\n  diagnostic_error: \"#fb4934\"\n";
        let body = theme_yaml("t", &gruvbox_dark_hard(), None, None);
        dir.write_theme("t", &format!("{body}{text}"));
        let entries = store::discover(dir.path()).unwrap();
        let generator = RuleBasedGenerator::builtin();

        let first = run(&entries, &generator, SyncMode::MarkExisting, SyncOptions::default());
        let first = first.unwrap();
        assert_eq!(first.count(SyncAction::Mark), 1);
        let doc = ThemeDocument::load("t", &dir.child("t/theme.yml")).unwrap();
        assert_eq!(doc.source().unwrap(), Some(ExtendedSource::Plugin));

        let second = run(&entries, &generator, SyncMode::MarkExisting, SyncOptions::default());
        assert_eq!(second.unwrap().written().count(), 0);
        let generate = run(&entries, &generator, SyncMode::Generate, SyncOptions::default());
        assert_eq!(generate.unwrap().count(SyncAction::SkipProtected), 1);
    }

    #[test]
    fn mark_that_finds_no_line_is_reported_unchanged() {
        let dir = TestTempDir::new("sync-quoted");
        let body = theme_yaml("t", &gruvbox_dark_hard(), None, None);
        // A quoted key parses as `extended` but has no plain line to tag above.
        let quoted = "\"extended\":\n  diagnostic_error: \"#fb4934\"\n";
        dir.write_theme("t", &format!("{body}{quoted}"));
        let entries = store::discover(dir.path()).unwrap();
        let before = read(&dir, "t");
        let summary = run(
            &entries,
            &RuleBasedGenerator::builtin(),
            SyncMode::MarkExisting,
            SyncOptions::default(),
        )
        .unwrap();
        assert_eq!(summary.count(SyncAction::Unchanged), 1);
        assert_eq!(summary.written().count(), 0);
        assert_eq!(read(&dir, "t"), before);
    }
}
