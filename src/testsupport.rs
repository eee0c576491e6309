//! Shared test fixtures: temp dirs, reference palettes, and theme documents.

use crate::color::Rgb;
use crate::corpus::{ExtendedSource, LabeledTheme};
use crate::generator::RuleBasedGenerator;
use crate::palette::{ExtendedPalette, Palette, Slot};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("paletteer-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }

    /// Write `<id>/theme.yml` under the fixture root.
    pub fn write_theme(&self, id: &str, yaml: &str) -> PathBuf {
        self.write_text(&format!("{id}/theme.yml"), yaml)
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const GRUVBOX_DARK_HARD: [u32; 16] = [
    0x1d2021, 0x3c3836, 0x504945, 0x665c54, 0xbdae93, 0xd5c4a1, 0xebdbb2, 0xfbf1c7, 0xfb4934,
    0xfe8019, 0xfabd2f, 0xb8bb26, 0x8ec07c, 0x83a598, 0xd3869b, 0xd65d0e,
];

fn rgb(packed: u32) -> Rgb {
    Rgb::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
}

pub fn gruvbox_dark_hard() -> Palette {
    Palette::new(GRUVBOX_DARK_HARD.map(rgb))
}

/// Gruvbox dark hard with the given slots replaced.
pub fn palette_with(overrides: &[(Slot, Rgb)]) -> Palette {
    let base = gruvbox_dark_hard();
    Palette::from_slots(base.iter().map(|(slot, color)| {
        let color = overrides
            .iter()
            .find(|(s, _)| *s == slot)
            .map_or(color, |(_, c)| *c);
        (slot, color)
    }))
    .expect("every slot present")
}

/// A theme whose ground truth is exactly what the built-in rules produce.
pub fn labeled(id: &str, palette: Palette) -> LabeledTheme {
    let extended = RuleBasedGenerator::builtin().generate(&palette);
    LabeledTheme::new(id, palette).with_extended(extended, Some(ExtendedSource::Plugin))
}

/// A theme with a hand-picked partial ground truth.
pub fn labeled_with(id: &str, palette: Palette, extended: ExtendedPalette) -> LabeledTheme {
    LabeledTheme::new(id, palette).with_extended(extended, Some(ExtendedSource::Plugin))
}

/// Render a `theme.yml` document in the corpus layout.
pub fn theme_yaml(
    name: &str,
    palette: &Palette,
    source: Option<ExtendedSource>,
    extended: Option<&ExtendedPalette>,
) -> String {
    let mut out = format!("meta:\n  name: {name}\n  variant: dark\nbase16:\n");
    for (slot, color) in palette.iter() {
        out.push_str(&format!("  {slot}: \"{color}\"\n"));
    }
    if let Some(source) = source {
        out.push_str(&format!("extended_source: {source}\n"));
    }
    if let Some(extended) = extended {
        out.push_str("extended:\n");
        for (field, color) in extended.iter() {
            out.push_str(&format!("  {field}: \"{color}\"\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
    }

    #[test]
    fn palette_with_overrides_only_named_slots() {
        let red = Rgb::new(255, 0, 0);
        let p = palette_with(&[(Slot::Base0D, red)]);
        assert_eq!(p.get(Slot::Base0D), red);
        assert_eq!(p.get(Slot::Base08), gruvbox_dark_hard().get(Slot::Base08));
    }

    #[test]
    fn theme_yaml_lists_every_slot() {
        let text = theme_yaml("g", &gruvbox_dark_hard(), None, None);
        assert!(text.contains("  base00: \"#1d2021\"\n"));
        assert!(text.contains("  base0F: \"#d65d0e\"\n"));
        assert!(!text.contains("extended"));
    }
}
