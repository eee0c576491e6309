//! Terminal rendering for command output.
//!
//! Every `render_*` function returns the full text so callers decide where it
//! goes; styling is applied only when `color` is set, so the plain output is
//! stable enough to assert on.

use crate::corpus::ExtendedSource;
use crate::color::Rgb;
use crate::features::FeatureVector;
use crate::generator::FieldDecision;
use crate::learner::{DefaultReason, FieldLearning, LearnedRules};
use crate::palette::Palette;
use crate::sync::{SyncAction, SyncSummary};
use crate::validation::{Drift, Tally, ValidationReport};
use crossterm::style::{Color, Stylize};

const INDENT: &str = "  ";
const FIELD_WIDTH: usize = 20;

/// Status and diagnostic lines written to stderr.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", "warning:".with(Color::Yellow).bold());
        } else {
            eprintln!("warning: {msg}");
        }
    }

    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", "error:".with(Color::Red).bold());
        } else {
            eprintln!("error: {msg}");
        }
    }

    /// Print rendered report text to stdout.
    pub fn print(&self, text: &str) {
        print!("{text}");
    }
}

/// Styling helpers shared by the render functions.
#[derive(Debug, Clone, Copy)]
struct Paint {
    color: bool,
}

impl Paint {
    fn title(self, text: &str) -> String {
        if self.color {
            format!("{} {}", "•".with(Color::DarkGrey), text.bold())
        } else {
            format!("{text}:")
        }
    }

    fn key(self, text: &str) -> String {
        if self.color {
            text.with(Color::Cyan).to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(self, text: &str) -> String {
        if self.color {
            text.with(Color::DarkGrey).to_string()
        } else {
            text.to_string()
        }
    }

    fn tone(self, text: &str, ok: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let color = if ok { Color::Green } else { Color::Yellow };
        text.with(color).to_string()
    }

    /// A two-cell block of `rgb`; empty without color.
    fn swatch(self, rgb: Rgb) -> String {
        if self.color {
            format!(
                "{} ",
                "  ".on(Color::Rgb {
                    r: rgb.r,
                    g: rgb.g,
                    b: rgb.b
                })
            )
        } else {
            String::new()
        }
    }
}

fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn tally_line(tally: &Tally) -> String {
    format!(
        "{} exact, {} close, {} different ({})",
        tally.exact,
        tally.close,
        tally.different,
        percent(tally.accuracy())
    )
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

pub fn render_sync(summary: &SyncSummary, color: bool) -> String {
    let paint = Paint { color };
    let mut lines = Vec::new();
    let title = if summary.dry_run {
        "sync (dry run)"
    } else {
        "sync"
    };
    lines.push(paint.title(title));
    for change in &summary.changes {
        if change.action == SyncAction::Unchanged {
            continue;
        }
        let label = format!("{:<18}", change.action.label());
        lines.push(format!(
            "{INDENT}{} {}",
            paint.tone(&label, change.action.writes()),
            change.theme
        ));
    }
    let counts = summary
        .counts()
        .into_iter()
        .map(|(action, n)| format!("{n} {}", action.label()))
        .collect::<Vec<_>>();
    if counts.is_empty() {
        lines.push(format!("{INDENT}{}", paint.dim("no themes")));
    } else {
        lines.push(format!("{INDENT}{}", paint.dim(&counts.join(", "))));
    }
    finish(lines)
}

// ---------------------------------------------------------------------------
// learn / analyze
// ---------------------------------------------------------------------------

fn describe_reason(reason: DefaultReason) -> String {
    match reason {
        DefaultReason::NoData => "no slot-derived data".to_string(),
        DefaultReason::Unanimous => "unanimous".to_string(),
        DefaultReason::Dominant { share } => format!("dominant at {}", percent(share)),
        DefaultReason::TooFewSamples { count } => format!("only {count} samples"),
        DefaultReason::MinorityTooSmall { count } => format!("minority of {count}"),
        DefaultReason::NoSeparatingFeature => "no separating feature".to_string(),
    }
}

fn tallies(learning: &FieldLearning) -> String {
    if learning.tallies.is_empty() {
        return "-".to_string();
    }
    learning
        .tallies
        .iter()
        .map(|t| format!("{} {}", t.slot, t.count))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_learned(learned: &LearnedRules, color: bool) -> String {
    let paint = Paint { color };
    let mut lines = vec![paint.title("learned rules")];
    for learning in &learned.report {
        let key = format!("{:<FIELD_WIDTH$}", learning.field.key());
        let mut line = format!("{INDENT}{} {}", paint.key(&key), learning.rule);
        if let Some(reason) = learning.reason {
            line.push_str(&paint.dim(&format!("  [{}]", describe_reason(reason))));
        }
        lines.push(line);
    }
    finish(lines)
}

/// Per-field slot-choice frequencies.
pub fn render_frequencies(report: &[FieldLearning], color: bool) -> String {
    let paint = Paint { color };
    let mut lines = vec![paint.title("slot frequencies")];
    for learning in report {
        let key = format!("{:<FIELD_WIDTH$}", learning.field.key());
        let mut line = format!("{INDENT}{} {}", paint.key(&key), tallies(learning));
        if learning.excluded > 0 {
            line.push_str(&paint.dim(&format!("  ({} off-palette)", learning.excluded)));
        }
        lines.push(line);
    }
    finish(lines)
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

pub fn render_validation(report: &ValidationReport, color: bool) -> String {
    let paint = Paint { color };
    let mut lines = vec![paint.title(&format!("validation ({})", report.strategy))];
    lines.push(format!(
        "{INDENT}{} {}",
        paint.key("overall:"),
        tally_line(&report.overall)
    ));

    lines.push(String::new());
    lines.push(paint.title("themes"));
    for outcome in &report.themes {
        let mut line = format!("{INDENT}{:<24} {}", outcome.theme, tally_line(&outcome.tally));
        if let Some(neighbor) = &outcome.neighbor {
            line.push_str(&paint.dim(&format!("  via {neighbor}")));
        }
        lines.push(line);
        for miss in &outcome.misses {
            lines.push(format!(
                "{INDENT}{INDENT}{} {} got {} want {} ({:.1})",
                paint.swatch(miss.actual),
                miss.field,
                miss.predicted,
                miss.actual,
                miss.distance
            ));
        }
    }

    let misses = report.misses_by_field();
    if !misses.is_empty() {
        lines.push(String::new());
        lines.push(paint.title("most missed"));
        for (field, count) in misses {
            let key = format!("{:<FIELD_WIDTH$}", field.key());
            lines.push(format!("{INDENT}{} {count}", paint.key(&key)));
        }
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push(paint.title("skipped"));
        for skipped in &report.skipped {
            lines.push(format!("{INDENT}{}: {}", skipped.theme, skipped.reason));
        }
    }
    finish(lines)
}

fn optional_percent(value: Option<f64>) -> String {
    value.map(percent).unwrap_or_else(|| "-".to_string())
}

/// Fields whose tally moved since the recorded baseline.
pub fn render_drift(drift: &[Drift], color: bool) -> String {
    let paint = Paint { color };
    if drift.is_empty() {
        return finish(vec![paint.tone("no drift from baseline", true)]);
    }
    let mut lines = vec![paint.title("drift from baseline")];
    for d in drift {
        let key = format!("{:<FIELD_WIDTH$}", d.field.key());
        lines.push(format!(
            "{INDENT}{} {} -> {}",
            paint.key(&key),
            optional_percent(d.recorded.map(|t| t.accuracy())),
            paint.tone(&optional_percent(d.current.map(|t| t.accuracy())), false)
        ));
    }
    finish(lines)
}

// ---------------------------------------------------------------------------
// preview / features
// ---------------------------------------------------------------------------

/// Base16 swatches followed by each generated field with the rule behind it.
pub fn render_preview(
    theme: &str,
    palette: &Palette,
    decisions: &[FieldDecision],
    source: Option<ExtendedSource>,
    color: bool,
) -> String {
    let paint = Paint { color };
    let mut lines = vec![paint.title(theme)];
    if let Some(source) = source {
        lines.push(format!(
            "{INDENT}{}",
            paint.dim(&format!("extended_source: {source}"))
        ));
    }
    for (slot, rgb) in palette.iter() {
        lines.push(format!("{INDENT}{}{slot} {rgb}", paint.swatch(rgb)));
    }

    let mut category = None;
    for decision in decisions {
        let current = decision.field.category();
        if category != Some(current) {
            category = Some(current);
            lines.push(String::new());
            lines.push(paint.title(current.label()));
        }
        let key = format!("{:<FIELD_WIDTH$}", decision.field.key());
        lines.push(format!(
            "{INDENT}{}{} {} {}  {}",
            paint.swatch(decision.color),
            paint.key(&key),
            decision.color,
            decision.slot,
            paint.dim(&decision.rule.to_string())
        ));
    }
    finish(lines)
}

pub fn render_features(theme: &str, features: &FeatureVector, color: bool) -> String {
    let paint = Paint { color };
    let mut lines = vec![paint.title(theme)];
    for (feature, value) in features.iter() {
        let key = format!("{:<14}", feature.name());
        lines.push(format!("{INDENT}{} {value:>8.2}", paint.key(&key)));
    }
    finish(lines)
}
