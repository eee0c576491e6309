//! Paletteer: extended semantic palettes for base16 themes.
//!
//! A base16 theme defines 16 slot colors. Editors and tools want more: a
//! diagnostic warning color, a comment color, a border color. This crate
//! learns, from hand-authored themes, which slot each of those 25 extended
//! fields should reuse, and applies the learned rules to new themes.
//!
//! # Quick start
//!
//! ```no_run
//! use paletteer::generator::RuleBasedGenerator;
//! use paletteer::store::ThemeDocument;
//!
//! # fn example() -> Result<(), paletteer::error::Error> {
//! let doc = ThemeDocument::load("gruvbox", "themes/gruvbox/theme.yml".as_ref())?;
//! let extended = RuleBasedGenerator::builtin().generate(&doc.palette()?);
//! for (field, color) in extended.iter() {
//!     println!("{field}: {color}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod config;
pub mod corpus;
pub mod error;
pub mod features;
pub mod generator;
pub mod learner;
pub mod neighbor;
pub mod palette;
pub mod report;
pub mod rules;
pub mod store;
pub mod sync;
#[cfg(test)]
pub mod testsupport;
pub mod validation;
