//! Binary-local application orchestration.
//!
//! `entry` loads configuration and dispatches; `commands` holds one module per
//! group of subcommands so the entrypoint stays small.

pub(crate) mod commands;
pub(crate) mod entry;
