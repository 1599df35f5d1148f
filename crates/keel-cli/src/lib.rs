//! # keel-cli
//!
//! Command-line interface for inspecting keel configuration.
//!
//! ## Commands
//!
//! - `keel get <key>` — Print one property, optionally parsed with `--as`
//! - `keel list` — Print every property (expanded, or `--raw`)
//! - `keel check` — Load all sources, validate, and report the applied layers
//! - `keel version` — Show version and build info
//! - `keel completions` — Generate shell completions

pub mod commands;

pub use commands::Cli;
