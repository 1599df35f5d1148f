//! # keel-core
//!
//! Error vocabulary shared by every crate in the keel workspace. Kept separate from
//! `keel-conf` so callers can match on failures without pulling in the registry.

pub mod error;

pub use error::{KeelError, MismatchKind, Result};
