//! `${key}` placeholder expansion.
//!
//! A value is scanned left to right for `${name}` tokens (the name may not contain braces
//! and is trimmed). Each name is looked up, expanded recursively, and remembered for the
//! rest of the top-level call, so repeated references cost one lookup. Names with no
//! value are left in place as literal `${name}` text.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use keel_core::{KeelError, Result};
use regex::Regex;
use tracing::debug;

use crate::store::PropertyStore;

/// Longest chain of nested references followed before giving up.
pub const MAX_DEPTH: usize = 64;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{[^{}]*\}").expect("placeholder pattern compiles"));

/// Source of raw values for the resolver.
pub trait Lookup {
    fn lookup(&self, key: &str) -> Option<String>;
}

impl Lookup for PropertyStore {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get_raw(key)
    }
}

impl Lookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Lookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Expands placeholders against a [`Lookup`].
///
/// Reads go straight to the lookup on every call; a store mutated while a resolution is
/// in flight may contribute old and new values to the same result.
pub struct Resolver<'a, L: Lookup + ?Sized> {
    lookup: &'a L,
}

/// Per-call state: finished names and the chain currently being expanded.
#[derive(Default)]
struct Pass {
    resolved: HashMap<String, Option<String>>,
    active: Vec<String>,
}

impl<'a, L: Lookup + ?Sized> Resolver<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Expand every placeholder in `raw`.
    pub fn resolve(&self, raw: &str) -> Result<String> {
        self.expand(raw, &mut Pass::default())
    }

    /// Expand the raw value stored under `key`. The key itself counts as in progress, so a
    /// value that refers back to its own key is reported as a cycle starting at `key`.
    pub fn resolve_property(&self, key: &str, raw: &str) -> Result<String> {
        let mut pass = Pass {
            active: vec![key.to_string()],
            ..Pass::default()
        };
        self.expand(raw, &mut pass)
    }

    fn expand(&self, base: &str, pass: &mut Pass) -> Result<String> {
        let mut out = String::with_capacity(base.len());
        let mut last = 0;

        for token in PLACEHOLDER.find_iter(base) {
            let literal = token.as_str();
            let name = literal[2..literal.len() - 1].trim();
            out.push_str(&base[last..token.start()]);
            last = token.end();

            let value = match pass.resolved.get(name) {
                Some(done) => done.clone(),
                None => {
                    let value = self.expand_name(name, pass)?;
                    pass.resolved.insert(name.to_string(), value.clone());
                    value
                }
            };

            match value {
                Some(v) => {
                    debug!(placeholder = literal, value = %v, "replacing placeholder");
                    out.push_str(&v);
                }
                None => out.push_str(literal),
            }
        }

        out.push_str(&base[last..]);
        Ok(out)
    }

    fn expand_name(&self, name: &str, pass: &mut Pass) -> Result<Option<String>> {
        if pass.active.iter().any(|a| a == name) {
            let mut chain = pass.active.clone();
            chain.push(name.to_string());
            return Err(KeelError::CyclicReference {
                chain: chain.join(" -> "),
            });
        }
        let Some(raw) = self.lookup.lookup(name) else {
            return Ok(None);
        };
        if pass.active.len() >= MAX_DEPTH {
            return Err(KeelError::ReferenceTooDeep {
                name: name.to_string(),
                limit: MAX_DEPTH,
            });
        }
        pass.active.push(name.to_string());
        let expanded = self.expand(&raw, pass);
        pass.active.pop();
        expanded.map(Some)
    }
}
