//! Name-to-value tables for the two accessors that turn a string into a type:
//! [`ConfigEnum`] for closed sets of variants and [`ClassRegistry`] for pluggable
//! implementations chosen by logical name.

use std::collections::HashMap;
use std::fmt;

use anyhow::anyhow;
use parking_lot::RwLock;

/// An enum whose variants can be named in configuration.
///
/// Matching against [`VARIANTS`](Self::VARIANTS) is exact and case-sensitive.
pub trait ConfigEnum: Sized + Copy + 'static {
    const VARIANTS: &'static [(&'static str, Self)];

    fn from_config_str(s: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, v)| *v)
    }

    fn config_name(self) -> &'static str
    where
        Self: PartialEq,
    {
        Self::VARIANTS
            .iter()
            .find(|(_, v)| *v == self)
            .map(|(name, _)| *name)
            .unwrap_or("")
    }
}

/// Netty-style transport used by workers and clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    Nio,
    Epoll,
}

impl ConfigEnum for ChannelType {
    const VARIANTS: &'static [(&'static str, Self)] =
        &[("NIO", ChannelType::Nio), ("EPOLL", ChannelType::Epoll)];
}

impl ChannelType {
    /// Epoll where the kernel offers it, NIO everywhere else.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "linux") {
            ChannelType::Epoll
        } else {
            ChannelType::Nio
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Resolves a logical type name to something the caller can instantiate.
pub trait ClassLoader<T> {
    fn load(&self, name: &str) -> anyhow::Result<T>;
}

/// Thread-safe table of registered implementations, usually factory functions.
///
/// ```
/// use keel_conf::{ClassLoader, ClassRegistry};
///
/// let registry: ClassRegistry<fn() -> u64> = ClassRegistry::new();
/// registry.register("keel.worker.block.allocator.MaxFreeAllocator", || 1);
/// let make = registry.load("keel.worker.block.allocator.MaxFreeAllocator").unwrap();
/// assert_eq!(make(), 1);
/// ```
pub struct ClassRegistry<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T> Default for ClassRegistry<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Clone> ClassRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `name`, replacing any earlier registration.
    pub fn register(&self, name: impl Into<String>, value: T) -> &Self {
        self.entries.write().insert(name.into(), value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl<T: Clone> ClassLoader<T> for ClassRegistry<T> {
    fn load(&self, name: &str) -> anyhow::Result<T> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("no implementation registered under '{name}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_exact_match() {
        assert_eq!(ChannelType::from_config_str("NIO"), Some(ChannelType::Nio));
        assert_eq!(ChannelType::from_config_str("EPOLL"), Some(ChannelType::Epoll));
        assert_eq!(ChannelType::from_config_str("epoll"), None);
        assert_eq!(ChannelType::from_config_str(" NIO"), None);
    }

    #[test]
    fn test_enum_display_roundtrips() {
        for (_, variant) in ChannelType::VARIANTS {
            let name = variant.to_string();
            assert_eq!(ChannelType::from_config_str(&name), Some(*variant));
        }
    }

    #[test]
    fn test_registry_load() {
        let registry: ClassRegistry<&'static str> = ClassRegistry::new();
        registry
            .register("keel.worker.block.evictor.LRUEvictor", "lru")
            .register("keel.worker.block.evictor.LRFUEvictor", "lrfu");

        assert_eq!(registry.load("keel.worker.block.evictor.LRUEvictor").unwrap(), "lru");
        assert!(registry.contains("keel.worker.block.evictor.LRFUEvictor"));
        assert_eq!(
            registry.names(),
            vec![
                "keel.worker.block.evictor.LRFUEvictor",
                "keel.worker.block.evictor.LRUEvictor"
            ]
        );
    }

    #[test]
    fn test_registry_missing() {
        let registry: ClassRegistry<u8> = ClassRegistry::new();
        let err = registry.load("keel.Nope").unwrap_err();
        assert!(err.to_string().contains("keel.Nope"));
    }
}
