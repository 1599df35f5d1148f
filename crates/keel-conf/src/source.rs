//! Property sources: the layers merged into a [`Configuration`](crate::Configuration).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use keel_core::{KeelError, Result};
use tracing::{debug, info};

use crate::host::local_hostname;
use crate::keys;
use crate::registry::ChannelType;
use crate::resolve::Resolver;

const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Where a layer came from. Declared lowest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceOrigin {
    Defaults,
    Site,
    Process,
    Runtime,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceOrigin::Defaults => "defaults",
            SourceOrigin::Site => "site",
            SourceOrigin::Process => "process",
            SourceOrigin::Runtime => "runtime",
        };
        f.write_str(s)
    }
}

/// One named batch of raw key/value pairs.
#[derive(Debug, Clone)]
pub struct PropertySource {
    pub name: String,
    pub origin: SourceOrigin,
    /// Set for file-backed sources.
    pub path: Option<PathBuf>,
    pub properties: BTreeMap<String, String>,
}

impl PropertySource {
    pub fn new(name: impl Into<String>, origin: SourceOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
            path: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The defaults shipped with keel, with host-dependent values filled in.
    pub fn defaults() -> Result<Self> {
        let mut source = Self::from_toml_str("defaults", SourceOrigin::Defaults, DEFAULTS_TOML)
            .map_err(|e| KeelError::Config(format!("default properties cannot be loaded: {e}")))?;

        source.insert(keys::MASTER_HOSTNAME, local_hostname());
        let channel = ChannelType::platform_default().to_string();
        source.insert(keys::WORKER_NETWORK_NETTY_CHANNEL, channel.clone());
        source.insert(keys::USER_NETWORK_NETTY_CHANNEL, channel);
        if let Some(home) = dirs::home_dir() {
            source.insert(keys::USER_HOME, home.to_string_lossy().into_owned());
        }
        Ok(source)
    }

    /// Parse TOML text and flatten it into dotted keys.
    pub fn from_toml_str(name: &str, origin: SourceOrigin, raw: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(raw)
            .map_err(|e| KeelError::Config(format!("failed to parse {name}: {e}")))?;
        let mut source = Self::new(name, origin);
        flatten_table("", &table, &mut source.properties);
        Ok(source)
    }

    pub fn from_toml_file(path: &Path, origin: SourceOrigin) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            KeelError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut source = Self::from_toml_str(&path.display().to_string(), origin, &raw)?;
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    /// Process layer built from `KEEL_*` environment variables:
    /// `KEEL_MASTER_RPC_PORT` becomes `keel.master.rpc.port`.
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut source = Self::new("environment", SourceOrigin::Process);
        for (name, value) in vars {
            if let Some(key) = env_to_key(name.as_ref()) {
                source.insert(key, value);
            }
        }
        source
    }

    pub fn from_process_env() -> Self {
        Self::from_env_vars(std::env::vars())
    }
}

/// `KEEL_WORKER_DATA_PORT` -> `keel.worker.data.port`. Returns `None` for variables
/// outside the prefix or with nothing after it.
pub fn env_to_key(name: &str) -> Option<String> {
    let rest = name.strip_prefix(keys::ENV_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(format!("keel.{}", rest.to_ascii_lowercase().replace('_', ".")))
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten_table(&full, inner, out),
            other => {
                out.insert(full, render_scalar(other));
            }
        }
    }
}

fn render_scalar(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(items) => items
            .iter()
            .map(render_scalar)
            .collect::<Vec<_>>()
            .join(","),
        toml::Value::Table(t) => {
            let mut nested = BTreeMap::new();
            flatten_table("", t, &mut nested);
            nested
                .into_iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",")
        }
    }
}

/// Directories to search for the site file, in order. A `keel.site.conf.dir` from an
/// override layer wins over the default one; each entry has its placeholders expanded
/// against the defaults plus those overrides.
pub fn site_search_path(
    defaults: &PropertySource,
    overrides: &[PropertySource],
) -> Result<Vec<PathBuf>> {
    let mut visible = defaults.properties.clone();
    for layer in overrides {
        visible.extend(layer.properties.clone());
    }
    let Some(raw) = visible.get(keys::SITE_CONF_DIR).cloned() else {
        return Ok(Vec::new());
    };

    let resolver = Resolver::new(&visible);
    let mut dirs = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        dirs.push(PathBuf::from(resolver.resolve(entry)?));
    }
    Ok(dirs)
}

/// First `file_name` found along `dirs`, loaded as the site layer.
pub fn find_site_source(file_name: &str, dirs: &[PathBuf]) -> Result<Option<PropertySource>> {
    for dir in dirs {
        let candidate = dir.join(file_name);
        if candidate.is_file() {
            info!(path = %candidate.display(), "loading site properties");
            return PropertySource::from_toml_file(&candidate, SourceOrigin::Site).map(Some);
        }
        debug!(path = %candidate.display(), "no site properties here");
    }
    Ok(None)
}
