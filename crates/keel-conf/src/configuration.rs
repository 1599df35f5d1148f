use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use keel_core::{KeelError, MismatchKind, Result};
use tracing::{debug, error, info, warn};

use crate::keys;
use crate::registry::{ClassLoader, ConfigEnum};
use crate::resolve::Resolver;
use crate::size::parse_bytes;
use crate::source::{PropertySource, SourceOrigin, find_site_source, site_search_path};
use crate::store::PropertyStore;
use crate::validate::{ValidationRule, builtin_rules};

/// What [`Configuration::load`] reads besides the built-in defaults.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Site file searched for along `keel.site.conf.dir`; `None` skips the site layer.
    pub site_file_name: Option<String>,
    /// Read `KEEL_*` environment variables into the process layer.
    pub include_env: bool,
    /// Explicit overrides (e.g. `-D key=value`), applied above the environment.
    pub overrides: BTreeMap<String, String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            site_file_name: Some(keys::SITE_PROPERTIES.to_string()),
            include_env: true,
            overrides: BTreeMap::new(),
        }
    }
}

impl LoadOptions {
    /// Defaults only: no site file, no environment. Meant for tests.
    pub fn minimal() -> Self {
        Self {
            site_file_name: None,
            include_env: false,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }
}

/// Summary of a source applied during initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub name: String,
    pub origin: SourceOrigin,
    pub path: Option<PathBuf>,
    pub keys: usize,
}

/// The property registry: raw values layered from every source, read through
/// placeholder expansion and typed parsing.
///
/// All methods take `&self`; share it across threads behind an `Arc`.
pub struct Configuration {
    store: PropertyStore,
    rules: Vec<Box<dyn ValidationRule>>,
    layers: Vec<LayerInfo>,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("keys", &self.store.len())
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field("layers", &self.layers)
            .finish()
    }
}

impl Configuration {
    /// A registry with no properties and the built-in rules. Nothing is derived or checked
    /// until the first mutation.
    pub fn empty() -> Self {
        Self {
            store: PropertyStore::new(),
            rules: builtin_rules(),
            layers: Vec::new(),
        }
    }

    /// Read every configured source and build the registry.
    ///
    /// Layers, lowest priority first: built-in defaults, the site file, `KEEL_*`
    /// environment variables, explicit overrides.
    pub fn load(options: &LoadOptions) -> Result<Self> {
        let defaults = PropertySource::defaults()?;

        let mut process = Vec::new();
        if options.include_env {
            process.push(PropertySource::from_process_env());
        }
        if !options.overrides.is_empty() {
            let mut cli = PropertySource::new("overrides", SourceOrigin::Process);
            cli.properties.extend(options.overrides.clone());
            process.push(cli);
        }

        let site = match &options.site_file_name {
            Some(file_name) => {
                let dirs = site_search_path(&defaults, &process)?;
                find_site_source(file_name, &dirs)?
            }
            None => None,
        };

        let mut layers = vec![defaults];
        layers.extend(site);
        layers.extend(process);
        Self::initialize(layers)
    }

    /// Apply `layers` in order, later values replacing earlier ones key by key, then
    /// derive `keel.master.address`, validate, and apply the multi-worker port guard.
    pub fn initialize(layers: Vec<PropertySource>) -> Result<Self> {
        Self::initialize_with_rules(layers, builtin_rules())
    }

    pub fn initialize_with_rules(
        layers: Vec<PropertySource>,
        rules: Vec<Box<dyn ValidationRule>>,
    ) -> Result<Self> {
        let mut conf = Self {
            store: PropertyStore::new(),
            rules,
            layers: Vec::with_capacity(layers.len()),
        };

        for layer in &layers {
            info!(
                source = %layer.name,
                origin = %layer.origin,
                keys = layer.len(),
                "applying property source"
            );
            for (key, value) in &layer.properties {
                conf.store.insert(key.clone(), value.clone());
            }
            conf.layers.push(LayerInfo {
                name: layer.name.clone(),
                origin: layer.origin,
                path: layer.path.clone(),
                keys: layer.len(),
            });
        }

        conf.derive_master_address()?;
        conf.validate()?;
        conf.guard_worker_ports(&layers)?;

        info!(
            keys = conf.store.len(),
            layers = conf.layers.len(),
            "configuration initialized"
        );
        Ok(conf)
    }

    /// Add a rule run after every later mutation. Existing values are not re-checked here;
    /// call [`validate`](Self::validate) for that.
    pub fn with_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// `<scheme><hostname>:<port>`, built from the raw values so placeholders in either
    /// part keep resolving at read time.
    fn derive_master_address(&self) -> Result<()> {
        let hostname = self.raw(keys::MASTER_HOSTNAME)?;
        let port = self.raw(keys::MASTER_RPC_PORT)?;
        // Anything but a case-insensitive "true" leaves fault tolerance off.
        let use_zk = self.contains_key(keys::ZOOKEEPER_ENABLED)
            && self.get(keys::ZOOKEEPER_ENABLED)?.eq_ignore_ascii_case("true");
        let scheme = if use_zk { keys::HEADER_FT } else { keys::HEADER };
        self.store
            .insert(keys::MASTER_ADDRESS, format!("{scheme}{hostname}:{port}"));
        Ok(())
    }

    /// Several workers per host cannot share fixed ports: refuse explicit overrides and
    /// switch the defaults to auto-assign.
    fn guard_worker_ports(&self, layers: &[PropertySource]) -> Result<()> {
        let max_workers = self.get_int(keys::INTEGRATION_YARN_WORKERS_PER_HOST_MAX)?;
        if max_workers <= 1 {
            return Ok(());
        }
        for key in keys::PER_HOST_WORKER_PORTS {
            let overridden = layers
                .iter()
                .any(|l| l.origin >= SourceOrigin::Process && l.contains_key(key));
            if overridden {
                return Err(KeelError::validation(
                    key,
                    format!(
                        "cannot be specified when allowing multiple workers per host with {}={}",
                        keys::INTEGRATION_YARN_WORKERS_PER_HOST_MAX,
                        max_workers
                    ),
                ));
            }
        }
        for key in keys::PER_HOST_WORKER_PORTS {
            warn!(key, max_workers, "multiple workers per host, port set to auto-assign");
            self.store.insert(key, "0");
        }
        Ok(())
    }

    // ── Mutation ───────────────────────────────────────────────

    /// Set one property, then re-run validation. A failed validation leaves the new value
    /// in place.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            return Err(KeelError::InvalidArgument(format!(
                "the key value pair ({key}, {value}) cannot have an empty key"
            )));
        }
        debug!(key = %key, value = %value, "setting property");
        self.store.insert(key, value);
        self.validate()
    }

    /// Write every pair of `patch` above everything applied so far, then re-run
    /// validation.
    ///
    /// Pairs are written one at a time. Concurrent readers may observe a partly applied
    /// patch, and a validation failure does not undo the writes.
    pub fn merge<I, K, V>(&self, patch: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut count = 0usize;
        for (key, value) in patch {
            self.store.insert(key, value);
            count += 1;
        }
        debug!(keys = count, "merged properties");
        self.validate()
    }

    /// Run every validation rule against the current contents.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            if let Err(e) = rule.check(self) {
                error!(rule = rule.name(), error = %e, "configuration validation failed");
                return Err(e);
            }
        }
        Ok(())
    }

    // ── Lookup ─────────────────────────────────────────────────

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Sources applied by [`initialize`](Self::initialize), lowest priority first.
    pub fn layers(&self) -> &[LayerInfo] {
        &self.layers
    }

    /// Copy of every raw (unexpanded) value.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.store.snapshot()
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn raw(&self, key: &str) -> Result<String> {
        self.store
            .get_raw(key)
            .ok_or_else(|| KeelError::KeyNotFound(key.to_string()))
    }

    fn type_mismatch(key: &str, kind: MismatchKind, value: &str) -> KeelError {
        warn!(key, value, "configuration cannot evaluate key as {}", kind);
        KeelError::mismatch(key, kind)
    }

    /// Value with every `${key}` placeholder expanded.
    pub fn get(&self, key: &str) -> Result<String> {
        let raw = self.raw(key)?;
        Resolver::new(&self.store).resolve_property(key, &raw)
    }

    pub fn get_int(&self, key: &str) -> Result<i32> {
        let value = self.get(key)?;
        value
            .parse()
            .map_err(|_| Self::type_mismatch(key, MismatchKind::Integer, &value))
    }

    pub fn get_long(&self, key: &str) -> Result<i64> {
        let value = self.get(key)?;
        value
            .parse()
            .map_err(|_| Self::type_mismatch(key, MismatchKind::Long, &value))
    }

    pub fn get_double(&self, key: &str) -> Result<f64> {
        let value = self.get(key)?;
        value
            .trim()
            .parse()
            .map_err(|_| Self::type_mismatch(key, MismatchKind::Double, &value))
    }

    pub fn get_float(&self, key: &str) -> Result<f32> {
        let value = self.get(key)?;
        value
            .trim()
            .parse()
            .map_err(|_| Self::type_mismatch(key, MismatchKind::Float, &value))
    }

    /// `true` or `false` in any letter case; nothing else.
    pub fn get_boolean(&self, key: &str) -> Result<bool> {
        let value = self.get(key)?;
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(Self::type_mismatch(key, MismatchKind::Boolean, &value))
        }
    }

    /// Split on `delimiter`, trimming pieces and dropping empty ones.
    pub fn get_list(&self, key: &str, delimiter: &str) -> Result<Vec<String>> {
        if delimiter.is_empty() {
            return Err(KeelError::InvalidArgument(
                "illegal separator for keel properties as list".into(),
            ));
        }
        let value = self.get(key)?;
        Ok(value
            .split(delimiter)
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(String::from)
            .collect())
    }

    pub fn get_enum<T: ConfigEnum>(&self, key: &str) -> Result<T> {
        let value = self.get(key)?;
        T::from_config_str(&value).ok_or_else(|| KeelError::EnumLookup {
            key: key.to_string(),
            value,
        })
    }

    /// Size in bytes from a human-readable value such as `64MB`.
    pub fn get_bytes(&self, key: &str) -> Result<i64> {
        let value = self.get(key)?;
        parse_bytes(&value).map_err(|e| {
            debug!(key, error = %e, "byte size parse failed");
            Self::type_mismatch(key, MismatchKind::Bytes, &value)
        })
    }

    /// Look the expanded value up in `loader` as a logical type name.
    pub fn get_class<T, L>(&self, key: &str, loader: &L) -> Result<T>
    where
        L: ClassLoader<T> + ?Sized,
    {
        let name = self.get(key)?;
        loader.load(&name).map_err(|source| {
            error!(class = %name, error = %source, "requested class could not be loaded");
            KeelError::ClassLoad { name, source }
        })
    }
}
