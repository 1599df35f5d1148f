//! # keel-conf
//!
//! The property registry every keel service reads its tunables from. Values come from
//! built-in defaults, a `keel-site.toml` site file, `KEEL_*` environment variables and
//! explicit overrides, in that precedence order, and may refer to each other with
//! `${key}` placeholders that are expanded at read time.
//!
//! ```
//! use keel_conf::{Configuration, LoadOptions};
//!
//! let conf = Configuration::load(&LoadOptions::minimal()).unwrap();
//! conf.set("keel.worker.data.folder", "${keel.home}/data").unwrap();
//! assert_eq!(conf.get("keel.worker.data.folder").unwrap(), "/opt/keel/data");
//! assert!(conf.get("keel.master.address").unwrap().starts_with("keel://"));
//! ```

pub mod configuration;
pub mod host;
pub mod keys;
pub mod registry;
pub mod resolve;
pub mod size;
pub mod source;
pub mod store;
pub mod validate;

pub use configuration::{Configuration, LayerInfo, LoadOptions};
pub use registry::{ChannelType, ClassLoader, ClassRegistry, ConfigEnum};
pub use resolve::{Lookup, Resolver};
pub use source::{PropertySource, SourceOrigin};
pub use store::PropertyStore;
pub use validate::{UserFileBufferBytes, ValidationRule};
