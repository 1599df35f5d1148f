//! Property names the registry itself interprets.
//!
//! Every other key is opaque to keel-conf; these are the ones that feed derived keys,
//! the multi-worker guard, validation, site-file discovery and logging.

pub const HOME: &str = "keel.home";
pub const CONF_DIR: &str = "keel.conf.dir";
pub const SITE_CONF_DIR: &str = "keel.site.conf.dir";
pub const USER_HOME: &str = "user.home";

pub const LOGS_LEVEL: &str = "keel.logs.level";
pub const LOGS_FORMAT: &str = "keel.logs.format";

pub const MASTER_HOSTNAME: &str = "keel.master.hostname";
pub const MASTER_RPC_PORT: &str = "keel.master.rpc.port";
pub const MASTER_ADDRESS: &str = "keel.master.address";
pub const ZOOKEEPER_ENABLED: &str = "keel.zookeeper.enabled";

pub const WORKER_DATA_PORT: &str = "keel.worker.data.port";
pub const WORKER_RPC_PORT: &str = "keel.worker.rpc.port";
pub const WORKER_WEB_PORT: &str = "keel.worker.web.port";
pub const WORKER_NETWORK_NETTY_CHANNEL: &str = "keel.worker.network.netty.channel";
pub const USER_NETWORK_NETTY_CHANNEL: &str = "keel.user.network.netty.channel";

pub const INTEGRATION_YARN_WORKERS_PER_HOST_MAX: &str =
    "keel.integration.yarn.workers.per.host.max";

pub const USER_FILE_BUFFER_BYTES: &str = "keel.user.file.buffer.bytes";

/// Scheme prefix of the master address when coordination is off.
pub const HEADER: &str = "keel://";
/// Scheme prefix of the master address in fault-tolerant mode.
pub const HEADER_FT: &str = "keel-ft://";

/// Worker ports that must be auto-assigned when several workers share a host.
pub const PER_HOST_WORKER_PORTS: [&str; 3] = [WORKER_DATA_PORT, WORKER_RPC_PORT, WORKER_WEB_PORT];

/// Site override file searched for along `keel.site.conf.dir`.
pub const SITE_PROPERTIES: &str = "keel-site.toml";

/// Prefix of environment variables mapped into the process layer.
pub const ENV_PREFIX: &str = "KEEL_";
