use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use tracing::debug;

use keel_conf::{Configuration, LoadOptions, keys};

mod get;
mod list;

pub use get::ValueKind;

/// ⚓ Keel — inspect the layered configuration of a keel deployment
#[derive(Parser)]
#[command(name = "keel", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directories searched for keel-site.toml (comma separated); overrides keel.site.conf.dir
    #[arg(short, long, global = true)]
    site_dir: Option<String>,

    /// Set a property in the process layer (repeatable), e.g. -D keel.master.rpc.port=20000
    #[arg(short = 'D', long = "define", global = true, value_parser = parse_key_val)]
    defines: Vec<(String, String)>,

    /// Ignore KEEL_* environment variables
    #[arg(long, global = true)]
    no_env: bool,

    /// Skip the site file
    #[arg(long, global = true)]
    no_site: bool,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one property with placeholders expanded
    Get {
        /// Property key, e.g. keel.master.address
        key: String,
        /// Parse the value as this type before printing
        #[arg(long = "as", value_enum, default_value = "string")]
        kind: ValueKind,
        /// Delimiter used with --as list
        #[arg(long, default_value = ",")]
        delimiter: String,
    },
    /// Print every property
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Print raw values without expanding placeholders
        #[arg(long)]
        raw: bool,
        /// Only keys starting with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Load every source, run validation and show which layers were applied
    Check,
    /// Show version and build info
    Version,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse "key=value" CLI arguments.
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

impl Cli {
    pub fn run(self) -> keel_core::Result<()> {
        match self.command {
            Commands::Version => return Self::cmd_version(),
            Commands::Completions { shell } => return Self::cmd_completions(shell),
            _ => {}
        }

        // Load config first so we can use it for log format
        let conf = Configuration::load(&self.load_options())?;
        self.init_tracing(&conf);
        debug!(
            layers = conf.layers().len(),
            keys = conf.len(),
            "configuration loaded"
        );

        match self.command {
            Commands::Get {
                key,
                kind,
                delimiter,
            } => {
                println!("{}", get::render(&conf, &key, kind, &delimiter)?);
                Ok(())
            }
            Commands::List { json, raw, prefix } => {
                list::cmd_list(&conf, json, raw, prefix.as_deref())
            }
            Commands::Check => list::cmd_check(&conf),
            Commands::Version | Commands::Completions { .. } => Ok(()),
        }
    }

    fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions {
            include_env: !self.no_env,
            ..LoadOptions::default()
        };
        if self.no_site {
            options.site_file_name = None;
        }
        if let Some(dirs) = &self.site_dir {
            options = options.with_override(keys::SITE_CONF_DIR, dirs.clone());
        }
        for (key, value) in &self.defines {
            options = options.with_override(key.clone(), value.clone());
        }
        options
    }

    fn init_tracing(&self, conf: &Configuration) {
        let configured = conf
            .get(keys::LOGS_LEVEL)
            .unwrap_or_else(|_| "info".to_string());
        // Resolve log level: --verbose > --quiet > --log-level > keel.logs.level
        let log_level = if self.verbose {
            "debug".to_string()
        } else if self.quiet {
            "error".to_string()
        } else {
            self.log_level.clone().unwrap_or(configured)
        };
        let format = conf
            .get(keys::LOGS_FORMAT)
            .unwrap_or_else(|_| "pretty".to_string());

        if format == "json" {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
                )
                .json()
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
                )
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    fn cmd_version() -> keel_core::Result<()> {
        println!("⚓ Keel v{}", env!("CARGO_PKG_VERSION"));
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: debug");
        #[cfg(not(debug_assertions))]
        println!("   Profile: release");
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> keel_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "keel", &mut std::io::stdout());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("keel.master.rpc.port=20000").unwrap(),
            ("keel.master.rpc.port".to_string(), "20000".to_string())
        );
        assert_eq!(
            parse_key_val("keel.list=a=b").unwrap(),
            ("keel.list".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("no-equals").is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_load_options_from_flags() {
        let cli = Cli::try_parse_from([
            "keel",
            "--no-env",
            "--site-dir",
            "/tmp/a,/tmp/b",
            "-D",
            "keel.master.rpc.port=20000",
            "get",
            "keel.master.address",
        ])
        .unwrap();
        let options = cli.load_options();
        assert!(!options.include_env);
        assert_eq!(options.site_file_name.as_deref(), Some(keys::SITE_PROPERTIES));
        assert_eq!(
            options.overrides.get(keys::SITE_CONF_DIR).map(String::as_str),
            Some("/tmp/a,/tmp/b")
        );
        assert_eq!(
            options.overrides.get(keys::MASTER_RPC_PORT).map(String::as_str),
            Some("20000")
        );
    }

    #[test]
    fn test_get_kind_flag() {
        let cli = Cli::try_parse_from(["keel", "--no-site", "get", "k", "--as", "bytes"]).unwrap();
        assert!(cli.load_options().site_file_name.is_none());
        match cli.command {
            Commands::Get { kind, delimiter, .. } => {
                assert_eq!(kind, ValueKind::Bytes);
                assert_eq!(delimiter, ",");
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["keel", "-v", "-q", "check"]).is_err());
    }
}
