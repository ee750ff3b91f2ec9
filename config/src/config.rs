use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "ETHASH_CONFIG";

/// Miner settings. Every field has a default, so a config file only needs
/// the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search worker threads
    pub threads: usize,
    /// Hash against the full dataset instead of the light cache
    pub full_dataset: bool,
    /// Generate the whole full dataset before searching
    pub prewarm: bool,
    /// Nonces handed to one search call before checking in
    pub batch_size: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            full_dataset: false,
            prewarm: false,
            batch_size: 100_000,
            log_level: "info".to_string(),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

impl Config {
    /// `$ETHASH_CONFIG` if set, otherwise `~/.ethash/config.json`
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return expand(&path);
        }
        dirs::home_dir()
            .map(|home| home.join(".ethash").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("ethash-config.json"))
    }

    pub fn load() -> io::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
    }

    /// Command-line flags win over file values
    pub fn apply(&mut self, args: &ConfigArgs) {
        if let Some(threads) = args.threads {
            self.threads = threads.max(1);
        }
        if args.full {
            self.full_dataset = true;
        }
        if args.prewarm {
            self.prewarm = true;
        }
        if let Some(batch_size) = args.batch_size {
            self.batch_size = batch_size.max(1);
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
    }
}

/// Flags shared by every miner subcommand
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Config file (default: $ETHASH_CONFIG or ~/.ethash/config.json)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Number of search threads
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Use the full dataset (allocates gigabytes)
    #[arg(long, global = true)]
    pub full: bool,

    /// Generate the full dataset up front (implies --full)
    #[arg(long, global = true)]
    pub prewarm: bool,

    /// Nonces per search batch
    #[arg(long, global = true)]
    pub batch_size: Option<u64>,

    /// Log filter, e.g. "debug" or "ethash_core=trace"
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl ConfigArgs {
    /// Load the selected config file and apply the flags on top
    pub fn resolve(&self) -> io::Result<Config> {
        let path = match &self.config {
            Some(path) => expand(path),
            None => Config::default_path(),
        };
        let mut cfg = Config::load_from(&path)?;
        cfg.apply(self);
        if cfg.prewarm {
            cfg.full_dataset = true;
        }
        Ok(cfg)
    }
}
