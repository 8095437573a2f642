//! Configuration types for sawlog.
//!
//! [`Config::load`] reads `~/.config/sawlog/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::load_from`] layers an
//! explicit file over the defaults, and [`Config::defaults`] returns the
//! defaults without touching the filesystem (useful in tests).

use crate::extract::{Extractor, InvalidUtf8};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[input]
inbox        = "archivos_entrada"
processed    = "procesados"
invalid_utf8 = "drop"

[output]
table             = "cortes_seccionadora"
insert_batch_size = 100
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/sawlog/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[input]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Directory the saw controller's log files are dropped into.
    #[serde(default = "default_inbox")]
    pub inbox: PathBuf,
    /// Where log files are moved once their records are loaded.
    #[serde(default = "default_processed")]
    pub processed: PathBuf,
    #[serde(default)]
    pub invalid_utf8: InvalidUtf8,
}

fn default_inbox() -> PathBuf { PathBuf::from("archivos_entrada") }
fn default_processed() -> PathBuf { PathBuf::from("procesados") }

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            inbox: default_inbox(),
            processed: default_processed(),
            invalid_utf8: InvalidUtf8::default(),
        }
    }
}

impl InputConfig {
    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.invalid_utf8)
    }
}

/// `[output]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Table the cut records are appended to.
    #[serde(default = "default_table")]
    pub table: String,
    /// Rows per `INSERT` statement when rendering SQL.
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,
}

fn default_table() -> String { "cortes_seccionadora".to_string() }
fn default_insert_batch_size() -> usize { 100 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            insert_batch_size: default_insert_batch_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/sawlog/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load an explicit file layered on top of the built-in defaults. The
    /// file must exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.output.insert_batch_size > 0,
            "output.insert_batch_size must be at least 1"
        );
        anyhow::ensure!(
            !self.output.table.trim().is_empty(),
            "output.table must not be empty"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("sawlog")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
