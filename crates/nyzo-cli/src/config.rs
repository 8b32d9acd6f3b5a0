use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::Level;

use nyzo_crypto::PrivateKey;

use crate::cli::OutputFormat;

/// Settings read from the `--config` TOML file. Missing keys take their
/// defaults; command-line flags win over anything set here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub log_level: String,
    pub output: OutputFormat,
    /// File holding a hex seed, used when a signing command gets no `--key`.
    pub key_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
            output: OutputFormat::Text,
            key_file: None,
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// `debug` under `--verbose`, otherwise the configured level.
    pub fn log_level(&self, verbose: bool) -> anyhow::Result<Level> {
        if verbose {
            return Ok(Level::DEBUG);
        }
        Level::from_str(self.log_level.trim())
            .map_err(|_| anyhow::anyhow!("invalid log level: {}", self.log_level))
    }

    /// The `--format` flag if given, else the configured format.
    pub fn output(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.unwrap_or(self.output)
    }

    /// The signing key from `--key`, or failing that from `key_file`.
    pub fn signing_key(&self, explicit: Option<&str>) -> anyhow::Result<PrivateKey> {
        if let Some(hex) = explicit {
            return PrivateKey::from_hex(hex).context("parsing --key");
        }
        let Some(path) = &self.key_file else {
            bail!("no signing key: pass --key or set key_file in the config");
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading key file {}", path.display()))?;
        PrivateKey::from_hex(&text).with_context(|| format!("parsing key file {}", path.display()))
    }
}
