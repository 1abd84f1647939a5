use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Result, fs::config_dir, job::DEFAULT_AMOUNT, ledger::OrderingPolicy};

const CURRENT_CONFIG_VERSION: u16 = 1;
const FILE_NAME: &str = "core.toml";

/// Handle to the core configuration
pub type Cfg = Arc<RwLock<CoreConfig>>;

/// The core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    version: u16,
    /// Amount pre-filled for new jobs
    pub default_amount: f64,
    pub currency_symbol: String,
    /// How job lists are ordered unless a command asks otherwise
    pub ordering: OrderingPolicy,
    pub invoice: InvoiceConfig,
    #[serde(skip)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    pub author: String,
    pub creator: String,
    /// PNG drawn in the top right corner of every invoice
    pub logo: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            default_amount: DEFAULT_AMOUNT,
            currency_symbol: "$".into(),
            ordering: OrderingPolicy::default(),
            invoice: InvoiceConfig::default(),
            path: None,
        }
    }
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            author: String::new(),
            creator: "Tally".into(),
            logo: None,
        }
    }
}

impl CoreConfig {
    /// Load the configuration from the Tally config directory, writing the defaults there if
    /// no file exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?.join(FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents).unwrap_or_else(|e| {
                warn!(
                    "Ignoring unreadable configuration at {}: {e}",
                    path.display()
                );
                Self::default()
            })
        } else {
            let cfg = Self {
                path: Some(path.to_path_buf()),
                ..Self::default()
            };
            cfg.save()?;
            cfg
        };

        cfg.path = Some(path.to_path_buf());

        Ok(cfg)
    }

    /// Write the configuration back to the file it was loaded from. Configurations that were
    /// never loaded from disk are not written anywhere.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn mock() -> Self {
        Self::default()
    }
}
