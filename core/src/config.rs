use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "ledger.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// The customer store, rewritten after every mutation.
    pub store_path:  PathBuf,
    /// Destination of the monthly sales report.
    pub report_dir:  PathBuf,
    /// Destination of the plain customer export.
    pub clients_dir: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store_path:  PathBuf::from("customers.json"),
            report_dir:  PathBuf::from("report"),
            clients_dir: PathBuf::from("clients"),
        }
    }
}

impl LedgerConfig {
    /// Load `ledger.json` from `data_dir`. A missing file gives the defaults;
    /// fields absent from the file keep their defaults.
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = data_dir.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Config with every path rooted under `dir`. For tests.
    pub fn default_test(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            store_path:  dir.join("customers.json"),
            report_dir:  dir.join("report"),
            clients_dir: dir.join("clients"),
        }
    }
}
