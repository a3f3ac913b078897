//! Application configuration. Storage and model paths, hashing cost.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::security::pbkdf2_hasher::DEFAULT_ROUNDS;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_MODEL_PATH: &str = "model/model_weights.mpk";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding users.db. Read from LEAFSCAN_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Classifier weight file. Read from LEAFSCAN_MODEL_PATH.
    #[serde(default)]
    pub model_path: Option<String>,

    /// PBKDF2 iterations for new password hashes. Read from LEAFSCAN_PBKDF2_ROUNDS.
    #[serde(default)]
    pub pbkdf2_rounds: Option<u32>,

    /// How long a write waits on a locked database. Read from LEAFSCAN_BUSY_TIMEOUT_MS.
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("LEAFSCAN"));
        if let Ok(path) = std::env::var("LEAFSCAN_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR))
    }

    pub fn model_path_or_default(&self) -> PathBuf {
        PathBuf::from(self.model_path.as_deref().unwrap_or(DEFAULT_MODEL_PATH))
    }

    /// Returns PBKDF2 rounds. Zero is treated as unset.
    pub fn pbkdf2_rounds_or_default(&self) -> u32 {
        self.pbkdf2_rounds
            .filter(|r| *r > 0)
            .unwrap_or(DEFAULT_ROUNDS)
    }

    pub fn busy_timeout_or_default(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS))
    }
}
