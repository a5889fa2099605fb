//! Registration configuration loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use registration::domain::form::{DEFAULT_STORAGE_KEY, FormConfig};

const DEFAULT_STORAGE_DIR: &str = ".registration";
const DEFAULT_STORAGE_FILE: &str = "local-storage.json";

/// Storage location and submission timing.
///
/// Values come from configuration files and `REGISTRATION_*` environment
/// variables; unset values fall back to the defaults below.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRATION")]
pub struct RegistrationSettings {
    /// Directory holding the local key-value store file.
    pub storage_dir: Option<PathBuf>,
    /// File name of the key-value store inside `storage_dir`.
    pub storage_file: Option<String>,
    /// Key under which submitted records are stored.
    pub storage_key: Option<String>,
    /// Pause, in milliseconds, between persisting a record and clearing the
    /// form.
    #[ortho_config(default = 1500)]
    pub submit_delay_ms: u64,
}

impl RegistrationSettings {
    /// Configured store directory, defaulting to `.registration`.
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }

    /// Configured store file name, defaulting to `local-storage.json`.
    #[must_use]
    pub fn storage_file(&self) -> &str {
        self.storage_file.as_deref().unwrap_or(DEFAULT_STORAGE_FILE)
    }

    /// Configured storage key, defaulting to `formData`.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(DEFAULT_STORAGE_KEY)
    }

    /// Configured settle delay, defaulting to 1.5 seconds.
    #[must_use]
    pub const fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// Controller tunables derived from these settings.
    #[must_use]
    pub fn form_config(&self) -> FormConfig {
        FormConfig {
            storage_key: self.storage_key().to_owned(),
            settle_delay: self.submit_delay(),
        }
    }
}
