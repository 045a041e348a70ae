//! Engine configuration.
//!
//! Deployments either build an [`EngineConfig`] directly or load one from
//! `DOCTRANS_*` environment variables via [`EngineConfig::from_env`].

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::remote::AccessMode;

/// Reference interval between remote-job polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default validity window for signed container access.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct EngineConfig {
    /// Where the upload intake places incoming files; batch jobs stage their
    /// working copies under this root.
    pub upload_root: PathBuf,
    /// Root of the persisted artifact layout (`outputs/{job_id}`, ...).
    pub output_root: PathBuf,
    /// Interval between remote-job polls.
    pub poll_interval: Duration,
    /// Optional upper bound on remote-job polling. `None` blocks until the
    /// remote side finishes, which is the observed contract.
    pub poll_deadline: Option<Duration>,
    /// Validity window attached to signed container URLs.
    pub signed_url_ttl: Duration,
    /// How the translation service is granted container access.
    pub access: AccessMode,
    /// Storage account name, used by signed-URL deployments.
    pub storage_account: Option<String>,
    /// Storage account key for signing; never logged.
    pub storage_account_key: Option<SecretString>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            upload_root: PathBuf::from("uploads"),
            output_root: PathBuf::from("outputs"),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_deadline: None,
            signed_url_ttl: DEFAULT_SIGNED_URL_TTL,
            access: AccessMode::SignedUrl,
            storage_account: None,
            storage_account_key: None,
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("upload_root", &self.upload_root)
            .field("output_root", &self.output_root)
            .field("poll_interval", &self.poll_interval)
            .field("poll_deadline", &self.poll_deadline)
            .field("signed_url_ttl", &self.signed_url_ttl)
            .field("access", &self.access)
            .field("storage_account", &self.storage_account)
            .field(
                "storage_account_key",
                &self.storage_account_key.as_ref().map(|_| "****"),
            )
            .finish()
    }
}

impl EngineConfig {
    /// Loads configuration from `DOCTRANS_*` environment variables, falling
    /// back to defaults for unset values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(root) = read_var("DOCTRANS_UPLOAD_ROOT") {
            config.upload_root = PathBuf::from(root);
        }
        if let Some(root) = read_var("DOCTRANS_OUTPUT_ROOT") {
            config.output_root = PathBuf::from(root);
        }
        if let Some(secs) = read_parsed::<u64>("DOCTRANS_POLL_INTERVAL_SECS")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = read_parsed::<u64>("DOCTRANS_POLL_DEADLINE_SECS")? {
            config.poll_deadline = Some(Duration::from_secs(secs));
        }
        if let Some(hours) = read_parsed::<u64>("DOCTRANS_SIGNED_URL_TTL_HOURS")? {
            config.signed_url_ttl = Duration::from_secs(hours * 60 * 60);
        }
        if let Some(value) = read_var("DOCTRANS_USE_AMBIENT_IDENTITY") {
            config.access = if parse_bool("DOCTRANS_USE_AMBIENT_IDENTITY", &value)? {
                AccessMode::AmbientIdentity
            } else {
                AccessMode::SignedUrl
            };
        }
        config.storage_account = read_var("DOCTRANS_STORAGE_ACCOUNT");
        config.storage_account_key =
            read_var("DOCTRANS_STORAGE_ACCOUNT_KEY").map(SecretString::from);

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Validation {
                message: "poll interval must be greater than zero".to_string(),
            });
        }
        if self.access == AccessMode::SignedUrl && self.storage_account_key.is_none() {
            return Err(ConfigError::Validation {
                message: "signed URL access requires a storage account key".to_string(),
            });
        }
        Ok(())
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn read_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match read_var(name) {
        None => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidVar {
                name: name.to_string(),
                reason: e.to_string(),
            }),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidVar {
            name: name.to_string(),
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}
