//! Configuration module for diskmirror.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.
//! The resulting [`Config`] is loaded once at startup and handed to every
//! component explicitly; nothing reads configuration from global state.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::newtypes::RemotePath;

/// Environment variable that overrides `remote.token`.
pub const TOKEN_ENV_VAR: &str = "DISKMIRROR_TOKEN";

/// Default resources endpoint of the Yandex Disk REST API.
pub const DEFAULT_BASE_URL: &str = "https://cloud-api.yandex.net/v1/disk/resources";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for diskmirror.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

/// What a cycle does when the remote folder cannot be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingFailurePolicy {
    /// Abort the cycle and try again after the next interval.
    #[default]
    SkipCycle,
    /// Carry on with an empty remote snapshot (every local file is re-uploaded).
    TreatAsEmpty,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Local directory whose direct files are mirrored.
    pub local_folder: PathBuf,
    /// Seconds to sleep between reconciliation cycles.
    pub interval_secs: u64,
    /// Behavior when the remote listing request fails.
    pub listing_failure: ListingFailurePolicy,
}

/// Remote store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Remote folder that receives the mirror, e.g. `/Backup`.
    pub folder: String,
    /// Resources endpoint of the storage API.
    pub base_url: String,
    /// OAuth token. `DISKMIRROR_TOKEN` takes precedence when set.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Number of entries fetched per listing request.
    pub page_size: u32,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Optional log file, written in addition to stderr.
    pub file: Option<PathBuf>,
    /// Maximum size of the log file (in MiB) before it is rotated.
    pub max_size_mb: u64,
    /// Maximum number of rotated log files to keep.
    pub max_files: u32,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        Self::parse(&content, path)
    }

    /// Load from `path`, using [`Config::default`] only when the file does
    /// not exist. A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to read configuration from {}", path.display()))),
        }
    }

    /// Resolve the configuration for a `--config` style option.
    ///
    /// An explicit file must exist and parse. Without one, the default path
    /// is used and a missing file means built-in defaults. Returns the
    /// configuration together with the path it was resolved from.
    pub fn load_from(explicit: Option<&Path>) -> anyhow::Result<(Self, PathBuf)> {
        match explicit {
            Some(path) => Ok((Self::load(path)?, path.to_path_buf())),
            None => {
                let path = Self::default_path();
                let config = Self::load_or_default(&path)?;
                Ok((config, path))
            }
        }
    }

    fn parse(content: &str, path: &Path) -> anyhow::Result<Self> {
        serde_yaml::from_str(content)
            .with_context(|| format!("Failed to parse configuration in {}", path.display()))
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/diskmirror/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("diskmirror")
            .join("config.yaml")
    }

    /// The local folder with a leading `~` expanded.
    pub fn local_folder_path(&self) -> PathBuf {
        expand_tilde(&self.sync.local_folder)
    }

    /// The log file with a leading `~` expanded, if one is configured.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.logging.file.as_deref().map(expand_tilde)
    }

    /// The remote folder parsed into a [`RemotePath`].
    pub fn remote_folder_path(&self) -> Result<RemotePath, crate::domain::DomainError> {
        RemotePath::normalize(&self.remote.folder)
    }

    /// The OAuth token, preferring the environment over the file.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                self.remote
                    .token
                    .clone()
                    .filter(|t| !t.trim().is_empty())
            })
    }

    /// A copy safe to print: the token is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.remote.token.is_some() {
            copy.remote.token = Some("********".to_string());
        }
        copy
    }
}

/// Expands a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            local_folder: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("Mirror"),
            interval_secs: 60,
            listing_failure: ListingFailurePolicy::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            folder: "/Mirror".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            request_timeout_secs: 30,
            page_size: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("diskmirror");
        Self {
            level: "info".to_string(),
            file: Some(data_dir.join("diskmirror.log")),
            max_size_mb: 10,
            max_files: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.interval_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `remote.page_size`.
const MAX_PAGE_SIZE: u32 = 10_000;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        if self.sync.interval_secs == 0 {
            errors.push(ValidationError {
                field: "sync.interval_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        let local = self.local_folder_path();
        if !local.is_dir() {
            errors.push(ValidationError {
                field: "sync.local_folder".into(),
                message: format!("directory does not exist: {}", local.display()),
            });
        }

        // --- remote ---
        if let Err(err) = self.remote_folder_path() {
            errors.push(ValidationError {
                field: "remote.folder".into(),
                message: err.to_string(),
            });
        }
        if !(self.remote.base_url.starts_with("https://")
            || self.remote.base_url.starts_with("http://"))
        {
            errors.push(ValidationError {
                field: "remote.base_url".into(),
                message: format!("not an http(s) URL: {}", self.remote.base_url),
            });
        }
        if self.resolved_token().is_none() {
            errors.push(ValidationError {
                field: "remote.token".into(),
                message: format!("no token configured (set remote.token or {TOKEN_ENV_VAR})"),
            });
        }
        if self.remote.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "remote.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.remote.page_size == 0 || self.remote.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError {
                field: "remote.page_size".into(),
                message: format!("must be in range 1..={MAX_PAGE_SIZE}"),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }
        if self.logging.max_size_mb == 0 {
            errors.push(ValidationError {
                field: "logging.max_size_mb".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.logging.max_files == 0 {
            errors.push(ValidationError {
                field: "logging.max_files".into(),
                message: "must be greater than 0".into(),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use diskmirror_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .local_folder(PathBuf::from("/home/user/Documents"))
///     .remote_folder("/Backup")
///     .interval_secs(300)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sync ---

    pub fn local_folder(mut self, folder: PathBuf) -> Self {
        self.config.sync.local_folder = folder;
        self
    }

    pub fn interval_secs(mut self, seconds: u64) -> Self {
        self.config.sync.interval_secs = seconds;
        self
    }

    pub fn listing_failure(mut self, policy: ListingFailurePolicy) -> Self {
        self.config.sync.listing_failure = policy;
        self
    }

    // --- remote ---

    pub fn remote_folder(mut self, folder: impl Into<String>) -> Self {
        self.config.remote.folder = folder.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.base_url = url.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.remote.token = Some(token.into());
        self
    }

    pub fn request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.remote.request_timeout_secs = seconds;
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.config.remote.page_size = size;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.logging.file = file;
        self
    }

    pub fn logging_max_size_mb(mut self, mb: u64) -> Self {
        self.config.logging.max_size_mb = mb;
        self
    }

    pub fn logging_max_files(mut self, n: u32) -> Self {
        self.config.logging.max_files = n;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
