//! Configuration types for batch conversion runs

use crate::error::{ConvertError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory scanned for images to convert
pub const DEFAULT_INPUT_DIR: &str = "images_not_converted";
/// Default directory receiving converted images
pub const DEFAULT_OUTPUT_DIR: &str = "images_converted";

/// Default Tinify shrink endpoint
pub const DEFAULT_TINIFY_URL: &str = "https://api.tinify.com/shrink";
/// Default remove.bg endpoint
pub const DEFAULT_REMOVE_BG_URL: &str = "https://api.remove.bg/v1.0/removebg";

pub const TINIFY_API_KEY_ENV: &str = "TINIFY_API_KEY";
pub const REMOVE_BG_API_KEY_ENV: &str = "REMOVE_BG_API_KEY";
pub const TINIFY_API_URL_ENV: &str = "TINIFY_API_URL";
pub const REMOVE_BG_API_URL_ENV: &str = "REMOVE_BG_API_URL";

/// Default timeout applied to every outbound request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Which remote stages are applied to every image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingMode {
    /// Compression only
    Compress,
    /// Background removal only
    RemoveBackground,
    /// Compress, remove the background, then compress the result again
    Both,
}

impl Default for ProcessingMode {
    fn default() -> Self {
        Self::Both
    }
}

impl ProcessingMode {
    /// Derive the mode from the two mutually exclusive CLI switches
    ///
    /// Neither switch set means both stages run.
    #[must_use]
    pub fn from_flags(compress: bool, remove_bg: bool) -> Self {
        match (compress, remove_bg) {
            (true, false) => Self::Compress,
            (false, true) => Self::RemoveBackground,
            _ => Self::Both,
        }
    }

    #[must_use]
    pub fn uses_compression(self) -> bool {
        matches!(self, Self::Compress | Self::Both)
    }

    #[must_use]
    pub fn uses_background_removal(self) -> bool {
        matches!(self, Self::RemoveBackground | Self::Both)
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compress => write!(f, "compress"),
            Self::RemoveBackground => write!(f, "remove-bg"),
            Self::Both => write!(f, "compress+remove-bg+compress"),
        }
    }
}

/// API keys for the remote services, supplied from the environment
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiCredentials {
    pub tinify_api_key: Option<String>,
    pub remove_bg_api_key: Option<String>,
}

impl ApiCredentials {
    /// Read both keys from `TINIFY_API_KEY` and `REMOVE_BG_API_KEY`
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            tinify_api_key: non_empty_env(TINIFY_API_KEY_ENV),
            remove_bg_api_key: non_empty_env(REMOVE_BG_API_KEY_ENV),
        }
    }
}

// Keys must never end up in logs.
impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| if key.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("ApiCredentials")
            .field("tinify_api_key", &redact(&self.tinify_api_key))
            .field("remove_bg_api_key", &redact(&self.remove_bg_api_key))
            .finish()
    }
}

/// Endpoint URLs of the remote services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub compression_url: String,
    pub remove_bg_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            compression_url: DEFAULT_TINIFY_URL.to_string(),
            remove_bg_url: DEFAULT_REMOVE_BG_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Defaults, overridden by `TINIFY_API_URL` / `REMOVE_BG_API_URL` when set
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            compression_url: non_empty_env(TINIFY_API_URL_ENV).unwrap_or(defaults.compression_url),
            remove_bg_url: non_empty_env(REMOVE_BG_API_URL_ENV).unwrap_or(defaults.remove_bg_url),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Complete configuration of a conversion run
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Directory scanned (non-recursively) for input images
    pub input_dir: PathBuf,
    /// Directory receiving results; must already exist
    pub output_dir: PathBuf,
    pub mode: ProcessingMode,
    /// Optional glob applied to input file names
    pub pattern: Option<String>,
    /// Reprocess files whose output already exists
    pub force: bool,
    /// Enumerate and report without calling any API or writing files
    pub dry_run: bool,
    /// Per-request timeout (`None` = wait indefinitely)
    pub request_timeout: Option<Duration>,
    pub credentials: ApiCredentials,
    pub endpoints: Endpoints,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            mode: ProcessingMode::default(),
            pattern: None,
            force: false,
            dry_run: false,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            credentials: ApiCredentials::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl ConverterConfig {
    /// Create a builder for `ConverterConfig`
    #[must_use]
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::default()
    }

    /// Validate the configuration before any file is touched
    ///
    /// # Validation Rules
    ///
    /// - Input and output directories exist and are directories (none are created)
    /// - The file name pattern, if any, is a valid glob
    /// - Every credential the selected mode needs is present (skipped for dry runs)
    ///
    /// # Errors
    /// - `InvalidConfig` for missing directories or an invalid pattern
    /// - `MissingCredential` naming the environment variable to set
    pub fn validate(&self) -> Result<()> {
        ensure_directory("Input", &self.input_dir)?;
        ensure_directory("Output", &self.output_dir)?;

        if let Some(pattern) = &self.pattern {
            glob::Pattern::new(pattern).map_err(|e| {
                ConvertError::invalid_config(format!("Invalid file pattern '{}': {}", pattern, e))
            })?;
        }

        if !self.dry_run {
            if self.mode.uses_compression() {
                self.tinify_api_key()?;
            }
            if self.mode.uses_background_removal() {
                self.remove_bg_api_key()?;
            }
        }

        Ok(())
    }

    /// Tinify key, or an error naming the variable to set
    pub fn tinify_api_key(&self) -> Result<&str> {
        self.credentials
            .tinify_api_key
            .as_deref()
            .ok_or(ConvertError::MissingCredential(TINIFY_API_KEY_ENV))
    }

    /// remove.bg key, or an error naming the variable to set
    pub fn remove_bg_api_key(&self) -> Result<&str> {
        self.credentials
            .remove_bg_api_key
            .as_deref()
            .ok_or(ConvertError::MissingCredential(REMOVE_BG_API_KEY_ENV))
    }
}

fn ensure_directory(label: &str, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ConvertError::invalid_config(format!(
            "{} directory does not exist: {} (it is not created automatically)",
            label,
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(ConvertError::invalid_config(format!(
            "{} path is not a directory: {}",
            label,
            path.display()
        )));
    }
    Ok(())
}

/// Builder for `ConverterConfig`
#[derive(Debug, Default)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    #[must_use]
    pub fn input_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    #[must_use]
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set processing mode
    #[must_use]
    pub fn mode(mut self, mode: ProcessingMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Restrict input files to names matching a glob
    #[must_use]
    pub fn pattern(mut self, pattern: Option<String>) -> Self {
        self.config.pattern = pattern;
        self
    }

    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.config.force = force;
        self
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Set the per-request timeout (`None` disables it)
    #[must_use]
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: ApiCredentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// - Any rule checked by [`ConverterConfig::validate`]
    pub fn build(self) -> Result<ConverterConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}
