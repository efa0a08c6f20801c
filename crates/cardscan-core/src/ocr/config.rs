use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which adapter a configured provider uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Cloud Vision document text detection
    GoogleVision,
    /// OCR.space free-tier API
    OcrSpace,
    /// Local `tesseract` binary
    Tesseract,
}

impl ProviderKind {
    pub const fn default_id(self) -> &'static str {
        match self {
            Self::GoogleVision => "google_vision",
            Self::OcrSpace => "ocr_space",
            Self::Tesseract => "tesseract",
        }
    }

    pub const fn requires_credentials(self) -> bool {
        matches!(self, Self::GoogleVision | Self::OcrSpace)
    }

    /// Default HTTP endpoint, or binary name for local engines.
    pub const fn default_endpoint(self) -> &'static str {
        match self {
            Self::GoogleVision => "https://vision.googleapis.com",
            Self::OcrSpace => "https://api.ocr.space/parse/image",
            Self::Tesseract => "tesseract",
        }
    }

    pub const fn is_remote(self) -> bool {
        !matches!(self, Self::Tesseract)
    }
}

/// One entry of the provider priority list.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Identifier reported in attempts and results
    pub id: String,
    pub kind: ProviderKind,
    /// API key for cloud providers
    #[serde(default, alias = "api_key", skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
    /// Base URL for cloud providers, binary path for local engines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// OCR language hint
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "eng".to_string()
}

impl ProviderConfig {
    #[must_use]
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            id: kind.default_id().to_string(),
            kind,
            credentials: None,
            endpoint: None,
            language: default_language(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.kind.default_endpoint())
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::EmptyProviderId);
        }
        if self.kind.requires_credentials()
            && self.credentials.as_deref().map_or(true, |c| c.trim().is_empty())
        {
            return Err(ConfigError::MissingCredentials(self.id.clone()));
        }
        if self.kind.is_remote() {
            url::Url::parse(self.endpoint()).map_err(|e| ConfigError::InvalidEndpoint {
                id: self.id.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("credentials", &self.credentials.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .finish()
    }
}

/// Provider priority list plus the limits applied to every attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Providers in priority order (first success wins)
    pub providers: Vec<ProviderConfig>,
    /// Upper bound on a single provider attempt
    pub attempt_timeout_seconds: u32,
    /// TCP/TLS connect timeout for HTTP providers
    pub connect_timeout_seconds: u32,
    pub user_agent: Option<String>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            attempt_timeout_seconds: 30,
            connect_timeout_seconds: 10,
            user_agent: None,
        }
    }
}

pub const GOOGLE_VISION_KEY_VAR: &str = "CARDSCAN_GOOGLE_VISION_KEY";
pub const OCR_SPACE_KEY_VAR: &str = "CARDSCAN_OCR_SPACE_KEY";
pub const ATTEMPT_TIMEOUT_VAR: &str = "CARDSCAN_ATTEMPT_TIMEOUT";

impl AcquisitionConfig {
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.providers.push(provider);
        self
    }

    pub const fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_seconds as u64)
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds as u64)
    }

    /// Builds the provider list from the environment: Google Vision, then
    /// OCR.space, then a local tesseract, each only when usable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), which::which("tesseract").is_ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, tesseract_available: bool) -> Self {
        let mut config = Self::default();

        if let Some(key) = lookup(GOOGLE_VISION_KEY_VAR).filter(|k| !k.is_empty()) {
            config
                .providers
                .push(ProviderConfig::new(ProviderKind::GoogleVision).with_credentials(key));
        }
        if let Some(key) = lookup(OCR_SPACE_KEY_VAR).filter(|k| !k.is_empty()) {
            config
                .providers
                .push(ProviderConfig::new(ProviderKind::OcrSpace).with_credentials(key));
        }
        if tesseract_available {
            config
                .providers
                .push(ProviderConfig::new(ProviderKind::Tesseract));
        }
        if let Some(seconds) = lookup(ATTEMPT_TIMEOUT_VAR).and_then(|v| v.trim().parse().ok()) {
            config.attempt_timeout_seconds = seconds;
        }

        config
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Keeps only the providers named in `ids`, in the order given.
    pub fn select(&mut self, ids: &[String]) -> ConfigResult<()> {
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            let provider = self
                .providers
                .iter()
                .find(|p| &p.id == id)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownProvider(id.clone()))?;
            selected.push(provider);
        }
        self.providers = selected;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        if self.attempt_timeout_seconds == 0 || self.connect_timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            provider.validate()?;
            if !seen.insert(provider.id.as_str()) {
                return Err(ConfigError::DuplicateProvider(provider.id.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No OCR providers configured")]
    NoProviders,
    #[error("Provider id must not be empty")]
    EmptyProviderId,
    #[error("Provider {0} is configured twice")]
    DuplicateProvider(String),
    #[error("Provider {0} requires credentials")]
    MissingCredentials(String),
    #[error("Provider {id} has an invalid endpoint: {reason}")]
    InvalidEndpoint { id: String, reason: String },
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
    #[error("Timeouts must be greater than zero")]
    ZeroTimeout,
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
