use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::config::ProviderKind;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Provider rejected the image: {message}")]
    Rejected { message: String, partial_text: String },
    #[error("No text extracted from image")]
    EmptyResult,
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("Cancelled before the provider answered")]
    Cancelled,
    #[error("OCR engine failed: {0}")]
    Process(String),
    #[error("Malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Coarse classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    EmptyResult,
    Rejected,
    Timeout,
    Cancelled,
}

impl ProviderError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) | Self::Status { .. } | Self::Decode(_) | Self::Io(_) => {
                FailureKind::Transport
            }
            Self::Rejected { .. } | Self::Process(_) => FailureKind::Rejected,
            Self::EmptyResult => FailureKind::EmptyResult,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Cancelled => FailureKind::Cancelled,
        }
    }

    /// Whatever text a soft-failing provider still returned.
    pub fn partial_text(&self) -> &str {
        match self {
            Self::Rejected { partial_text, .. } => partial_text,
            _ => "",
        }
    }
}

/// Turns a provider's extracted text into a result, treating whitespace-only
/// text as no text.
pub fn require_text(text: String) -> ProviderResult<String> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyResult)
    } else {
        Ok(text)
    }
}

/// One external text-extraction service.
///
/// Ordinary failures (network, non-2xx, empty result, provider error codes)
/// come back as `Err`; implementations never panic on them. Dropping the
/// returned future must abort the work in flight.
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    async fn extract(&self, image: &[u8]) -> ProviderResult<String>;
}
