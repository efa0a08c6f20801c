use std::path::PathBuf;
use thiserror::Error;

use crate::ocr::{AcquisitionError, ConfigError, ProviderAttempt};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error("Failed to read image {path}: {source}")]
    ReadImage {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Provider attempts behind an acquisition failure, empty otherwise.
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            Self::Acquisition(e) => e.attempts(),
            Self::Config(_) | Self::ReadImage { .. } => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_message_passes_through() {
        let err: Error = AcquisitionError::NoProviders.into();

        assert_eq!(err.to_string(), "No OCR providers to try");
        assert!(err.attempts().is_empty());
    }

    #[test]
    fn test_config_error_wrapped() {
        let err: Error = ConfigError::UnknownProvider("azure".into()).into();

        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown provider: azure"
        );
    }
}
