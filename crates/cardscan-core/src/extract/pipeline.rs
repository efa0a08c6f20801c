use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use super::assembler::{assemble, ParsedContact};
use super::classifier::classify;
use super::normalizer::normalize;
use crate::error::{Error, Result};
use crate::ocr::{AcquisitionConfig, AcquisitionResult, CancelToken, Orchestrator, ProviderAttempt};

/// Turns raw OCR text into a contact. Pure and deterministic.
pub fn parse_text(raw: &str) -> ParsedContact {
    let start = Instant::now();
    let lines = normalize(raw);
    let line_count = lines.len();
    let contact = assemble(raw, &classify(lines));

    tracing::debug!(
        lines = line_count,
        missing = contact.missing_fields().len(),
        elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
        "parsed card text"
    );
    contact
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutput {
    pub contact: ParsedContact,
    /// Provider whose text produced `contact`
    pub provider_id: String,
    /// Every provider attempt, the winning one last
    pub attempts: Vec<ProviderAttempt>,
}

impl ScanOutput {
    pub fn failures(&self) -> impl Iterator<Item = &ProviderAttempt> {
        self.attempts.iter().filter(|a| !a.success)
    }
}

/// Image in, contact out: acquisition followed by extraction.
pub struct CardScanner {
    orchestrator: Orchestrator,
}

impl CardScanner {
    #[must_use]
    pub const fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Scanner over the providers described by `config`.
    pub fn from_config(config: &AcquisitionConfig) -> Result<Self> {
        Ok(Self::new(Orchestrator::from_config(config)?))
    }

    pub const fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// When every provider fails the acquisition error comes back as is;
    /// no contact is produced from partial text.
    pub async fn scan(&self, image: &[u8]) -> AcquisitionResult<ScanOutput> {
        self.scan_with_cancel(image, CancelToken::never()).await
    }

    /// Reads the image at `path` and scans it.
    pub async fn scan_file(&self, path: &Path) -> Result<ScanOutput> {
        let image = tokio::fs::read(path).await.map_err(|source| Error::ReadImage {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.scan(&image).await?)
    }

    pub async fn scan_with_cancel(
        &self,
        image: &[u8],
        cancel: CancelToken,
    ) -> AcquisitionResult<ScanOutput> {
        let acquisition = self.orchestrator.acquire_with_cancel(image, cancel).await?;

        Ok(ScanOutput {
            contact: parse_text(&acquisition.text),
            provider_id: acquisition.provider_id,
            attempts: acquisition.attempts,
        })
    }
}
