use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use super::config::{AcquisitionConfig, ConfigResult, ProviderKind};
use super::google_vision::GoogleVisionProvider;
use super::http::build_client;
use super::ocr_space::OcrSpaceProvider;
use super::provider::{FailureKind, OcrProvider, ProviderError};
use super::tesseract::TesseractProvider;

/// Audit record for one provider attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAttempt {
    pub provider_id: String,
    pub success: bool,
    /// Extracted text; for failures, whatever a soft-failing provider returned
    pub text: String,
    pub error_message: Option<String>,
    pub kind: Option<FailureKind>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl ProviderAttempt {
    fn failed(
        provider_id: &str,
        error: &ProviderError,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            success: false,
            text: error.partial_text().to_string(),
            error_message: Some(error.to_string()),
            kind: Some(error.kind()),
            started_at,
            elapsed_ms: elapsed_ms(elapsed),
        }
    }

    fn succeeded(
        provider_id: &str,
        text: &str,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            success: true,
            text: text.to_string(),
            error_message: None,
            kind: None,
            started_at,
            elapsed_ms: elapsed_ms(elapsed),
        }
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Text from the first provider that succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acquisition {
    pub text: String,
    pub provider_id: String,
    /// Every attempt made, in order; the winning one is last
    pub attempts: Vec<ProviderAttempt>,
}

impl Acquisition {
    pub fn failures(&self) -> impl Iterator<Item = &ProviderAttempt> {
        self.attempts.iter().filter(|a| !a.success)
    }
}

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("No OCR providers to try")]
    NoProviders,
    #[error("Image is empty")]
    EmptyImage,
    #[error("All {} OCR providers failed", .attempts.len())]
    Exhausted { attempts: Vec<ProviderAttempt> },
    #[error("Acquisition cancelled after {} attempts", .attempts.len())]
    Cancelled { attempts: Vec<ProviderAttempt> },
}

impl AcquisitionError {
    /// The failure chain, in the order providers were tried.
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            Self::Exhausted { attempts } | Self::Cancelled { attempts } => attempts,
            Self::NoProviders | Self::EmptyImage => &[],
        }
    }
}

pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Trigger side of a cancellation pair.
#[derive(Debug)]
pub struct Canceller {
    tx: watch::Sender<bool>,
}

/// Observer side of a cancellation pair; cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl Canceller {
    #[must_use]
    pub fn new() -> (Self, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelToken { rx })
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelToken {
    /// A token that never fires.
    #[must_use]
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Never resolves if the `Canceller` was
    /// dropped without firing.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Tries providers strictly in priority order; the first non-empty text wins
/// and later providers are never called.
pub struct Orchestrator {
    providers: Vec<Arc<dyn OcrProvider>>,
    attempt_timeout: Duration,
}

impl Orchestrator {
    #[must_use]
    pub fn new(attempt_timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            attempt_timeout,
        }
    }

    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn OcrProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn add_provider(&mut self, provider: Arc<dyn OcrProvider>) {
        self.providers.push(provider);
    }

    /// Validates `config` and builds one adapter per configured provider,
    /// sharing a single HTTP client.
    pub fn from_config(config: &AcquisitionConfig) -> ConfigResult<Self> {
        config.validate()?;
        let client = build_client(config)?;

        let mut orchestrator = Self::new(config.attempt_timeout());
        for provider in &config.providers {
            let adapter: Arc<dyn OcrProvider> = match provider.kind {
                ProviderKind::GoogleVision => {
                    Arc::new(GoogleVisionProvider::new(provider, client.clone()))
                }
                ProviderKind::OcrSpace => Arc::new(OcrSpaceProvider::new(provider, client.clone())),
                ProviderKind::Tesseract => Arc::new(TesseractProvider::new(provider)),
            };
            orchestrator.add_provider(adapter);
        }

        Ok(orchestrator)
    }

    pub fn provider_ids(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.id())
    }

    pub const fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    pub async fn acquire(&self, image: &[u8]) -> AcquisitionResult<Acquisition> {
        self.acquire_with_cancel(image, CancelToken::never()).await
    }

    pub async fn acquire_with_cancel(
        &self,
        image: &[u8],
        cancel: CancelToken,
    ) -> AcquisitionResult<Acquisition> {
        let span = tracing::info_span!("acquire", id = %Uuid::now_v7(), bytes = image.len());
        acquire(image, &self.providers, self.attempt_timeout, cancel)
            .instrument(span)
            .await
    }
}

/// Runs `providers` in order against `image`, each bounded by
/// `attempt_timeout`, stopping at the first success or on cancellation.
pub async fn acquire(
    image: &[u8],
    providers: &[Arc<dyn OcrProvider>],
    attempt_timeout: Duration,
    mut cancel: CancelToken,
) -> AcquisitionResult<Acquisition> {
    if providers.is_empty() {
        return Err(AcquisitionError::NoProviders);
    }
    if image.is_empty() {
        return Err(AcquisitionError::EmptyImage);
    }

    let mut attempts = Vec::new();

    for provider in providers {
        if cancel.is_cancelled() {
            return Err(AcquisitionError::Cancelled { attempts });
        }

        let id = provider.id();
        let started_at = Utc::now();
        let start = Instant::now();
        tracing::debug!(provider = id, "trying provider");

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ProviderError::Cancelled),
            result = tokio::time::timeout(attempt_timeout, provider.extract(image)) => {
                result.unwrap_or(Err(ProviderError::Timeout(attempt_timeout)))
            }
        };

        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                let elapsed = start.elapsed();
                tracing::info!(
                    provider = id,
                    chars = text.chars().count(),
                    elapsed_ms = elapsed_ms(elapsed),
                    failed_before = attempts.len(),
                    "text acquired"
                );
                attempts.push(ProviderAttempt::succeeded(id, &text, started_at, elapsed));
                return Ok(Acquisition {
                    text,
                    provider_id: id.to_string(),
                    attempts,
                });
            }
            Ok(_) => {
                let error = ProviderError::EmptyResult;
                tracing::warn!(provider = id, kind = ?error.kind(), "{error}");
                attempts.push(ProviderAttempt::failed(id, &error, started_at, start.elapsed()));
            }
            Err(error) => {
                tracing::warn!(provider = id, kind = ?error.kind(), "{error}");
                attempts.push(ProviderAttempt::failed(id, &error, started_at, start.elapsed()));
                if matches!(error, ProviderError::Cancelled) {
                    return Err(AcquisitionError::Cancelled { attempts });
                }
            }
        }
    }

    Err(AcquisitionError::Exhausted { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::provider::ProviderResult;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Script {
        Succeed(&'static str),
        Fail,
        Blank,
        Hang,
    }

    struct ScriptedProvider {
        id: &'static str,
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(id: &'static str, script: Script) -> Arc<Self> {
            Arc::new(Self {
                id,
                script,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl OcrProvider for ScriptedProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Tesseract
        }

        async fn extract(&self, _image: &[u8]) -> ProviderResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Succeed(text) => Ok(text.to_string()),
                Script::Fail => Err(ProviderError::Status {
                    status: 503,
                    body: "unavailable".into(),
                }),
                Script::Blank => Ok("   \n".to_string()),
                Script::Hang => std::future::pending().await,
            }
        }
    }

    fn orchestrator(providers: &[Arc<ScriptedProvider>]) -> Orchestrator {
        providers.iter().fold(
            Orchestrator::new(Duration::from_secs(5)),
            |o, p| o.with_provider(p.clone()),
        )
    }

    #[tokio::test]
    async fn test_falls_back_to_next_provider() {
        let a = ScriptedProvider::new("a", Script::Fail);
        let b = ScriptedProvider::new("b", Script::Succeed("John Doe"));

        let result = orchestrator(&[a.clone(), b.clone()])
            .acquire(b"image")
            .await
            .unwrap();

        assert_eq!(result.provider_id, "b");
        assert_eq!(result.text, "John Doe");
        assert_eq!(result.failures().count(), 1);
        assert_eq!(result.attempts[0].provider_id, "a");
        assert!(!result.attempts[0].success);
        assert_eq!(result.attempts[0].kind, Some(FailureKind::Transport));

        let winner = &result.attempts[1];
        assert_eq!(winner.provider_id, "b");
        assert!(winner.success);
        assert_eq!(winner.text, "John Doe");
        assert_eq!(winner.error_message, None);
        assert_eq!(winner.kind, None);
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let a = ScriptedProvider::new("a", Script::Succeed("from a"));
        let b = ScriptedProvider::new("b", Script::Succeed("from b"));

        let result = orchestrator(&[a.clone(), b.clone()])
            .acquire(b"image")
            .await
            .unwrap();

        assert_eq!(result.provider_id, "a");
        assert_eq!(result.attempts.len(), 1);
        assert!(result.attempts[0].success);
        assert_eq!(result.failures().count(), 0);
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_text_counts_as_failure() {
        let a = ScriptedProvider::new("a", Script::Blank);
        let b = ScriptedProvider::new("b", Script::Succeed("text"));

        let result = orchestrator(&[a, b]).acquire(b"image").await.unwrap();

        assert_eq!(result.provider_id, "b");
        assert_eq!(result.attempts[0].kind, Some(FailureKind::EmptyResult));
    }

    #[tokio::test]
    async fn test_exhausted_keeps_order() {
        let a = ScriptedProvider::new("a", Script::Fail);
        let b = ScriptedProvider::new("b", Script::Blank);

        let err = orchestrator(&[a, b]).acquire(b"image").await.unwrap_err();

        assert!(matches!(err, AcquisitionError::Exhausted { .. }));
        let ids: Vec<&str> = err.attempts().iter().map(|a| a.provider_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(err.attempts().iter().all(|a| a.error_message.is_some()));
        assert_eq!(err.to_string(), "All 2 OCR providers failed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_moves_on() {
        let slow = ScriptedProvider::new("slow", Script::Hang);
        let fast = ScriptedProvider::new("fast", Script::Succeed("ok"));

        let result = orchestrator(&[slow, fast]).acquire(b"image").await.unwrap();

        assert_eq!(result.provider_id, "fast");
        assert_eq!(result.attempts[0].kind, Some(FailureKind::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_in_flight() {
        let slow = ScriptedProvider::new("slow", Script::Hang);
        let never = ScriptedProvider::new("never", Script::Succeed("late"));
        let orchestrator = orchestrator(&[slow, never.clone()]);
        let (canceller, token) = Canceller::new();

        let handle = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        };
        let (result, ()) = tokio::join!(orchestrator.acquire_with_cancel(b"image", token), handle);

        let err = result.unwrap_err();
        assert!(matches!(err, AcquisitionError::Cancelled { .. }));
        assert_eq!(err.attempts().len(), 1);
        assert_eq!(err.attempts()[0].kind, Some(FailureKind::Cancelled));
        assert_eq!(never.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let a = ScriptedProvider::new("a", Script::Succeed("text"));
        let (canceller, token) = Canceller::new();
        canceller.cancel();

        let err = orchestrator(&[a.clone()])
            .acquire_with_cancel(b"image", token)
            .await
            .unwrap_err();

        assert!(matches!(err, AcquisitionError::Cancelled { .. }));
        assert!(err.attempts().is_empty());
        assert_eq!(a.calls(), 0);
    }

    #[tokio::test]
    async fn test_input_contract() {
        let a = ScriptedProvider::new("a", Script::Succeed("text"));

        assert!(matches!(
            Orchestrator::new(Duration::from_secs(1)).acquire(b"image").await,
            Err(AcquisitionError::NoProviders)
        ));
        assert!(matches!(
            orchestrator(&[a]).acquire(b"").await,
            Err(AcquisitionError::EmptyImage)
        ));
    }

    #[test]
    fn test_from_config_keeps_priority_order() {
        use crate::ocr::config::ProviderConfig;

        let config = AcquisitionConfig::default()
            .with_provider(ProviderConfig::new(ProviderKind::OcrSpace).with_credentials("k"))
            .with_provider(ProviderConfig::new(ProviderKind::Tesseract).with_id("local"));

        let orchestrator = Orchestrator::from_config(&config).unwrap();

        assert_eq!(
            orchestrator.provider_ids().collect::<Vec<_>>(),
            vec!["ocr_space", "local"]
        );
        assert_eq!(orchestrator.attempt_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        assert!(Orchestrator::from_config(&AcquisitionConfig::default()).is_err());
    }
}
