use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::config::{ProviderConfig, ProviderKind};
use super::provider::{require_text, OcrProvider, ProviderError, ProviderResult};

/// Local `tesseract` run with the image on stdin and text on stdout.
///
/// The child is killed when the extraction future is dropped, so the
/// orchestrator's timeout and cancellation reach the process.
pub struct TesseractProvider {
    id: String,
    binary: PathBuf,
    language: String,
}

impl TesseractProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        let endpoint = config.endpoint();
        let binary = which::which(endpoint).unwrap_or_else(|_| PathBuf::from(endpoint));

        Self {
            id: config.id.clone(),
            binary,
            language: config.language.clone(),
        }
    }

    fn args(&self) -> [&str; 4] {
        ["stdin", "stdout", "-l", &self.language]
    }
}

#[async_trait::async_trait]
impl OcrProvider for TesseractProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Tesseract
    }

    async fn extract(&self, image: &[u8]) -> ProviderResult<String> {
        let mut child = Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // An engine that exits early (bad language, unreadable image) closes
        // stdin; its exit status and stderr say more than the broken pipe.
        let written = match child.stdin.take() {
            Some(mut stdin) => match stdin.write_all(image).await {
                Ok(()) => stdin.shutdown().await,
                Err(e) => Err(e),
            },
            None => Ok(()),
        };

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Process(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        written?;
        require_text(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
