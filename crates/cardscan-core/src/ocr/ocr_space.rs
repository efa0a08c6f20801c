use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use super::config::{ProviderConfig, ProviderKind};
use super::http::{check_status, sniff_image_mime};
use super::provider::{require_text, OcrProvider, ProviderError, ProviderResult};

/// OCR.space `parse/image` endpoint, engine 2.
pub struct OcrSpaceProvider {
    id: String,
    api_key: String,
    endpoint: String,
    language: String,
    client: Client,
}

impl OcrSpaceProvider {
    pub fn new(config: &ProviderConfig, client: Client) -> Self {
        Self {
            id: config.id.clone(),
            api_key: config.credentials.clone().unwrap_or_default(),
            endpoint: config.endpoint().to_string(),
            language: config.language.clone(),
            client,
        }
    }

    fn form(&self, image: &[u8]) -> Vec<(&'static str, String)> {
        let data_url = format!(
            "data:{};base64,{}",
            sniff_image_mime(image),
            STANDARD.encode(image)
        );

        vec![
            ("apikey", self.api_key.clone()),
            ("language", self.language.clone()),
            ("isOverlayRequired", "false".into()),
            ("detectOrientation", "true".into()),
            ("scale", "true".into()),
            ("OCREngine", "2".into()),
            ("base64Image", data_url),
        ]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParseResponse {
    #[serde(default)]
    parsed_results: Vec<ParsedResult>,
    #[serde(rename = "OCRExitCode", default)]
    ocr_exit_code: i32,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: serde_json::Value,
    #[serde(default)]
    error_details: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

/// `ErrorMessage` arrives as a string, a list of strings, or null.
fn flatten_message(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_message).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

fn text_from_response(body: &str) -> ProviderResult<String> {
    let parsed: ParseResponse = serde_json::from_str(body)?;

    let text = parsed
        .parsed_results
        .iter()
        .map(|r| r.parsed_text.trim_end())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if parsed.ocr_exit_code != 1 || parsed.is_errored_on_processing {
        let message = flatten_message(&parsed.error_message)
            .or_else(|| flatten_message(&parsed.error_details))
            .unwrap_or_else(|| format!("OCR exit code {}", parsed.ocr_exit_code));
        return Err(ProviderError::Rejected {
            message,
            partial_text: text,
        });
    }

    require_text(text)
}

#[async_trait::async_trait]
impl OcrProvider for OcrSpaceProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OcrSpace
    }

    async fn extract(&self, image: &[u8]) -> ProviderResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&self.form(image))
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        text_from_response(&body)
    }
}
