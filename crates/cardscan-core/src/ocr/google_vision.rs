use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::config::{ProviderConfig, ProviderKind};
use super::http::check_status;
use super::provider::{require_text, OcrProvider, ProviderError, ProviderResult};

/// Google Cloud Vision `images:annotate` with document text detection.
pub struct GoogleVisionProvider {
    id: String,
    api_key: String,
    endpoint: String,
    language: String,
    client: Client,
}

impl GoogleVisionProvider {
    pub fn new(config: &ProviderConfig, client: Client) -> Self {
        Self {
            id: config.id.clone(),
            api_key: config.credentials.clone().unwrap_or_default(),
            endpoint: config.endpoint().trim_end_matches('/').to_string(),
            language: config.language.clone(),
            client,
        }
    }

    fn annotate_url(&self) -> String {
        format!("{}/v1/images:annotate", self.endpoint)
    }

    fn request_body(&self, image: &[u8]) -> serde_json::Value {
        json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }],
                "imageContext": { "languageHints": [vision_language(&self.language)] },
            }]
        })
    }
}

/// Vision takes BCP-47 hints; configs use tesseract-style three letter codes.
fn vision_language(language: &str) -> &str {
    match language {
        "eng" => "en",
        "ger" | "deu" => "de",
        "fre" | "fra" => "fr",
        "spa" => "es",
        "ita" => "it",
        "por" => "pt",
        "jpn" => "ja",
        "chs" | "chi_sim" => "zh",
        other => other,
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    full_text_annotation: Option<FullTextAnnotation>,
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

fn text_from_response(body: &str) -> ProviderResult<String> {
    let parsed: AnnotateResponse = serde_json::from_str(body)?;
    let Some(response) = parsed.responses.into_iter().next() else {
        return Err(ProviderError::EmptyResult);
    };

    if let Some(status) = response.error {
        return Err(ProviderError::Rejected {
            message: format!("code {}: {}", status.code, status.message),
            partial_text: String::new(),
        });
    }

    let text = response
        .full_text_annotation
        .map(|a| a.text)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            response
                .text_annotations
                .into_iter()
                .next()
                .map(|a| a.description)
        })
        .unwrap_or_default();

    require_text(text)
}

#[async_trait::async_trait]
impl OcrProvider for GoogleVisionProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::GoogleVision
    }

    async fn extract(&self, image: &[u8]) -> ProviderResult<String> {
        let response = self
            .client
            .post(self.annotate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(image))
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        text_from_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleVisionProvider {
        let config = ProviderConfig::new(ProviderKind::GoogleVision)
            .with_credentials("key")
            .with_endpoint("https://vision.example.test/");
        GoogleVisionProvider::new(&config, Client::new())
    }

    #[test]
    fn test_full_text_preferred() {
        let body = r#"{"responses":[{
            "fullTextAnnotation":{"text":"John Doe\nCEO\n"},
            "textAnnotations":[{"description":"other"}]
        }]}"#;

        assert_eq!(text_from_response(body).unwrap(), "John Doe\nCEO\n");
    }

    #[test]
    fn test_falls_back_to_text_annotations() {
        let body = r#"{"responses":[{"textAnnotations":[{"description":"Jane Roe"},{"description":"Jane"}]}]}"#;

        assert_eq!(text_from_response(body).unwrap(), "Jane Roe");
    }

    #[test]
    fn test_empty_response_is_empty_result() {
        assert!(matches!(
            text_from_response(r#"{"responses":[{}]}"#),
            Err(ProviderError::EmptyResult)
        ));
        assert!(matches!(
            text_from_response("{}"),
            Err(ProviderError::EmptyResult)
        ));
    }

    #[test]
    fn test_error_status_is_rejection() {
        let body = r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#;

        let err = text_from_response(body).unwrap_err();
        assert!(err.to_string().contains("Bad image data."));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            text_from_response("<html>"),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let provider = provider();
        let body = provider.request_body(b"abc");

        assert_eq!(provider.annotate_url(), "https://vision.example.test/v1/images:annotate");
        assert_eq!(body["requests"][0]["image"]["content"], "YWJj");
        assert_eq!(
            body["requests"][0]["features"][0]["type"],
            "DOCUMENT_TEXT_DETECTION"
        );
        assert_eq!(body["requests"][0]["imageContext"]["languageHints"][0], "en");
    }
}
