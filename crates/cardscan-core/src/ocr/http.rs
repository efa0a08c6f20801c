use reqwest::{Client, Response};

use super::config::AcquisitionConfig;
use super::provider::{ProviderError, ProviderResult};

const DEFAULT_USER_AGENT: &str = concat!("cardscan/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in a `Status` failure.
const MAX_ERROR_BODY: usize = 512;

/// Shared client for every HTTP provider. The per-attempt deadline is owned
/// by the orchestrator, so only the connect timeout is set here.
pub fn build_client(config: &AcquisitionConfig) -> reqwest::Result<Client> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Client::builder()
        .connect_timeout(config.connect_timeout())
        .user_agent(user_agent)
        .danger_accept_invalid_certs(false)
        .build()
}

/// Fails non-2xx responses with their (truncated) body.
pub async fn check_status(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body: truncate(body.trim(), MAX_ERROR_BODY),
    })
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}…", &text[..end]),
        None => text.to_string(),
    }
}

/// MIME type from the leading magic bytes; `image/jpeg` when unknown.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => "image/tiff",
        [b'B', b'M', ..] => "image/bmp",
        [b'%', b'P', b'D', b'F', ..] => "application/pdf",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_image_mime() {
        assert_eq!(sniff_image_mime(b"\x89PNG\r\n\x1a\n...."), "image/png");
        assert_eq!(sniff_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_image_mime(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff_image_mime(b"II*\0rest"), "image/tiff");
        assert_eq!(sniff_image_mime(b"??"), "image/jpeg");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[test]
    fn test_build_client() {
        let config = AcquisitionConfig {
            user_agent: Some("cardscan-test".into()),
            ..Default::default()
        };

        assert!(build_client(&config).is_ok());
    }
}
