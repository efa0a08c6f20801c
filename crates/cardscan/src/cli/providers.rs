use std::path::Path;

use anyhow::Result;
use console::style;

use super::load_config;

pub fn run(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;

    if config.providers.is_empty() {
        eprintln!("{} No OCR providers available", style("○").dim());
        eprintln!("  Set CARDSCAN_GOOGLE_VISION_KEY or CARDSCAN_OCR_SPACE_KEY,");
        eprintln!("  install tesseract, or pass --config <file>");
        return Ok(());
    }

    for (position, provider) in config.providers.iter().enumerate() {
        let key = match &provider.credentials {
            Some(_) => "key set",
            None if provider.kind.requires_credentials() => "key missing",
            None => "no key",
        };
        println!(
            "{}. {} ({}) {} [{}, {}]",
            position + 1,
            style(&provider.id).bold(),
            provider.kind.default_id(),
            provider.endpoint(),
            provider.language,
            key
        );
    }
    eprintln!(
        "  Attempt timeout: {}s",
        config.attempt_timeout().as_secs()
    );

    Ok(())
}
