use std::path::Path;

use anyhow::{bail, Result};
use cardscan_core::{CardScanner, ProviderAttempt};
use console::style;

use super::load_config;

pub async fn run(
    image: &Path,
    config: Option<&Path>,
    timeout: Option<u32>,
    providers: &[String],
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(seconds) = timeout {
        config.attempt_timeout_seconds = seconds;
    }
    if !providers.is_empty() {
        config.select(providers)?;
    }

    let scanner = CardScanner::from_config(&config)?;

    match scanner.scan_file(image).await {
        Ok(output) => {
            for attempt in output.failures() {
                eprintln!(
                    "{} {} failed: {}",
                    style("!").yellow(),
                    attempt.provider_id,
                    attempt.error_message.as_deref().unwrap_or("unknown error")
                );
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            report_failure(err.attempts());
            bail!(err)
        }
    }
}

fn report_failure(attempts: &[ProviderAttempt]) {
    for attempt in attempts {
        eprintln!(
            "{} {}: {}",
            style("✗").red(),
            style(&attempt.provider_id).bold(),
            attempt.error_message.as_deref().unwrap_or("unknown error")
        );
    }
}
