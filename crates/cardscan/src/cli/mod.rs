pub mod parse;
pub mod providers;
pub mod scan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cardscan_core::AcquisitionConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cardscan",
    about = "Turn business card photos into structured contact records",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// OCR a card image and print the extracted contact as JSON
    Scan {
        /// Image file (PNG, JPEG, TIFF, ...)
        image: PathBuf,
        /// Provider configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Per-provider timeout in seconds
        #[arg(short, long)]
        timeout: Option<u32>,
        /// Only try these providers, in this order (repeatable)
        #[arg(short, long = "provider")]
        providers: Vec<String>,
    },
    /// Extract a contact from OCR text without touching the network
    Parse {
        /// Text file; reads stdin when omitted or `-`
        file: Option<PathBuf>,
    },
    /// Show the providers that would be tried, in order
    Providers {
        /// Provider configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

const CONFIG_FILE: &str = "providers.json";

/// Explicit `--config`, then the user config file, then the environment.
pub fn load_config(explicit: Option<&Path>) -> Result<AcquisitionConfig> {
    if let Some(path) = explicit {
        return AcquisitionConfig::load(path)
            .with_context(|| format!("loading {}", path.display()));
    }

    if let Some(path) = user_config_path().filter(|p| p.exists()) {
        tracing::debug!(path = %path.display(), "using user config");
        return AcquisitionConfig::load(&path)
            .with_context(|| format!("loading {}", path.display()));
    }

    tracing::debug!("no config file, building providers from environment");
    Ok(AcquisitionConfig::from_env())
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cardscan").join(CONFIG_FILE))
}
