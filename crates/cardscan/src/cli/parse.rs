use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

pub fn run(file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let contact = cardscan_core::parse_text(&text);
    println!("{}", serde_json::to_string_pretty(&contact)?);
    Ok(())
}
