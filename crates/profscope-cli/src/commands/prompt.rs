//! Prompt command: print the analysis prompt without sending it

use std::path::Path;

use anyhow::Result;

use profscope_core::Config;

use super::{parse_kind, read_records, session_from_records};

/// Print the prompt that `analyze --llm` would send for this recording
pub fn cmd_prompt(config: &Config, file: &Path, kind: &str) -> Result<()> {
    let kind = parse_kind(kind)?;
    let records = read_records(file)?;
    if records.is_empty() {
        println!("No samples found in {}", file.display());
        return Ok(());
    }

    let session = session_from_records(config, kind, &records)?;
    println!("{}", session.prompt()?);
    Ok(())
}
