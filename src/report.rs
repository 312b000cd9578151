use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::data_models::{ExtractionResult, PipelineResult};

pub const SUMMARY_HEADER: &str = "=== FOOD GUIDE SUMMARY ===";

/// Writes the result as pretty JSON, creating parent directories as needed.
pub fn persist(result: &PipelineResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn render_summary(result: &PipelineResult) -> Result<String> {
    let summary = match (&result.extraction, result.processed) {
        (ExtractionResult::Structured { .. }, true) => {
            let json = serde_json::to_string_pretty(&result.extraction)
                .context("Failed to serialize extraction")?;
            format!("{SUMMARY_HEADER}\n\n{json}")
        }
        (ExtractionResult::Unstructured { raw_text }, true) => {
            format!("{SUMMARY_HEADER}\n\n{raw_text}")
        }
        (ExtractionResult::Failed { message }, _) => {
            format!("Error: the food guide could not be processed.\nError message: {message}")
        }
        _ => "Error: the food guide could not be processed.".to_string(),
    };
    Ok(summary)
}
