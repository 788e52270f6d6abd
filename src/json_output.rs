//! JSON output for scripting
//!
//! When the --json flag is enabled, per-file results and the final summary
//! are emitted as JSON lines to stdout, suppressing all other output.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::image_processing::ConversionResult;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// File conversion completed
    FileCompleted {
        input_path: String,
        output_path: String,
        source_format: String,
        target_format: String,
        width: u32,
        height: u32,
        bytes_written: u64,
        processing_time_ms: u128,
    },
    /// File conversion failed
    FileFailed { input_path: String, error: String },
    /// Run summary
    Summary {
        total_files: usize,
        converted: usize,
        failed: usize,
        skipped: usize,
        duration_secs: f64,
    },
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn file_completed(result: &ConversionResult) -> Self {
        Self::FileCompleted {
            input_path: result.input.display().to_string(),
            output_path: result.output.display().to_string(),
            source_format: result.source.to_string(),
            target_format: result.target.to_string(),
            width: result.width,
            height: result.height,
            bytes_written: result.bytes_written,
            processing_time_ms: result.duration.as_millis(),
        }
    }

    pub fn file_failed(input_path: Option<&Path>, error: impl Into<String>) -> Self {
        Self::FileFailed {
            input_path: input_path
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            error: error.into(),
        }
    }

    pub fn summary(total_files: usize, converted: usize, failed: usize, duration_secs: f64) -> Self {
        Self::Summary {
            total_files,
            converted,
            failed,
            skipped: total_files.saturating_sub(converted + failed),
            duration_secs,
        }
    }
}
