//! Conversion report generation for the --report flag
//!
//! Builds a formatted table with one row per converted file.

use prettytable::{format, Cell, Row, Table};
use std::time::Duration;

use super::ConversionResult;
use crate::utils::{display_name, format_bytes, format_duration};

/// Single converted file in the report
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub input_filename: String,
    pub output_filename: String,
    pub conversion: String,
    pub dimensions: String,
    pub size: String,
    pub duration: Duration,
}

impl From<&ConversionResult> for ReportEntry {
    fn from(result: &ConversionResult) -> Self {
        Self {
            input_filename: display_name(&result.input),
            output_filename: display_name(&result.output),
            conversion: format!("{} → {}", result.source, result.target),
            dimensions: format!("{}x{}", result.width, result.height),
            size: if result.written {
                format_bytes(result.bytes_written)
            } else {
                "-".to_string()
            },
            duration: result.duration,
        }
    }
}

/// Complete conversion report
#[derive(Debug, Default)]
pub struct ConversionReport {
    pub entries: Vec<ReportEntry>,
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: &ConversionResult) {
        self.entries.push(ReportEntry::from(result));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        table.add_row(Row::new(vec![
            Cell::new("Input"),
            Cell::new("Output"),
            Cell::new("Format"),
            Cell::new("Size"),
            Cell::new("Bytes"),
            Cell::new("Time"),
        ]));

        for entry in &self.entries {
            table.add_row(Row::new(vec![
                Cell::new(&truncate(&entry.input_filename, 30)),
                Cell::new(&truncate(&entry.output_filename, 35)),
                Cell::new(&entry.conversion),
                Cell::new(&entry.dimensions),
                Cell::new(&entry.size),
                Cell::new(&format_duration(entry.duration)),
            ]));
        }

        table
    }

    /// Print the report as a formatted table
    pub fn print(&self) {
        println!();
        println!("CONVERSION REPORT ({} files)\n", self.entries.len());
        self.to_table().printstd();
        println!();
    }
}

/// Truncate string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
