use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::image_processing::Codec;

/// Everything that can abort a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Malformed or missing command line arguments
    #[error("{0}")]
    Usage(String),

    #[error(
        "unknown command: '{0}'. Use 'convert' or a shorthand such as png2jpg, jpgtogif"
    )]
    UnknownCommand(String),

    #[error("command '{command}' converts to {command_target} but --format asks for {format_target}")]
    ConflictingTarget {
        command: String,
        command_target: Codec,
        format_target: Codec,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error(
        "cannot determine the image format of '{}' from its extension or content",
        .input.display()
    )]
    UnrecognizedInput { input: PathBuf },

    #[error("failed to read '{}'", .input.display())]
    Read {
        input: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode '{}' as {codec}", .input.display())]
    Decode {
        input: PathBuf,
        codec: Codec,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write '{}' (from '{}')", .output.display(), .input.display())]
    Write {
        input: PathBuf,
        output: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode '{}' as {codec}", .input.display())]
    Encode {
        input: PathBuf,
        output: PathBuf,
        codec: Codec,
        #[source]
        source: image::ImageError,
    },
}

impl ConvertError {
    pub fn unsupported_target(name: &str) -> Self {
        ConvertError::UnsupportedFormat(format!(
            "'{}' is not a known target format (supported: {})",
            name,
            Codec::supported_names()
        ))
    }

    pub fn unrecognized_input(input: &Path) -> Self {
        ConvertError::UnrecognizedInput {
            input: input.to_path_buf(),
        }
    }

    /// Input file the error is about, if any
    pub fn input_path(&self) -> Option<&Path> {
        match self {
            ConvertError::Usage(_)
            | ConvertError::UnknownCommand(_)
            | ConvertError::ConflictingTarget { .. }
            | ConvertError::UnsupportedFormat(_) => None,
            ConvertError::UnrecognizedInput { input }
            | ConvertError::Read { input, .. }
            | ConvertError::Decode { input, .. }
            | ConvertError::Write { input, .. }
            | ConvertError::Encode { input, .. } => Some(input),
        }
    }

    /// One-line description of which file failed and where
    pub fn failure_summary(&self) -> String {
        match self.input_path() {
            Some(input) => format!("{}: {} step failed", input.display(), self.step()),
            None => format!("{} step failed", self.step()),
        }
    }

    /// Short name of the step that failed
    pub fn step(&self) -> &'static str {
        match self {
            ConvertError::Usage(_)
            | ConvertError::UnknownCommand(_)
            | ConvertError::ConflictingTarget { .. } => "usage",
            ConvertError::UnsupportedFormat(_) | ConvertError::UnrecognizedInput { .. } => {
                "resolve"
            }
            ConvertError::Read { .. } => "read",
            ConvertError::Decode { .. } => "decode",
            ConvertError::Write { .. } => "write",
            ConvertError::Encode { .. } => "encode",
        }
    }
}
