// Library exports for reuse by the binary and other applications
pub mod cli;
pub mod config_file;
pub mod error;
pub mod image_processing;
pub mod json_output;
pub mod utils;

// Re-export commonly used types
pub use cli::Args;
pub use error::ConvertError;
pub use image_processing::{
    Codec, ConversionEngine, ConversionRequest, ConversionResult, EncodeOptions, TargetFormat,
};
pub use json_output::JsonMessage;
