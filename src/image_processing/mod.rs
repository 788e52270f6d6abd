pub mod codec;
pub mod format;
pub mod report;

use image::GenericImageView;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::ConvertError;
use crate::utils::{format_bytes, output_path_for, verbose_println};

pub use codec::{EncodeOptions, DEFAULT_MAX_COLOURS, DEFAULT_QUALITY};
pub use format::{Codec, Detection, TargetFormat};

/// A validated conversion job, built once from the command line
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub target: TargetFormat,
    pub input_paths: Vec<PathBuf>,
    /// JPEG quality as given; normalised by [`EncodeOptions::new`]
    pub quality: i32,
    /// GIF palette size as given; normalised by [`EncodeOptions::new`]
    pub max_colours: i32,
    pub verbosity: u8,
    pub dry_run: bool,
}

impl ConversionRequest {
    pub fn new(target: TargetFormat, input_paths: Vec<PathBuf>) -> Result<Self, ConvertError> {
        if input_paths.is_empty() {
            return Err(ConvertError::Usage(
                "no input file provided (use -i/--infile)".to_string(),
            ));
        }

        Ok(Self {
            target,
            input_paths,
            quality: DEFAULT_QUALITY,
            max_colours: DEFAULT_MAX_COLOURS,
            verbosity: 0,
            dry_run: false,
        })
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions::new(self.quality, self.max_colours)
    }
}

/// Outcome of one successfully converted input file
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source: Codec,
    pub detection: Detection,
    pub target: Codec,
    pub width: u32,
    pub height: u32,
    pub bytes_written: u64,
    /// False for dry runs
    pub written: bool,
    pub duration: Duration,
}

/// Drives decode and encode for every input file of a request
pub struct ConversionEngine {
    request: ConversionRequest,
    options: EncodeOptions,
}

impl ConversionEngine {
    pub fn new(request: ConversionRequest) -> Self {
        let options = request.encode_options();
        Self { request, options }
    }

    pub fn request(&self) -> &ConversionRequest {
        &self.request
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Convert every input in order, stopping at the first failure.
    /// `on_converted` runs after each successful file.
    pub fn convert_all<F>(&self, mut on_converted: F) -> Result<Vec<ConversionResult>, ConvertError>
    where
        F: FnMut(&ConversionResult),
    {
        let mut results = Vec::with_capacity(self.request.input_paths.len());

        for input in &self.request.input_paths {
            let result = self.convert_file(input)?;
            on_converted(&result);
            results.push(result);
        }

        Ok(results)
    }

    /// Convert a single file to `<input>.<target extension>`
    pub fn convert_file(&self, input: &Path) -> Result<ConversionResult, ConvertError> {
        let start = Instant::now();
        let verbosity = self.request.verbosity;
        let target = &self.request.target;

        verbose_println(verbosity, 1, &format!("Reading file {}...", input.display()));
        let bytes = fs::read(input).map_err(|source| ConvertError::Read {
            input: input.to_path_buf(),
            source,
        })?;
        verbose_println(
            verbosity,
            3,
            &format!("Read {} in {:?}", format_bytes(bytes.len() as u64), start.elapsed()),
        );

        let (source, detection) = format::resolve_decoder(input, &bytes)?;
        verbose_println(
            verbosity,
            2,
            &format!("Decoding as {} (detected from {})", source, detection.describe()),
        );

        verbose_println(verbosity, 1, "Decoding image from file...");
        let decode_start = Instant::now();
        let image = codec::decode(&bytes, source).map_err(|err| ConvertError::Decode {
            input: input.to_path_buf(),
            codec: source,
            source: err,
        })?;
        drop(bytes);

        let (width, height) = image.dimensions();
        verbose_println(
            verbosity,
            2,
            &format!("Decoded {}x{} image ({:?})", width, height, image.color()),
        );
        verbose_println(verbosity, 3, &format!("Decoded in {:?}", decode_start.elapsed()));

        let output = output_path_for(input, &target.extension);

        if self.request.dry_run {
            verbose_println(
                verbosity,
                1,
                &format!("Dry run: would write {}", output.display()),
            );
            return Ok(ConversionResult {
                input: input.to_path_buf(),
                output,
                source,
                detection,
                target: target.codec,
                width,
                height,
                bytes_written: 0,
                written: false,
                duration: start.elapsed(),
            });
        }

        verbose_println(verbosity, 1, &format!("Creating output file {}...", output.display()));
        let mut file = File::create(&output).map_err(|source| ConvertError::Write {
            input: input.to_path_buf(),
            output: output.clone(),
            source,
        })?;

        verbose_println(
            verbosity,
            1,
            &format!("Writing image to {} format...", target.extension.to_lowercase()),
        );
        match target.codec {
            Codec::Jpeg => verbose_println(
                verbosity,
                2,
                &format!("JPEG quality: {}", self.options.quality),
            ),
            Codec::Gif => verbose_println(
                verbosity,
                2,
                &format!("GIF palette: up to {} colours", self.options.max_colours),
            ),
            Codec::Png => {}
        }

        let encode_start = Instant::now();
        let encoded = codec::encode(&image, target.codec, &self.options).map_err(|err| {
            ConvertError::Encode {
                input: input.to_path_buf(),
                output: output.clone(),
                codec: target.codec,
                source: err,
            }
        })?;
        verbose_println(verbosity, 3, &format!("Encoded in {:?}", encode_start.elapsed()));

        file.write_all(&encoded)
            .and_then(|_| file.flush())
            .map_err(|source| ConvertError::Write {
                input: input.to_path_buf(),
                output: output.clone(),
                source,
            })?;
        verbose_println(
            verbosity,
            3,
            &format!("Wrote {} to {}", format_bytes(encoded.len() as u64), output.display()),
        );

        Ok(ConversionResult {
            input: input.to_path_buf(),
            output,
            source,
            detection,
            target: target.codec,
            width,
            height,
            bytes_written: encoded.len() as u64,
            written: true,
            duration: start.elapsed(),
        })
    }
}
