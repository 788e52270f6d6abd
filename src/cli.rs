use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::error::ConvertError;
use crate::image_processing::{
    Codec, ConversionRequest, TargetFormat, DEFAULT_MAX_COLOURS, DEFAULT_QUALITY,
};

#[derive(Parser, Debug)]
#[command(
    name = "imgconv",
    about = "Convert images between PNG, JPEG and GIF",
    disable_help_flag = true,
    long_about = "
Image Converter

Decodes each input image and re-encodes it into the target format. The output
file is written next to the input, with the target extension APPENDED to the
full input name: converting photo.png to jpeg writes photo.png.jpeg.

Input formats are detected from the file extension (png, jpg, jpeg, gif),
falling back to the file content when the extension is missing or unknown.

Files are converted in the order given; the first failure stops the run.

Example Usage:
  # Convert a PNG to JPEG at quality 85
  imgconv -f jpeg -q 85 -i photo.png

  # Convert several files to GIF with a 64 colour palette
  imgconv -f gif -n 64 -i a.png -i b.jpg

  # Shorthand command form
  imgconv png2jpg -i photo.png

  # Show what would be written without creating files
  imgconv -f png -i scan.jpg --dry-run -v"
)]
pub struct Args {
    /// Optional shorthand command: 'convert', or '<from>2<to>' / '<from>to<to>' (e.g. png2jpg)
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Target format: png, jpeg, jpg or gif
    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        required_unless_present_any = ["command", "config_file"]
    )]
    pub format: Option<String>,

    /// Input image file (can be specified multiple times)
    #[arg(short = 'i', long = "infile", value_name = "FILE", required = true)]
    pub input_paths: Vec<PathBuf>,

    /// JPEG quality in the range 1..100, higher is better [default: 100]
    #[arg(
        short = 'q',
        long = "quality",
        value_name = "1-100",
        allow_negative_numbers = true
    )]
    pub quality: Option<i32>,

    /// Maximum number of GIF palette colours in the range 1..256 [default: 256]
    #[arg(
        short = 'n',
        long = "num-colours",
        value_name = "1-256",
        allow_negative_numbers = true
    )]
    pub num_colours: Option<i32>,

    /// Increase diagnostic output (repeat for more detail)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// JSON configuration file supplying defaults for format, quality, colours and verbosity
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Emit results as JSON lines instead of human readable output
    #[arg(long = "json")]
    pub json: bool,

    /// Print a table of converted files at the end
    #[arg(long = "report")]
    pub report: bool,

    /// Decode inputs and show output names without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print help
    #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Args {
    /// Target codec named by the shorthand command, if any.
    /// `Ok(None)` means the plain `convert` command.
    pub fn parse_command(command: &str) -> Result<Option<Codec>, ConvertError> {
        let lowered = command.to_lowercase();
        if lowered == "convert" {
            return Ok(None);
        }

        let pair = lowered
            .split_once('2')
            .or_else(|| lowered.split_once("to"));

        if let Some((from, to)) = pair {
            if let (Some(from), Some(to)) = (Codec::from_name(from), Codec::from_name(to)) {
                if from != to {
                    return Ok(Some(to));
                }
            }
        }

        Err(ConvertError::UnknownCommand(command.to_string()))
    }

    /// Resolve the target format from the shorthand command and --format
    pub fn target_format(&self) -> Result<TargetFormat, ConvertError> {
        let from_command = match &self.command {
            Some(command) => Self::parse_command(command)?,
            None => None,
        };

        match (from_command, &self.format) {
            (None, Some(format)) => TargetFormat::parse(format),
            (Some(codec), None) => Ok(TargetFormat::canonical(codec)),
            (Some(codec), Some(format)) => {
                let target = TargetFormat::parse(format)?;
                if target.codec != codec {
                    return Err(ConvertError::ConflictingTarget {
                        command: self.command.clone().unwrap_or_default(),
                        command_target: codec,
                        format_target: target.codec,
                    });
                }
                Ok(target)
            }
            (None, None) => Err(ConvertError::Usage(
                "no target format given (use -f/--format)".to_string(),
            )),
        }
    }

    /// Build the validated conversion request
    pub fn to_request(&self) -> Result<ConversionRequest, ConvertError> {
        let mut request = ConversionRequest::new(self.target_format()?, self.input_paths.clone())?;
        request.quality = self.quality.unwrap_or(DEFAULT_QUALITY);
        request.max_colours = self.num_colours.unwrap_or(DEFAULT_MAX_COLOURS);
        // JSON lines on stdout must stay machine readable
        request.verbosity = if self.json { 0 } else { self.verbose };
        request.dry_run = self.dry_run;
        Ok(request)
    }
}

/// clap error kind for command line mistakes found after parsing.
/// `None` for errors that are not about the command line.
pub fn usage_error_kind(err: &ConvertError) -> Option<ErrorKind> {
    match err {
        ConvertError::Usage(_) => Some(ErrorKind::MissingRequiredArgument),
        ConvertError::UnknownCommand(_) => Some(ErrorKind::InvalidValue),
        ConvertError::ConflictingTarget { .. } => Some(ErrorKind::ArgumentConflict),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("imgconv").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["-f", "jpeg", "-i", "photo.png"]).unwrap();
        let request = args.to_request().unwrap();

        assert_eq!(request.target.codec, Codec::Jpeg);
        assert_eq!(request.target.extension, "jpeg");
        assert_eq!(request.input_paths, vec![PathBuf::from("photo.png")]);
        assert_eq!(request.quality, 100);
        assert_eq!(request.max_colours, 256);
        assert_eq!(request.verbosity, 0);
        assert!(!request.dry_run);
    }

    #[test]
    fn test_long_flags_and_repeated_inputs() {
        let args = parse(&[
            "--format", "gif", "--infile", "b.png", "--infile", "a.jpg", "--num-colours", "16",
            "--quality", "40",
        ])
        .unwrap();
        let request = args.to_request().unwrap();

        assert_eq!(
            request.input_paths,
            vec![PathBuf::from("b.png"), PathBuf::from("a.jpg")]
        );
        assert_eq!(request.max_colours, 16);
        assert_eq!(request.quality, 40);
    }

    #[test]
    fn test_verbose_counts() {
        let args = parse(&["-v", "-f", "png", "-v", "-i", "x.gif", "--verbose"]).unwrap();
        assert_eq!(args.to_request().unwrap().verbosity, 3);

        let args = parse(&["-vv", "-f", "png", "-i", "x.gif"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_json_silences_verbose() {
        let args = parse(&["-vvv", "--json", "-f", "png", "-i", "x.gif"]).unwrap();
        assert_eq!(args.to_request().unwrap().verbosity, 0);
    }

    #[test]
    fn test_out_of_range_values_are_accepted() {
        let args = parse(&["-f", "jpeg", "-i", "x.png", "-q", "0", "-n", "300"]).unwrap();
        let request = args.to_request().unwrap();
        assert_eq!(request.quality, 0);
        assert_eq!(request.max_colours, 300);

        let args = parse(&["-f", "jpeg", "-i", "x.png", "-q", "-5", "-n", "-1"]).unwrap();
        assert_eq!(args.quality, Some(-5));
        assert_eq!(args.num_colours, Some(-1));
    }

    #[test]
    fn test_non_numeric_quality_is_usage_error() {
        let err = parse(&["-f", "jpeg", "-i", "x.png", "-q", "high"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_missing_required_arguments() {
        let err = parse(&["-i", "x.png"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["-f", "png"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["-f", "png", "-i"]).unwrap_err();
        assert_ne!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_unknown_flag() {
        let err = parse(&["-f", "png", "-i", "x.gif", "--resize"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_help_flags() {
        for flag in ["-h", "--help", "-?"] {
            let err = parse(&[flag]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DisplayHelp, "flag {}", flag);
            assert_eq!(err.exit_code(), 0);
        }
    }

    #[test]
    fn test_unsupported_target_format() {
        let args = parse(&["-f", "webp", "-i", "x.png"]).unwrap();
        let err = args.to_request().unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_format_spelling_becomes_extension() {
        let args = parse(&["-f", ".JPG", "-i", "x.png"]).unwrap();
        let request = args.to_request().unwrap();
        assert_eq!(request.target.codec, Codec::Jpeg);
        assert_eq!(request.target.extension, "JPG");
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(Args::parse_command("convert").unwrap(), None);
        assert_eq!(Args::parse_command("CONVERT").unwrap(), None);
        assert_eq!(Args::parse_command("png2jpg").unwrap(), Some(Codec::Jpeg));
        assert_eq!(Args::parse_command("jpegtopng").unwrap(), Some(Codec::Png));
        assert_eq!(Args::parse_command("gif2jpeg").unwrap(), Some(Codec::Jpeg));
        assert_eq!(Args::parse_command("pngtogif").unwrap(), Some(Codec::Gif));

        assert!(Args::parse_command("png2png").is_err());
        assert!(Args::parse_command("jpg2jpeg").is_err());
        assert!(Args::parse_command("bmp2png").is_err());
        assert!(Args::parse_command("resize").is_err());
    }

    #[test]
    fn test_usage_error_kinds() {
        let err = Args::parse_command("resize").unwrap_err();
        assert!(matches!(err, ConvertError::UnknownCommand(ref name) if name == "resize"));
        assert_eq!(usage_error_kind(&err), Some(ErrorKind::InvalidValue));
        assert_eq!(err.step(), "usage");

        let args = parse(&["convert", "-i", "photo.png"]).unwrap();
        let err = args.to_request().unwrap_err();
        assert_eq!(usage_error_kind(&err), Some(ErrorKind::MissingRequiredArgument));

        let args = parse(&["-f", "webp", "-i", "photo.png"]).unwrap();
        assert_eq!(usage_error_kind(&args.to_request().unwrap_err()), None);
    }

    #[test]
    fn test_shorthand_command_sets_target() {
        let args = parse(&["png2jpg", "-i", "photo.png"]).unwrap();
        let request = args.to_request().unwrap();
        assert_eq!(request.target.codec, Codec::Jpeg);
        assert_eq!(request.target.extension, "jpeg");
    }

    #[test]
    fn test_convert_command_needs_format() {
        let args = parse(&["convert", "-i", "photo.png"]).unwrap();
        assert!(matches!(args.to_request(), Err(ConvertError::Usage(_))));

        let args = parse(&["convert", "-f", "gif", "-i", "photo.png"]).unwrap();
        assert_eq!(args.to_request().unwrap().target.codec, Codec::Gif);
    }

    #[test]
    fn test_conflicting_command_and_format() {
        let args = parse(&["png2jpg", "-f", "gif", "-i", "photo.png"]).unwrap();
        let err = args.to_request().unwrap_err();
        assert!(matches!(
            err,
            ConvertError::ConflictingTarget {
                command_target: Codec::Jpeg,
                format_target: Codec::Gif,
                ..
            }
        ));
        assert_eq!(usage_error_kind(&err), Some(ErrorKind::ArgumentConflict));

        let args = parse(&["png2jpg", "-f", "JPG", "-i", "photo.png"]).unwrap();
        assert_eq!(args.to_request().unwrap().target.extension, "JPG");
    }
}
