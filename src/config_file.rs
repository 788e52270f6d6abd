use crate::cli::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Defaults loaded from a `--config` JSON file
#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub format: Option<String>,
    pub quality: Option<i32>,
    pub num_colours: Option<i32>,
    pub verbose: Option<u8>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

impl Args {
    /// Load the configuration file, if one was given, and merge it.
    /// Command-line arguments take precedence over config file values.
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let config = ConfigFile::load(&config_path)?;
            self.merge_from_config(config);

            if self.verbose > 0 && !self.json {
                println!("Loaded configuration from: {}", config_path.display());
            }
        }
        Ok(())
    }

    fn merge_from_config(&mut self, config: ConfigFile) {
        // A shorthand command already names the target
        if self.format.is_none() && self.command.is_none() {
            self.format = config.format;
        }

        if self.quality.is_none() {
            self.quality = config.quality;
        }

        if self.num_colours.is_none() {
            self.num_colours = config.num_colours;
        }

        if self.verbose == 0 {
            self.verbose = config.verbose.unwrap_or(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::Codec;
    use clap::Parser;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, json: &str) -> String {
        let path = dir.path().join("imgconv.json");
        fs::write(&path, json).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_config_fills_unset_values() {
        let dir = TempDir::new().unwrap();
        let config = write_config(
            &dir,
            r#"{ "format": "gif", "quality": 70, "numColours": 32, "verbose": 2 }"#,
        );

        let mut args = Args::try_parse_from(["imgconv", "--config", config.as_str(), "-i", "a.png"]).unwrap();
        args.load_and_merge_config().unwrap();
        let request = args.to_request().unwrap();

        assert_eq!(request.target.codec, Codec::Gif);
        assert_eq!(request.quality, 70);
        assert_eq!(request.max_colours, 32);
        assert_eq!(request.verbosity, 2);
    }

    #[test]
    fn test_command_line_wins() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, r#"{ "format": "gif", "quality": 70 }"#);

        let mut args = Args::try_parse_from([
            "imgconv", "--config", config.as_str(), "-f", "png", "-q", "20", "-i", "a.jpg",
        ])
        .unwrap();
        args.load_and_merge_config().unwrap();
        let request = args.to_request().unwrap();

        assert_eq!(request.target.codec, Codec::Png);
        assert_eq!(request.quality, 20);
        assert_eq!(request.max_colours, 256);
    }

    #[test]
    fn test_shorthand_command_ignores_config_format() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, r#"{ "format": "gif" }"#);

        let mut args =
            Args::try_parse_from(["imgconv", "png2jpg", "--config", config.as_str(), "-i", "a.png"]).unwrap();
        args.load_and_merge_config().unwrap();

        assert_eq!(args.to_request().unwrap().target.codec, Codec::Jpeg);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, r#"{ "format": "gif", "palette": 3 }"#);

        let mut args = Args::try_parse_from(["imgconv", "--config", config.as_str(), "-i", "a.png"]).unwrap();
        let err = args.load_and_merge_config().unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = ConfigFile::load(Path::new("/nonexistent/imgconv.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_empty_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{}");
        assert_eq!(ConfigFile::load(Path::new(&path)).unwrap(), ConfigFile::default());
    }
}
