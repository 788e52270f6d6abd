use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use console::style;
use std::time::Instant;

use imgconv::cli::usage_error_kind;
use imgconv::image_processing::report::ConversionReport;
use imgconv::utils::{
    create_progress_bar, error_println, format_duration, verbose_println, warn_println,
};
use imgconv::{Args, ConversionEngine, ConversionResult, JsonMessage};

fn describe(result: &ConversionResult) -> String {
    if result.written {
        format!(
            "{} {} → {}",
            style("✓").green().bold(),
            result.input.display(),
            result.output.display()
        )
    } else {
        format!(
            "{} {} → {} (dry run)",
            style("•").yellow().bold(),
            result.input.display(),
            result.output.display()
        )
    }
}

/// Error message followed by every underlying cause
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let mut args = Args::parse();

    args.load_and_merge_config()?;

    let request = match args.to_request() {
        Ok(request) => request,
        Err(err) => match usage_error_kind(&err) {
            Some(kind) => Args::command().error(kind, err).exit(),
            None => return Err(err).context("Invalid conversion request"),
        },
    };

    let json = args.json;
    let verbosity = request.verbosity;

    if verbosity > 0 {
        println!("{}", style("Image Converter").bold().blue());
        println!();
    }

    let engine = ConversionEngine::new(request);
    let options = *engine.options();
    let request = engine.request();

    verbose_println(verbosity, 2, "Configuration:");
    verbose_println(
        verbosity,
        2,
        &format!(
            "  Target: {} (extension .{})",
            request.target.codec, request.target.extension
        ),
    );
    verbose_println(verbosity, 2, &format!("  Input files: {}", request.input_paths.len()));
    verbose_println(
        verbosity,
        2,
        &format!(
            "  JPEG quality: {} (requested {})",
            options.quality, request.quality
        ),
    );
    verbose_println(
        verbosity,
        2,
        &format!(
            "  GIF colours: {} (requested {})",
            options.max_colours, request.max_colours
        ),
    );
    if request.dry_run {
        verbose_println(
            verbosity,
            1,
            "Dry run mode: enabled (simulation only - no files will be created)",
        );
    }

    let total = request.input_paths.len();
    let dry_run = request.dry_run;
    let progress = if !json && verbosity == 0 && total > 1 {
        let pb = create_progress_bar(total as u64);
        pb.set_message("Converting images");
        Some(pb)
    } else {
        None
    };

    let mut report = ConversionReport::new();
    let mut converted = 0usize;

    let outcome = engine.convert_all(|result| {
        converted += 1;
        if args.report {
            report.add(result);
        }

        if json {
            JsonMessage::file_completed(result).emit();
            return;
        }

        match &progress {
            Some(pb) => {
                pb.println(describe(result));
                pb.inc(1);
            }
            None => println!("{}", describe(result)),
        }
    });

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let elapsed = start_time.elapsed();

    if args.report && !json && !report.is_empty() {
        report.print();
    }

    match outcome {
        Ok(_) => {
            if json {
                JsonMessage::summary(total, converted, 0, elapsed.as_secs_f64()).emit();
            } else {
                let verb = if dry_run { "Checked" } else { "Converted" };
                println!(
                    "{} {} {} file(s) in {}",
                    style("✓").green().bold(),
                    verb,
                    style(converted).bold(),
                    format_duration(elapsed)
                );
            }
            Ok(())
        }
        Err(err) => {
            let skipped = total.saturating_sub(converted + 1);
            if json {
                JsonMessage::file_failed(err.input_path(), error_chain(&err)).emit();
                JsonMessage::summary(total, converted, 1, elapsed.as_secs_f64()).emit();
            } else {
                error_println(&err.failure_summary());
                if skipped > 0 {
                    warn_println(&format!(
                        "Stopped after the first failure: {} remaining file(s) not processed",
                        skipped
                    ));
                }
            }

            let step = err.step();
            Err(err).with_context(|| format!("Conversion failed during {} step", step))
        }
    }
}
