// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PdfZipper: turn folders of scanned issue pages into one PDF per folder.
//
// Entry point. Parses flags, merges them over an optional JSON config file,
// initialises logging, runs the pipeline and prints the summary.

mod console;
mod summary;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use indicatif::MultiProgress;
use pdfzipper_batch::{CancellationToken, NoProgress, ProgressSink};
use pdfzipper_core::ConversionOptions;
use pdfzipper_core::human_errors::humanize_error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use console::{BarSafeStderr, ConsoleProgress};

/// Exit status when `--fail-on-error` is set and a folder failed.
const EXIT_FOLDER_FAILURES: u8 = 3;

/// Compress folders of JPEG pages into one size-bounded PDF per folder.
///
/// Every direct subfolder of the input folder whose name contains a digit is
/// one issue. Its .jpg/.jpeg files, in file name order, become the pages.
#[derive(Debug, Parser)]
#[command(name = "pdfzipper", author, version, about, long_about = None)]
struct Cli {
    /// Folder holding one subfolder per issue [default: InputImages]
    #[arg(short = 'i', long, value_name = "DIR")]
    input_folder: Option<PathBuf>,

    /// Where the PDFs are written [default: OutputPDFs]
    #[arg(short = 'o', long, value_name = "DIR")]
    output_folder: Option<PathBuf>,

    /// PDF file name template, must contain {name} [default: "{name} - Output.pdf"]
    #[arg(short = 'f', long, value_name = "TEMPLATE")]
    file_naming: Option<String>,

    /// JPEG quality 1-100, also the fallback when nothing fits [default: 90]
    #[arg(short = 'q', long)]
    quality: Option<u8>,

    /// Leave folders alone whose PDF already exists
    #[arg(short = 's', long)]
    skip_existing: bool,

    /// Process one folder at a time
    #[arg(short = 'n', long)]
    no_parallel: bool,

    /// Per-image size budget in KB, 0 disables the search [default: 0]
    #[arg(short = 'm', long = "max-image-size", value_name = "KB")]
    max_image_size: Option<u32>,

    /// Scale factor applied to each image before compression [default: 1.0]
    #[arg(short = 'r', long, value_name = "FACTOR")]
    rescale: Option<f32>,

    /// Upper bound on parallel workers [default: number of CPUs]
    #[arg(short = 'j', long, value_name = "N")]
    jobs: Option<usize>,

    /// JSON options file; flags given on the command line win
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Exit with status 3 when any folder failed
    #[arg(long)]
    fail_on_error: bool,

    /// Do not draw progress bars
    #[arg(long)]
    no_progress: bool,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Defaults, then the config file, then explicit flags.
    fn options(&self) -> anyhow::Result<ConversionOptions> {
        let mut options = match &self.config {
            Some(path) => ConversionOptions::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ConversionOptions::default(),
        };

        if let Some(input) = &self.input_folder {
            options.input_folder = input.clone();
        }
        if let Some(output) = &self.output_folder {
            options.output_folder = output.clone();
        }
        if let Some(template) = &self.file_naming {
            options.file_naming = template.clone();
        }
        if let Some(quality) = self.quality {
            options.quality = quality;
        }
        if let Some(kb) = self.max_image_size {
            options.max_image_size_kb = kb;
        }
        if let Some(factor) = self.rescale {
            options.scale_factor = factor;
        }
        if let Some(jobs) = self.jobs {
            options.max_workers = Some(jobs);
        }
        if self.skip_existing {
            options.skip_existing = true;
        }
        if self.no_parallel {
            options.parallel = false;
        }
        Ok(options)
    }

    fn log_filter(&self) -> EnvFilter {
        let default = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log lines are printed with the bars suspended so they don't tear them.
    let multi = MultiProgress::new();
    let writer = if cli.no_progress {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        let multi = multi.clone();
        BoxMakeWriter::new(move || BarSafeStderr::new(multi.clone()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(writer)
        .init();

    match execute(&cli, multi) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli, multi: MultiProgress) -> anyhow::Result<ExitCode> {
    let options = cli.options()?;
    tracing::info!(
        input = %options.input_folder.display(),
        output = %options.output_folder.display(),
        quality = options.quality,
        max_image_size_kb = options.max_image_size_kb,
        parallel = options.parallel,
        "PdfZipper starting"
    );

    let console;
    let sink: &dyn ProgressSink = if cli.no_progress {
        &NoProgress
    } else {
        console = ConsoleProgress::new(multi);
        &console
    };

    let report = match pdfzipper_batch::run(&options, sink, &CancellationToken::new()) {
        Ok(report) => report,
        Err(err) => {
            tracing::debug!(error = ?err, "Run aborted");
            let human = humanize_error(&err);
            eprintln!("{}\n  {}", human.message, human.suggestion);
            return Ok(ExitCode::FAILURE);
        }
    };

    print!("{}", summary::render(&report));

    if cli.fail_on_error && report.has_failures() {
        return Ok(ExitCode::from(EXIT_FOLDER_FAILURES));
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pdfzipper").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn no_flags_gives_defaults() {
        let options = parse(&[]).options().expect("options");
        assert_eq!(options, ConversionOptions::default());
    }

    #[test]
    fn short_flags_map_to_options() {
        let cli = parse(&[
            "-i", "scans", "-o", "pdfs", "-f", "Issue {name}.pdf", "-q", "70", "-s", "-n", "-m",
            "300", "-r", "0.5", "-j", "2",
        ]);
        let options = cli.options().expect("options");
        assert_eq!(options.input_folder, PathBuf::from("scans"));
        assert_eq!(options.output_folder, PathBuf::from("pdfs"));
        assert_eq!(options.file_naming, "Issue {name}.pdf");
        assert_eq!(options.quality, 70);
        assert!(options.skip_existing);
        assert!(!options.parallel);
        assert_eq!(options.max_image_size_kb, 300);
        assert_eq!(options.scale_factor, 0.5);
        assert_eq!(options.max_workers, Some(2));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pdfzipper.json");
        let config = serde_json::json!({
            "quality": 60,
            "max_image_size_kb": 500,
            "skip_existing": true,
            "output_folder": "from-config",
        });
        std::fs::write(&path, config.to_string()).expect("write config");

        let cli = parse(&["-c", path.to_str().expect("utf-8 path"), "-q", "80"]);
        let options = cli.options().expect("options");
        assert_eq!(options.quality, 80);
        assert_eq!(options.max_image_size_kb, 500);
        assert!(options.skip_existing);
        assert_eq!(options.output_folder, PathBuf::from("from-config"));
        assert_eq!(options.input_folder, PathBuf::from("InputImages"));
    }

    #[test]
    fn broken_config_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").expect("write config");

        let cli = parse(&["--config", path.to_str().expect("utf-8 path")]);
        let err = cli.options().expect_err("invalid config");
        assert!(format!("{err:#}").contains("loading config"));
    }

    #[test]
    fn verbosity_counts() {
        assert_eq!(parse(&["-vv"]).verbose, 2);
        assert!(parse(&["--fail-on-error", "--no-progress"]).fail_on_error);
    }
}
