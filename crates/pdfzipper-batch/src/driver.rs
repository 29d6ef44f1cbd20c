// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline driver: one call from options to a full run report.

use std::collections::HashSet;

use pdfzipper_core::error::{Result, ZipperError};
use pdfzipper_core::{ConversionOptions, FolderOutcome, RunReport};
use tracing::{info, instrument, warn};

use crate::cancel::CancellationToken;
use crate::discovery::{Discovered, discover};
use crate::progress::ProgressSink;
use crate::scheduler::Scheduler;

/// Validate `options`, discover issue folders, create the output folder and
/// schedule every folder.
///
/// Returns `Err` only for run-level failures (bad options, missing input, no
/// issue folders, unusable output folder). Per-folder failures are inside
/// the report, which lists folders in name order.
///
/// Folder names reach the file system through a lossy UTF-8 conversion, so
/// two distinct non-UTF-8 names can map to one PDF. The later folder then
/// fails with [`ZipperError::DestinationCollision`] and is never assembled.
#[instrument(skip_all, fields(input = %options.input_folder.display()))]
pub fn run(
    options: &ConversionOptions,
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<RunReport> {
    options.validate()?;

    let input = &options.input_folder;
    if !input.is_dir() {
        return Err(ZipperError::InputNotFound {
            path: input.clone(),
        });
    }

    let discovered = discover(input)?;
    if discovered.is_empty() {
        return Err(ZipperError::NoFoldersFound {
            path: input.clone(),
        });
    }
    info!(folders = discovered.len(), "Discovered issue folders");

    std::fs::create_dir_all(&options.output_folder)
        .map_err(|err| ZipperError::folder_io(&options.output_folder, err))?;

    // Unlisted and colliding folders keep their slot; everything else is
    // scheduled. The first folder in name order claims a destination.
    let mut slots: Vec<Option<FolderOutcome>> = Vec::with_capacity(discovered.len());
    let mut jobs = Vec::new();
    let mut claimed = HashSet::new();
    for candidate in discovered {
        match candidate {
            Discovered::Ready(job) => {
                let destination = options.destination_for(job.name());
                if !job.is_empty() && !claimed.insert(destination.clone()) {
                    warn!(
                        folder = %job.path().display(),
                        path = %destination.display(),
                        "Folder maps to a destination already in use"
                    );
                    let error = ZipperError::DestinationCollision { path: destination };
                    slots.push(Some(FolderOutcome::new(job, Err(error))));
                    continue;
                }
                slots.push(None);
                jobs.push(job);
            }
            Discovered::Unlisted { job, error } => {
                slots.push(Some(FolderOutcome::new(job, Err(error))));
            }
        }
    }

    let mut scheduled = Scheduler::new(options, progress, cancel.clone())
        .run(jobs)
        .into_iter();
    let outcomes = slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| scheduled.next()))
        .collect();

    Ok(RunReport::new(outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::testing::{RecordingSink, Workspace};
    use pdfzipper_core::AssemblyResult;

    #[test]
    fn writes_one_pdf_per_folder() {
        let ws = Workspace::new();
        ws.folder("2017_01_03", 2);
        ws.folder("2017_01_10", 1);

        let sink = RecordingSink::new();
        let report = run(&ws.options, &sink, &CancellationToken::new()).expect("run");

        assert_eq!(report.written().count(), 2);
        assert!(!report.has_failures());
        assert_eq!(
            ws.output_files(),
            vec!["2017_01_03 - Output.pdf", "2017_01_10 - Output.pdf"]
        );
        assert_eq!(sink.pages_for("2017_01_03"), vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn second_run_with_skip_existing_writes_nothing() {
        let ws = Workspace::new();
        ws.folder("1", 1);
        ws.folder("2", 2);
        let options = ConversionOptions {
            skip_existing: true,
            ..ws.options.clone()
        };

        let first = run(&options, &NoProgress, &CancellationToken::new()).expect("first run");
        assert_eq!(first.written().count(), 2);
        let before: Vec<_> = ws
            .output_files()
            .iter()
            .map(|name| std::fs::read(options.output_folder.join(name)).expect("read"))
            .collect();

        let second = run(&options, &NoProgress, &CancellationToken::new()).expect("second run");
        assert_eq!(second.written().count(), 0);
        assert!(second.outcomes.iter().all(|o| matches!(
            o.result,
            Ok(AssemblyResult::SkippedExisting(_))
        )));
        let after: Vec<_> = ws
            .output_files()
            .iter()
            .map(|name| std::fs::read(options.output_folder.join(name)).expect("read"))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn empty_folder_is_skipped_and_others_written() {
        let ws = Workspace::new();
        ws.folder("2019_01", 0);
        ws.folder("2019_02", 1);

        let report = run(&ws.options, &NoProgress, &CancellationToken::new()).expect("run");
        assert!(matches!(
            report.outcomes[0].result,
            Ok(AssemblyResult::SkippedEmpty)
        ));
        assert!(report.outcomes[1].is_written());
        assert_eq!(ws.output_files(), vec!["2019_02 - Output.pdf"]);
    }

    #[test]
    fn corrupt_folder_does_not_stop_the_run() {
        let ws = Workspace::new();
        ws.folder("a1", 1);
        ws.corrupt_folder("a2");
        ws.folder("a3", 1);

        let report = run(&ws.options, &NoProgress, &CancellationToken::new()).expect("run");
        let failed: Vec<&str> = report.failed().map(|o| o.job.name()).collect();
        assert_eq!(failed, vec!["a2"]);
        assert_eq!(report.written().count(), 2);
    }

    #[test]
    fn missing_input_is_fatal_and_creates_nothing() {
        let ws = Workspace::new();
        let options = ConversionOptions {
            input_folder: ws.root.path().join("missing"),
            ..ws.options.clone()
        };

        let err = run(&options, &NoProgress, &CancellationToken::new()).expect_err("missing input");
        assert!(matches!(err, ZipperError::InputNotFound { .. }));
        assert!(!options.output_folder.exists());
    }

    #[test]
    fn no_digit_folders_is_fatal() {
        let ws = Workspace::new();
        ws.folder("drafts", 1);

        let err = run(&ws.options, &NoProgress, &CancellationToken::new()).expect_err("no folders");
        assert!(matches!(err, ZipperError::NoFoldersFound { .. }));
        assert!(!ws.options.output_folder.exists());
    }

    #[test]
    fn invalid_options_are_rejected_first() {
        let ws = Workspace::new();
        let options = ConversionOptions {
            quality: 0,
            input_folder: ws.root.path().join("missing"),
            ..ws.options.clone()
        };

        let err = run(&options, &NoProgress, &CancellationToken::new()).expect_err("invalid");
        assert!(matches!(err, ZipperError::InvalidOptions(_)));
    }

    #[test]
    fn cancelled_run_reports_every_folder() {
        let ws = Workspace::new();
        ws.folder("3", 1);
        ws.folder("4", 1);
        let token = CancellationToken::new();
        token.cancel();

        let report = run(&ws.options, &NoProgress, &token).expect("run");
        assert_eq!(report.outcomes.len(), 2);
        assert!(report
            .outcomes
            .iter()
            .all(|o| matches!(o.error(), Some(ZipperError::Cancelled))));
        assert!(ws.output_files().is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn lossy_name_collision_fails_the_later_folder() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        use crate::testing::write_jpeg;

        let ws = Workspace::new();
        for raw in [&b"issue\xfe1"[..], &b"issue\xff1"[..]] {
            let dir = ws.options.input_folder.join(OsStr::from_bytes(raw));
            std::fs::create_dir_all(&dir).expect("folder");
            write_jpeg(&dir.join("p1.jpg"), 8, 8);
        }

        let report = run(&ws.options, &NoProgress, &CancellationToken::new()).expect("run");
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes[0].is_written());
        assert!(matches!(
            report.outcomes[1].error(),
            Some(ZipperError::DestinationCollision { .. })
        ));
        assert_eq!(ws.output_files(), vec!["issue\u{FFFD}1 - Output.pdf"]);
    }
}
