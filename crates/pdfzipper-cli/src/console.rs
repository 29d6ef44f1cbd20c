// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal progress: one overall folder bar plus one bar per folder in flight.

use std::io::{self, Write};
use std::path::Path;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pdfzipper_batch::ProgressSink;
use pdfzipper_core::error::Result;
use pdfzipper_core::{AssemblyResult, FolderJob};
use pdfzipper_document::PageProgress;

/// `indicatif` rendering of scheduler events.
///
/// The bars lock internally, so folder callbacks from several workers are
/// fine without extra synchronisation.
pub struct ConsoleProgress {
    multi: MultiProgress,
    folders: ProgressBar,
}

impl ConsoleProgress {
    /// Draw into `multi`, which the log writer shares.
    pub fn new(multi: MultiProgress) -> Self {
        let folders = multi.add(ProgressBar::new(0));
        folders.set_style(style(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} folders {msg}",
        ));
        Self { multi, folders }
    }
}

impl ProgressSink for ConsoleProgress {
    fn run_started(&self, total: usize) {
        self.folders.set_length(total as u64);
    }

    fn folder_started(&self, job: &FolderJob) -> Box<dyn PageProgress + Send> {
        let bar = self
            .multi
            .add(ProgressBar::new(job.images().len() as u64));
        bar.set_style(style("  {prefix:>16} [{bar:30.green/white}] {msg}"));
        bar.set_prefix(job.name().to_string());
        Box::new(FolderBar { bar })
    }

    fn folder_finished(
        &self,
        job: &FolderJob,
        completed: usize,
        total: usize,
        _result: &Result<AssemblyResult>,
    ) {
        self.folders.set_position(completed as u64);
        self.folders
            .set_message(format!("{} {}/{}", job.name(), completed, total));
    }

    fn run_finished(&self) {
        self.folders.finish_with_message("done");
    }
}

/// Page bar for one folder, cleared when the folder is done.
struct FolderBar {
    bar: ProgressBar,
}

impl PageProgress for FolderBar {
    fn page_done(&mut self, image: &Path, done: usize, total: usize) {
        let name = image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_position(done as u64);
        self.bar.set_message(format!("{name} {done}/{total}"));
    }
}

impl Drop for FolderBar {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Stderr writer for log lines that hides the bars while it writes.
pub struct BarSafeStderr {
    multi: MultiProgress,
}

impl BarSafeStderr {
    pub fn new(multi: MultiProgress) -> Self {
        Self { multi }
    }
}

impl Write for BarSafeStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.multi.suspend(|| io::stderr().write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.multi.suspend(|| io::stderr().flush())
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
