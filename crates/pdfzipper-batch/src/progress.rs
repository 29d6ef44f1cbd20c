// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress contract between the scheduler and whatever renders it.
//
// Events are discrete "i of n" ticks. Folder-level callbacks may arrive from
// several worker threads at once, so sinks must be `Send + Sync`; each folder
// gets its own page reporter which is only ever used by one thread.

use pdfzipper_core::error::Result;
use pdfzipper_core::{AssemblyResult, FolderJob};
use pdfzipper_document::PageProgress;

/// Receives run, folder and page progress.
pub trait ProgressSink: Send + Sync {
    /// Called once before any folder is dispatched.
    fn run_started(&self, _total: usize) {}

    /// A worker picked up `job`. The returned reporter receives that folder's
    /// page ticks and is dropped when the folder finishes.
    fn folder_started(&self, job: &FolderJob) -> Box<dyn PageProgress + Send>;

    /// `job` finished; `completed` of `total` folders are now done.
    fn folder_finished(
        &self,
        _job: &FolderJob,
        _completed: usize,
        _total: usize,
        _result: &Result<AssemblyResult>,
    ) {
    }

    /// Called once after the last outcome is collected.
    fn run_finished(&self) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn folder_started(&self, _job: &FolderJob) -> Box<dyn PageProgress + Send> {
        Box::new(())
    }
}
