// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folder scheduler: run folder jobs sequentially or over a bounded pool.
//
// Workers pull job indices from a FIFO channel, so folders are started in
// submission order even when they finish out of order. Results come back
// tagged with their index and are reassembled in submission order. A failure
// or panic in one folder is recorded in its outcome and never touches the
// others.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use pdfzipper_core::error::{Result, ZipperError};
use pdfzipper_core::{AssemblyResult, ConversionOptions, FolderJob, FolderOutcome};
use pdfzipper_document::FolderAssembler;
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancellationToken;
use crate::progress::ProgressSink;

/// Runs folder jobs with injected options, progress sink and cancellation.
pub struct Scheduler<'a> {
    options: &'a ConversionOptions,
    sink: &'a dyn ProgressSink,
    cancel: CancellationToken,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        options: &'a ConversionOptions,
        sink: &'a dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            options,
            sink,
            cancel,
        }
    }

    /// Number of workers a parallel run over `jobs` folders would use.
    pub fn worker_count(&self, jobs: usize) -> usize {
        self.options
            .max_workers
            .unwrap_or_else(num_cpus::get)
            .min(jobs)
            .max(1)
    }

    /// Process every job and return one outcome per job, in input order.
    ///
    /// Jobs never dispatched because of cancellation get a
    /// [`ZipperError::Cancelled`] outcome.
    #[instrument(skip_all, fields(jobs = jobs.len(), parallel = self.options.parallel))]
    pub fn run(&self, jobs: Vec<FolderJob>) -> Vec<FolderOutcome> {
        let total = jobs.len();
        self.notify("run_started", || self.sink.run_started(total));

        let results = if self.options.parallel && total > 1 {
            let workers = self.worker_count(total);
            match self.run_parallel(&jobs, workers) {
                Ok(results) => results,
                Err(err) => {
                    warn!(error = %err, "Could not start worker pool, running sequentially");
                    self.run_sequential(&jobs)
                }
            }
        } else {
            self.run_sequential(&jobs)
        };

        let outcomes: Vec<FolderOutcome> = jobs
            .into_iter()
            .zip(results)
            .map(|(job, result)| {
                FolderOutcome::new(job, result.unwrap_or_else(|| Err(ZipperError::Cancelled)))
            })
            .collect();

        self.notify("run_finished", || self.sink.run_finished());
        info!(
            written = outcomes.iter().filter(|o| o.is_written()).count(),
            skipped = outcomes.iter().filter(|o| o.is_skipped()).count(),
            failed = outcomes.iter().filter(|o| o.error().is_some()).count(),
            "Run finished"
        );
        outcomes
    }

    // -- Execution strategies -------------------------------------------------

    fn run_sequential(&self, jobs: &[FolderJob]) -> Vec<Option<Result<AssemblyResult>>> {
        let completed = AtomicUsize::new(0);
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            if self.cancel.is_cancelled() {
                results.push(None);
                continue;
            }
            results.push(Some(self.run_folder(job, &completed, jobs.len())));
        }
        results
    }

    fn run_parallel(
        &self,
        jobs: &[FolderJob],
        workers: usize,
    ) -> std::result::Result<Vec<Option<Result<AssemblyResult>>>, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("pdfzipper-worker-{index}"))
            .build()?;
        debug!(workers, "Worker pool started");

        let (queue_tx, queue_rx) = crossbeam_channel::unbounded::<usize>();
        for index in 0..jobs.len() {
            // The receiver lives until the end of this function.
            let _ = queue_tx.send(index);
        }
        drop(queue_tx);

        let (done_tx, done_rx) = crossbeam_channel::unbounded();
        let completed = AtomicUsize::new(0);
        let completed = &completed;

        pool.scope(|scope| {
            for _ in 0..workers {
                let queue_rx = queue_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move |_| {
                    while !self.cancel.is_cancelled() {
                        let Ok(index) = queue_rx.recv() else {
                            break;
                        };
                        let result = self.run_folder(&jobs[index], completed, jobs.len());
                        if done_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(done_tx);

        let mut results: Vec<Option<Result<AssemblyResult>>> =
            std::iter::repeat_with(|| None).take(jobs.len()).collect();
        for (index, result) in done_rx.try_iter() {
            results[index] = Some(result);
        }
        Ok(results)
    }

    // -- One folder -----------------------------------------------------------

    fn run_folder(
        &self,
        job: &FolderJob,
        completed: &AtomicUsize,
        total: usize,
    ) -> Result<AssemblyResult> {
        // The sink's folder callbacks share the folder's panic boundary.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut reporter = self.sink.folder_started(job);
            FolderAssembler::new(self.options).assemble(job, reporter.as_mut())
        }))
        .unwrap_or_else(|payload| {
            Err(ZipperError::WorkerPanic {
                folder: job.name().to_string(),
                message: panic_message(payload.as_ref()),
            })
        });

        if let Err(err) = &result {
            warn!(folder = %job.name(), error = %err, "Folder failed");
        }

        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.notify("folder_finished", || {
            self.sink.folder_finished(job, done, total, &result)
        });
        result
    }

    /// Invoke a sink callback that sits outside the folder boundary. A panic
    /// is logged and swallowed.
    fn notify(&self, callback_name: &str, callback: impl FnOnce()) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
            warn!(
                callback = callback_name,
                message = %panic_message(payload.as_ref()),
                "Progress sink panicked"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".into()
    }
}
