// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PdfZipper Batch: everything above a single folder: discovering issue
// folders, fanning them out over a bounded worker pool, cancellation and
// progress events. The per-folder work itself lives in `pdfzipper-document`.

pub mod cancel;
pub mod discovery;
pub mod driver;
pub mod progress;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use cancel::CancellationToken;
pub use discovery::{Discovered, discover};
pub use driver::run;
pub use progress::{NoProgress, ProgressSink};
pub use scheduler::Scheduler;
