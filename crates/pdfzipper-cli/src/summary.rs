// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-of-run summary printed to stdout.

use std::fmt::Write;

use pdfzipper_core::human_errors::humanize_error;
use pdfzipper_core::{AssemblyResult, RunReport};

/// Render `report` as plain text: one line per folder, then the totals.
///
/// Failures use the humanized message; the raw error is only in the log.
pub fn render(report: &RunReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let name = outcome.job.name();
        // Writing into a String cannot fail.
        let _ = match &outcome.result {
            Ok(AssemblyResult::Written(path)) => {
                writeln!(out, "  written  {name} -> {}", path.display())
            }
            Ok(AssemblyResult::SkippedExisting(_)) => {
                writeln!(out, "  skipped  {name} (PDF already exists)")
            }
            Ok(AssemblyResult::SkippedEmpty) => writeln!(out, "  skipped  {name} (no images)"),
            Err(err) => {
                let human = humanize_error(err);
                writeln!(
                    out,
                    "  FAILED   {name}: {} [{}]\n           {}",
                    human.message,
                    human.severity.label(),
                    human.suggestion
                )
            }
        };
    }
    let _ = writeln!(
        out,
        "{} written, {} skipped, {} failed",
        report.written().count(),
        report.skipped().count(),
        report.failed().count()
    );
    out
}
