// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for remark-sync.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `remark_sync_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `outcome`: added, filtered, duplicate (merge); success, conflict, error (push, cycle)
//! - `mode`: first_sync, merged, remote_malformed
//! - `artifact`: remote file name

use metrics::{counter, histogram};
use std::time::Duration;

use crate::coordinator::CycleMode;
use crate::merge::MergeReport;

/// Record the per-record outcomes of one merge
pub fn record_merge(report: &MergeReport) {
    for (outcome, count) in [
        ("added", report.added),
        ("filtered", report.skipped),
        ("duplicate", report.duplicates),
    ] {
        counter!(
            "remark_sync_merge_records_total",
            "outcome" => outcome
        )
        .increment(count as u64);
    }
}

/// Record one artifact write
pub fn record_push(artifact: &str, outcome: &str) {
    counter!(
        "remark_sync_artifact_pushes_total",
        "artifact" => artifact.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a finished cycle
pub fn record_cycle(mode: CycleMode, duration: Duration) {
    counter!(
        "remark_sync_cycles_total",
        "outcome" => "success",
        "mode" => mode.as_label()
    )
    .increment(1);
    histogram!("remark_sync_cycle_seconds").record(duration.as_secs_f64());
}

/// Record an aborted cycle
pub fn record_cycle_failure(conflict: bool) {
    counter!(
        "remark_sync_cycles_total",
        "outcome" => if conflict { "conflict" } else { "error" }
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // No recorder installed: every call must be a silent no-op.
    #[test]
    fn test_record_without_recorder() {
        record_merge(&MergeReport { added: 1, skipped: 2, duplicates: 3 });
        record_push("bookmarks.json", "success");
        record_cycle(CycleMode::FirstSync, Duration::from_millis(5));
        record_cycle_failure(true);
    }
}
