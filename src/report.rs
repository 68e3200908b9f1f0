//! # Subject Records
//!
//! One record per (adapter, scenario) pairing: the reduced timing statistic
//! with its unit and denominator made explicit, plus everything a consumer
//! needs to avoid misreading it (iteration counts, the actually measured
//! operation total, the budget-overrun flag, and the failure reason when
//! the subject was excluded). Records serialize to JSON; the text table
//! rendering here is a convenience for the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::stats::{self, IterationStat};

/// Reported outcome for one subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub adapter: String,
    pub scenario: String,

    /// Mean wall-clock nanoseconds per logical operation. `None` when the
    /// subject failed or no operation was measured; never a fabricated
    /// value.
    pub mean_ns_per_op: Option<f64>,

    /// Measurement iterations recorded
    pub iterations: u32,

    /// Operations requested per iteration
    pub operations_per_invocation: u64,

    /// Operations actually completed across all measurement iterations
    pub operations_recorded: u64,

    /// Set when any measurement iteration was stopped at the wall-clock
    /// budget; the partial counts are inside `operations_recorded`
    pub timed_out: bool,

    /// Failure reason when the subject is excluded from comparison
    pub failure: Option<String>,

    pub completed_at: DateTime<Utc>,
}

impl SubjectRecord {
    /// Build a record from recorded measurement iterations
    pub fn from_stats(
        adapter: impl Into<String>,
        scenario: impl Into<String>,
        operations_per_invocation: u64,
        recorded: &[IterationStat],
    ) -> Self {
        Self {
            adapter: adapter.into(),
            scenario: scenario.into(),
            mean_ns_per_op: stats::mean_ns_per_op(recorded),
            iterations: recorded.len() as u32,
            operations_per_invocation,
            operations_recorded: stats::total_ops(recorded),
            timed_out: recorded.iter().any(|s| s.timed_out),
            failure: None,
            completed_at: Utc::now(),
        }
    }

    /// Build a failed record carrying the reason
    pub fn failed(
        adapter: impl Into<String>,
        scenario: impl Into<String>,
        operations_per_invocation: u64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            adapter: adapter.into(),
            scenario: scenario.into(),
            mean_ns_per_op: None,
            iterations: 0,
            operations_per_invocation,
            operations_recorded: 0,
            timed_out: false,
            failure: Some(reason.into()),
            completed_at: Utc::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// "adapter/scenario" label used in logs and errors
    pub fn subject_label(&self) -> String {
        format!("{}/{}", self.adapter, self.scenario)
    }

    fn status(&self) -> String {
        match (&self.failure, self.timed_out) {
            (Some(reason), _) => format!("failed: {reason}"),
            (None, true) => "timed-out".to_string(),
            (None, false) => "ok".to_string(),
        }
    }
}

/// Render records as an aligned text table
pub fn render_table(records: &[SubjectRecord]) -> String {
    let header = [
        "ADAPTER",
        "SCENARIO",
        "MEAN (ns/op)",
        "ITERS",
        "OPS/ITER",
        "STATUS",
    ];

    let rows: Vec<[String; 6]> = records
        .iter()
        .map(|r| {
            [
                r.adapter.clone(),
                r.scenario.clone(),
                r.mean_ns_per_op
                    .map(|m| format!("{m:.1}"))
                    .unwrap_or_else(|| "-".to_string()),
                r.iterations.to_string(),
                r.operations_per_invocation.to_string(),
                r.status(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let render_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<width$}", width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header_cells: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    out.push_str(&render_row(&header_cells));
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}
