//! # Iteration Statistics
//!
//! Per-iteration timing records and their reduction into the reported
//! per-operation statistic. The denominator is always the logical operation
//! count, never the batch, and a partial iteration contributes its real
//! count rather than a fabricated full one.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Elapsed time and completed operation count for one measurement
/// iteration. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationStat {
    pub elapsed: Duration,
    pub ops: u64,
    /// Whether this iteration was stopped at the wall-clock budget
    pub timed_out: bool,
}

/// Mean elapsed nanoseconds per logical operation across iterations that
/// completed at least one operation. `None` when nothing was measured; a
/// zero-operation iteration never fabricates a sample.
pub fn mean_ns_per_op(stats: &[IterationStat]) -> Option<f64> {
    let mut sum = 0.0f64;
    let mut samples = 0u32;
    for stat in stats {
        if stat.ops > 0 {
            sum += stat.elapsed.as_nanos() as f64 / stat.ops as f64;
            samples += 1;
        }
    }
    if samples == 0 {
        None
    } else {
        Some(sum / f64::from(samples))
    }
}

/// Total operations completed across all iterations
pub fn total_ops(stats: &[IterationStat]) -> u64 {
    stats.iter().map(|s| s.ops).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(nanos: u64, ops: u64) -> IterationStat {
        IterationStat {
            elapsed: Duration::from_nanos(nanos),
            ops,
            timed_out: false,
        }
    }

    #[test]
    fn test_empty_stats_reduce_to_none() {
        assert_eq!(mean_ns_per_op(&[]), None);
        assert_eq!(total_ops(&[]), 0);
    }

    #[test]
    fn test_zero_op_iterations_never_fabricate_a_mean() {
        let stats = vec![
            IterationStat {
                elapsed: Duration::from_millis(5),
                ops: 0,
                timed_out: true,
            };
            3
        ];
        assert_eq!(mean_ns_per_op(&stats), None);
        assert_eq!(total_ops(&stats), 0);
    }

    #[test]
    fn test_mean_is_per_operation_not_per_batch() {
        // 1000ns over 10 ops and 3000ns over 10 ops: per-op means 100 and
        // 300, so the reduced mean is 200
        let stats = vec![stat(1000, 10), stat(3000, 10)];
        assert_eq!(mean_ns_per_op(&stats), Some(200.0));
        assert_eq!(total_ops(&stats), 20);
    }

    #[test]
    fn test_partial_iterations_contribute_their_real_count() {
        let stats = vec![stat(1000, 10), stat(500, 0), stat(900, 3)];
        let mean = mean_ns_per_op(&stats).unwrap();
        assert!((mean - 200.0).abs() < f64::EPSILON, "mean was {mean}");
        assert_eq!(total_ops(&stats), 13);
    }
}
