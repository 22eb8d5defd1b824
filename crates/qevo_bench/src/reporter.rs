//! Benchmark reporting
//!
//! Renders benchmark results as Markdown, JSON, CSV, or plain text.

use crate::suite::{BenchmarkResult, BenchmarkStatistics};
use std::fmt::Write;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Markdown table
    Markdown,
    /// JSON
    Json,
    /// CSV
    Csv,
    /// Plain text summary
    Text,
}

/// Benchmark reporter
pub struct Reporter;

impl Reporter {
    // ========================================================================
    // Format Converters
    // ========================================================================

    /// Generate report in specified format
    pub fn report(results: &[BenchmarkResult], format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => Self::to_markdown(results),
            ReportFormat::Json => Self::to_json(results),
            ReportFormat::Csv => Self::to_csv(results),
            ReportFormat::Text => Self::to_text(results),
        }
    }

    /// Convert results to Markdown table
    pub fn to_markdown(results: &[BenchmarkResult]) -> String {
        let mut output = String::new();

        writeln!(output, "# QEVO Benchmark Results\n").unwrap();

        let stats = BenchmarkStatistics::from_results(results);
        writeln!(output, "## Summary\n").unwrap();
        writeln!(output, "- **Benchmarks**: {}", stats.count).unwrap();
        writeln!(output, "- **Total Time**: {:.2}s", stats.total_time_ms / 1000.0).unwrap();
        writeln!(output, "- **Avg Time**: {:.1} ms", stats.avg_time_ms).unwrap();
        writeln!(
            output,
            "- **Avg Throughput**: {:.0} shots/s\n",
            stats.avg_shots_per_second
        )
        .unwrap();

        writeln!(output, "## Detailed Results\n").unwrap();
        writeln!(
            output,
            "| Name | Qubits | Ops | Depth | Shots | Time(ms) | Shots/s | Outcomes | Entropy |"
        )
        .unwrap();
        writeln!(
            output,
            "|------|--------|-----|-------|-------|----------|---------|----------|---------|"
        )
        .unwrap();

        for r in results {
            writeln!(
                output,
                "| {} | {} | {} | {} | {} | {:.1} | {:.0} | {} | {:.3} |",
                r.name,
                r.qubits,
                r.ops,
                r.depth,
                r.shots,
                r.time_ms,
                r.shots_per_second,
                r.distinct_outcomes,
                r.entropy_bits
            )
            .unwrap();
        }

        output
    }

    /// Convert results to JSON
    pub fn to_json(results: &[BenchmarkResult]) -> String {
        let stats = BenchmarkStatistics::from_results(results);

        let report = serde_json::json!({
            "statistics": stats,
            "results": results,
        });

        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Convert results to CSV
    pub fn to_csv(results: &[BenchmarkResult]) -> String {
        let mut output = String::new();

        writeln!(
            output,
            "name,qubits,ops,depth,shots,backend,time_ms,shots_per_second,distinct_outcomes,entropy_bits"
        )
        .unwrap();

        for r in results {
            writeln!(
                output,
                "{},{},{},{},{},{},{},{},{},{}",
                r.name,
                r.qubits,
                r.ops,
                r.depth,
                r.shots,
                r.backend,
                r.time_ms,
                r.shots_per_second,
                r.distinct_outcomes,
                r.entropy_bits
            )
            .unwrap();
        }

        output
    }

    /// Convert results to plain text summary
    pub fn to_text(results: &[BenchmarkResult]) -> String {
        let mut output = String::new();
        let stats = BenchmarkStatistics::from_results(results);

        writeln!(output, "QEVO Benchmark Results").unwrap();
        writeln!(output, "======================\n").unwrap();

        writeln!(output, "Summary:").unwrap();
        writeln!(output, "  Benchmarks run: {}", stats.count).unwrap();
        writeln!(output, "  Total time: {:.2}s", stats.total_time_ms / 1000.0).unwrap();
        writeln!(output, "  Average time: {:.1} ms", stats.avg_time_ms).unwrap();
        writeln!(
            output,
            "  Average throughput: {:.0} shots/s\n",
            stats.avg_shots_per_second
        )
        .unwrap();

        writeln!(output, "Individual Results:").unwrap();
        for r in results {
            writeln!(
                output,
                "  {} ({}Q, {} ops): {:.1} ms, {:.0} shots/s on {}",
                r.name, r.qubits, r.ops, r.time_ms, r.shots_per_second, r.backend
            )
            .unwrap();
        }

        output
    }

    // ========================================================================
    // Specialized Reports
    // ========================================================================

    /// Generate qubit scaling report
    pub fn qubit_scaling_report(results: &[BenchmarkResult]) -> String {
        let mut output = String::new();

        writeln!(output, "# Qubit Scaling Analysis\n").unwrap();
        writeln!(output, "| Qubits | Ops | Time(ms) | Shots/s |").unwrap();
        writeln!(output, "|--------|-----|----------|---------|").unwrap();

        for r in results {
            writeln!(
                output,
                "| {} | {} | {:.1} | {:.0} |",
                r.qubits, r.ops, r.time_ms, r.shots_per_second
            )
            .unwrap();
        }

        output
    }

    /// Generate depth scaling report
    pub fn depth_scaling_report(results: &[BenchmarkResult]) -> String {
        let mut output = String::new();

        writeln!(output, "# Depth Scaling Analysis\n").unwrap();
        writeln!(output, "| Depth | Ops | Time(ms) | Time/Op(ms) |").unwrap();
        writeln!(output, "|-------|-----|----------|-------------|").unwrap();

        for r in results {
            let per_op = if r.ops > 0 {
                r.time_ms / r.ops as f64
            } else {
                0.0
            };
            writeln!(
                output,
                "| {} | {} | {:.1} | {:.3} |",
                r.depth, r.ops, r.time_ms, per_op
            )
            .unwrap();
        }

        output
    }
}

// ============================================================================
// Tests
// ============================================================================
