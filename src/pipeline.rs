//! One-shot fault-localization pipeline
//!
//! Drives a single batch run: load the failing-test set and the per-test
//! coverage traces, build the coverage matrix, then score, rank, and write
//! the report. With zero failing tests the scorer and serializer are
//! skipped entirely and the run still succeeds.

use crate::gcov;
use crate::matrix::{CoverageMatrix, CoverageMatrixBuilder};
use crate::report::Report;
use crate::score::{score_matrix, Formula};
use crate::test_report::{parse_failing_tests, TestsFormat};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal input errors: without these inputs no matrix can be built
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failing-tests source not found: {0}")]
    MissingFailingTests(PathBuf),

    #[error("coverage base directory not found: {0}")]
    MissingCoverageDir(PathBuf),
}

/// Configuration for one localization run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the failing-tests source (CTest log or JUnit XML)
    pub failing_tests: PathBuf,
    /// Base directory with one coverage subdirectory per test id
    pub coverage_dir: PathBuf,
    /// Report destination path
    pub output: PathBuf,
    /// Suspiciousness formula to apply
    pub formula: Formula,
    /// Failing-tests source kind
    pub tests_format: TestsFormat,
}

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Zero failing tests: nothing to localize, no report written
    AllTestsPassed { observed_tests: usize },
    /// Ranked report written to `path`
    ReportWritten {
        path: PathBuf,
        elements: usize,
        failing: usize,
        passing: usize,
    },
}

/// Run the full pipeline once.
pub fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    if !config.failing_tests.exists() {
        return Err(PipelineError::MissingFailingTests(config.failing_tests.clone()).into());
    }
    if !config.coverage_dir.exists() {
        return Err(PipelineError::MissingCoverageDir(config.coverage_dir.clone()).into());
    }

    let failing = parse_failing_tests(&config.failing_tests, config.tests_format)?;
    tracing::debug!("{} failing test(s) reported", failing.len());

    let matrix = build_matrix(&config.coverage_dir, &failing)?;

    if failing.is_empty() {
        tracing::info!("all tests passed; suspiciousness was not calculated");
        return Ok(RunOutcome::AllTestsPassed {
            observed_tests: matrix.tests().len(),
        });
    }

    let scores = score_matrix(&matrix, &failing, config.formula);
    let elements = scores.len();
    let report = Report::from_scores(scores);
    report.write_to(&config.output)?;

    let failing_observed = matrix
        .tests()
        .iter()
        .filter(|test| failing.contains(*test))
        .count();
    Ok(RunOutcome::ReportWritten {
        path: config.output.clone(),
        elements,
        failing: failing_observed,
        passing: matrix.tests().len() - failing_observed,
    })
}

/// Scan the coverage base directory (one subdirectory per test id) and
/// merge every `.gcov` trace into the matrix. Failing tests without a
/// coverage directory are registered with empty covered sets so they
/// still count toward the failing total.
fn build_matrix(coverage_dir: &Path, failing: &BTreeSet<String>) -> Result<CoverageMatrix> {
    let mut builder = CoverageMatrixBuilder::new();

    for test_dir in sorted_entries(coverage_dir)? {
        if !test_dir.is_dir() {
            continue;
        }
        let Some(test_id) = test_dir.file_name().and_then(|name| name.to_str()) else {
            tracing::warn!(
                "skipping coverage directory with non-UTF8 name: {}",
                test_dir.display()
            );
            continue;
        };
        let test_id = test_id.to_string();
        builder.register_test(&test_id);

        let traces = match sorted_entries(&test_dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("skipping unreadable coverage directory {}: {err:#}", test_id);
                continue;
            }
        };

        let mut merged = 0usize;
        for trace_path in traces {
            if trace_path.extension().and_then(|ext| ext.to_str()) != Some("gcov") {
                continue;
            }
            match gcov::parse_trace_file(&trace_path) {
                Ok(trace) => {
                    builder.add_trace(&test_id, &trace);
                    merged += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        "skipping unreadable trace {}: {err:#}",
                        trace_path.display()
                    );
                }
            }
        }

        if merged == 0 {
            tracing::warn!("{}: no gcov traces found, covered set is empty", test_id);
        } else {
            tracing::debug!("{}: {} gcov trace(s) merged", test_id, merged);
        }
    }

    for test_id in failing {
        if !builder.has_test(test_id) {
            tracing::warn!(
                "failing test {} has no coverage directory, covered set is empty",
                test_id
            );
            builder.register_test(test_id);
        }
    }

    Ok(builder.build())
}

/// Directory entries sorted by name so the scan order is deterministic
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to list directory {}", dir.display()))?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(err) => {
                tracing::warn!("skipping unreadable directory entry in {}: {}", dir.display(), err);
                None
            }
        })
        .collect();
    entries.sort();
    Ok(entries)
}
