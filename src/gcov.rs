//! gcov line-coverage trace parsing
//!
//! Parses one textual `.gcov` trace (one test, one compiled source file)
//! into the set of source lines actually executed by that test, plus the
//! set of instrumented lines so never-executed code still enters the
//! element universe.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Classification of a gcov execution-count token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountToken {
    /// `-`: line carries no instrumentation (blank lines, declarations)
    NotInstrumented,
    /// `#####` (or `=====` for exceptional paths): instrumented, never executed
    NotExecuted,
    /// Line executed this many times
    Executed(u64),
}

/// Parsed coverage trace for one (test, source file) pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTrace {
    /// Source path from the `Source:` preamble row (trace file stem if absent)
    pub source_file: String,
    /// Lines with a positive execution count
    pub covered: BTreeSet<u32>,
    /// All instrumented lines, executed or not
    pub instrumented: BTreeSet<u32>,
}

fn parse_count_token(token: &str) -> Option<CountToken> {
    match token {
        "-" => Some(CountToken::NotInstrumented),
        "#####" | "=====" => Some(CountToken::NotExecuted),
        _ => {
            // gcov stars the count on lines with unexecuted blocks, e.g. "5*"
            let digits = token.strip_suffix('*').unwrap_or(token);
            digits.parse::<u64>().ok().map(CountToken::Executed)
        }
    }
}

/// Parse the textual contents of one gcov trace.
///
/// Each physical line has the shape `<count>:<line-no>:<source-text>`.
/// Line-number 0 rows are file metadata; the `Source:` row names the file
/// the elements belong to. Malformed records are skipped individually with
/// a warning and never abort the rest of the trace. `fallback_source` is
/// used when the trace has no `Source:` row.
pub fn parse_trace(contents: &str, fallback_source: &str) -> ParsedTrace {
    let mut trace = ParsedTrace {
        source_file: fallback_source.to_string(),
        ..ParsedTrace::default()
    };

    for (idx, raw) in contents.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }

        let mut fields = raw.splitn(3, ':');
        let (Some(count), Some(line_no)) = (fields.next(), fields.next()) else {
            tracing::warn!(
                "skipping malformed gcov record at line {}: {:?}",
                idx + 1,
                raw
            );
            continue;
        };
        let source_text = fields.next().unwrap_or("");

        let Ok(line_no) = line_no.trim().parse::<u32>() else {
            tracing::warn!(
                "skipping gcov record with unparseable line number at line {}: {:?}",
                idx + 1,
                raw
            );
            continue;
        };

        // Preamble rows (Source:, Graph:, Data:, Runs:) carry line number 0
        if line_no == 0 {
            if let Some(path) = source_text.strip_prefix("Source:") {
                trace.source_file = path.trim().to_string();
            }
            continue;
        }

        match parse_count_token(count.trim()) {
            Some(CountToken::NotInstrumented) => {}
            Some(CountToken::NotExecuted) => {
                trace.instrumented.insert(line_no);
            }
            Some(CountToken::Executed(count)) => {
                trace.instrumented.insert(line_no);
                if count > 0 {
                    trace.covered.insert(line_no);
                }
            }
            None => {
                tracing::warn!(
                    "skipping gcov record with unparseable count at line {}: {:?}",
                    idx + 1,
                    raw
                );
            }
        }
    }

    trace
}

/// Load and parse one gcov trace file.
///
/// The file stem (`calculator.cpp` for `calculator.cpp.gcov`) names the
/// elements when the trace lacks a `Source:` preamble.
pub fn parse_trace_file<P: AsRef<Path>>(path: P) -> Result<ParsedTrace> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read coverage trace {}", path.display()))?;
    let fallback = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unknown");
    Ok(parse_trace(&contents, fallback))
}
