//! Failing-test report parsing
//!
//! Two accepted shapes: CTest's failed-tests log, one `<index>:<test-name>`
//! per line, and JUnit XML suites where a case fails iff it carries at
//! least one `<failure>` child. Malformed lines/entries are skipped with a
//! warning; they never abort the rest of the report.

use anyhow::{Context, Result};
use clap::ValueEnum;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Failing-test source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestsFormat {
    /// Sniff the shape: `.xml` extension or a leading `<` means junit
    Auto,
    /// Line-oriented `<index>:<test-name>` failed-tests log
    Ctest,
    /// JUnit XML test report
    Junit,
}

/// Parse the set of failing test ids from `path`.
pub fn parse_failing_tests<P: AsRef<Path>>(
    path: P,
    format: TestsFormat,
) -> Result<BTreeSet<String>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read failing-tests source {}", path.display()))?;

    match resolve_format(path, &contents, format) {
        TestsFormat::Junit => Ok(parse_junit_xml(&contents)),
        _ => Ok(parse_ctest_log(&contents)),
    }
}

fn resolve_format(path: &Path, contents: &str, requested: TestsFormat) -> TestsFormat {
    match requested {
        TestsFormat::Auto => {
            let looks_like_xml = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
                || contents.trim_start().starts_with('<');
            if looks_like_xml {
                TestsFormat::Junit
            } else {
                TestsFormat::Ctest
            }
        }
        explicit => explicit,
    }
}

/// Parse a CTest-style failed-tests log.
///
/// Each non-blank line is `<index>:<test-name>`; the failing id is the
/// substring after the first colon.
pub fn parse_ctest_log(contents: &str) -> BTreeSet<String> {
    let mut failing = BTreeSet::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((_, name)) if !name.is_empty() => {
                failing.insert(name.to_string());
            }
            _ => {
                tracing::warn!(
                    "skipping malformed failed-test entry at line {}: {:?}",
                    idx + 1,
                    raw
                );
            }
        }
    }

    failing
}

/// Accumulated state for one `<testcase>` element
#[derive(Debug)]
struct CaseAccum {
    class_name: String,
    name: String,
    failed: bool,
}

/// Streaming scanner over a JUnit XML document
#[derive(Debug, Default)]
struct JunitScan {
    failing: BTreeSet<String>,
    current: Option<CaseAccum>,
}

impl JunitScan {
    fn handle_start(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"testcase" => {
                self.current = match case_identity(e) {
                    Some((class_name, name)) => Some(CaseAccum {
                        class_name,
                        name,
                        failed: false,
                    }),
                    None => {
                        tracing::warn!("skipping testcase without classname/name attributes");
                        None
                    }
                };
            }
            b"failure" => {
                if let Some(case) = self.current.as_mut() {
                    case.failed = true;
                }
            }
            _ => {}
        }
    }

    fn handle_empty(&mut self, e: &BytesStart<'_>) {
        // a self-closing <failure/> still marks the case as failing;
        // a self-closing <testcase/> has no failure children and passes
        if e.name().as_ref() == b"failure" {
            if let Some(case) = self.current.as_mut() {
                case.failed = true;
            }
        }
    }

    fn handle_end(&mut self, tag: &[u8]) {
        if tag == b"testcase" {
            if let Some(case) = self.current.take() {
                if case.failed {
                    self.failing
                        .insert(format!("{}.{}", case.class_name, case.name));
                }
            }
        }
    }
}

fn case_identity(e: &BytesStart<'_>) -> Option<(String, String)> {
    let mut class_name = None;
    let mut name = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"classname" => class_name = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            b"name" => name = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            _ => {}
        }
    }
    Some((class_name?, name?))
}

/// Parse a JUnit XML report into the set of failing `classname.name` ids.
///
/// A hard XML syntax error ends the scan with a warning but keeps every
/// case collected up to that point.
pub fn parse_junit_xml(contents: &str) -> BTreeSet<String> {
    let mut reader = Reader::from_str(contents);
    let mut scan = JunitScan::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => scan.handle_start(&e),
            Ok(Event::Empty(e)) => scan.handle_empty(&e),
            Ok(Event::End(e)) => scan.handle_end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    "malformed test report XML: {}; keeping {} failing case(s) parsed so far",
                    err,
                    scan.failing.len()
                );
                break;
            }
        }
    }

    scan.failing
}
