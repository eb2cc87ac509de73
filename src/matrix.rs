//! Element-by-test coverage matrix
//!
//! Merges per-file coverage traces into one covered set per test and a
//! global universe of instrumented elements, so lines covered by nobody
//! can still be scored instead of being silently dropped.

use crate::gcov::ParsedTrace;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Unit of localization: one instrumented source line.
///
/// Derived ordering is (file, line), which doubles as the deterministic
/// ranking tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Element {
    /// Source file path as named by the coverage trace
    pub file: String,
    /// 1-based source line number
    pub line: u32,
}

impl Element {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// Read-only element-by-test coverage relation.
///
/// Absence of a (element, test) pair means "not executed by that test".
#[derive(Debug, Clone)]
pub struct CoverageMatrix {
    universe: BTreeSet<Element>,
    tests: Vec<String>,
    covered: BTreeMap<String, HashSet<Element>>,
}

impl CoverageMatrix {
    /// Whether `test` executed `element`
    pub fn is_covered(&self, element: &Element, test: &str) -> bool {
        self.covered
            .get(test)
            .is_some_and(|set| set.contains(element))
    }

    /// The covered set for one test (None for unknown test ids)
    pub fn covered_set(&self, test: &str) -> Option<&HashSet<Element>> {
        self.covered.get(test)
    }

    /// All known elements in (file, line) order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.universe.iter()
    }

    /// Number of elements in the universe
    pub fn element_count(&self) -> usize {
        self.universe.len()
    }

    /// All observed test ids, sorted
    pub fn tests(&self) -> &[String] {
        &self.tests
    }
}

/// Accumulates per-file traces into a [`CoverageMatrix`].
///
/// Each test's covered set is the union (logical OR) of all its per-file
/// traces: a line reached through two separately compiled translation
/// units is covered once.
#[derive(Debug, Default)]
pub struct CoverageMatrixBuilder {
    universe: BTreeSet<Element>,
    covered: BTreeMap<String, HashSet<Element>>,
}

impl CoverageMatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test id with an (initially) empty covered set.
    ///
    /// A test that never receives a trace stays registered, so it still
    /// counts toward the passing/failing totals.
    pub fn register_test(&mut self, test_id: &str) {
        self.covered.entry(test_id.to_string()).or_default();
    }

    /// Whether `test_id` has been registered
    pub fn has_test(&self, test_id: &str) -> bool {
        self.covered.contains_key(test_id)
    }

    /// Union one per-file trace into the test's covered set and register
    /// every instrumented line into the element universe.
    pub fn add_trace(&mut self, test_id: &str, trace: &ParsedTrace) {
        for line in &trace.instrumented {
            self.universe
                .insert(Element::new(trace.source_file.clone(), *line));
        }

        let set = self.covered.entry(test_id.to_string()).or_default();
        for line in &trace.covered {
            set.insert(Element::new(trace.source_file.clone(), *line));
        }
    }

    pub fn build(self) -> CoverageMatrix {
        // BTreeMap keys are already sorted, so the test list is deterministic
        let tests = self.covered.keys().cloned().collect();
        CoverageMatrix {
            universe: self.universe,
            tests,
            covered: self.covered,
        }
    }
}
