//! Suspiciousness scoring from coverage spectra
//!
//! Derives the four spectrum counts per element from the coverage matrix
//! and the failing-test partition, then applies a selectable formula.
//! Scoring is a pure function: identical inputs always produce identical
//! counts and scores.

use crate::matrix::{CoverageMatrix, Element};
use clap::ValueEnum;
use std::collections::BTreeSet;

/// Per-element spectrum counts.
///
/// For every element, ef + nf equals the failing-test total and ep + np
/// equals the passing-test total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpectrumCounts {
    /// Failing tests that cover the element
    pub ef: u32,
    /// Failing tests that do not cover the element
    pub nf: u32,
    /// Passing tests that cover the element
    pub ep: u32,
    /// Passing tests that do not cover the element
    pub np: u32,
}

/// Selectable suspiciousness formula.
///
/// Every formula is total over non-negative counts: a zero denominator
/// resolves to 0.0, never NaN or a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Formula {
    /// ef / sqrt((ef + nf) * (ef + ep))
    Ochiai,
    /// (ef / F) / (ef / F + ep / P)
    Tarantula,
    /// ef / (ef + nf + ep)
    Jaccard,
}

impl Formula {
    /// Score one spectrum.
    pub fn score(self, c: SpectrumCounts) -> f64 {
        let ef = f64::from(c.ef);
        let ep = f64::from(c.ep);
        match self {
            Formula::Ochiai => {
                let denominator = (f64::from(c.ef + c.nf) * f64::from(c.ef + c.ep)).sqrt();
                if denominator == 0.0 {
                    0.0
                } else {
                    ef / denominator
                }
            }
            Formula::Tarantula => {
                let failed = f64::from(c.ef + c.nf);
                let passed = f64::from(c.ep + c.np);
                if failed == 0.0 {
                    return 0.0;
                }
                let fail_ratio = ef / failed;
                let pass_ratio = if passed == 0.0 { 0.0 } else { ep / passed };
                let denominator = fail_ratio + pass_ratio;
                if denominator == 0.0 {
                    0.0
                } else {
                    fail_ratio / denominator
                }
            }
            Formula::Jaccard => {
                let denominator = f64::from(c.ef + c.nf + c.ep);
                if denominator == 0.0 {
                    0.0
                } else {
                    ef / denominator
                }
            }
        }
    }
}

/// One element with its spectrum counts and suspiciousness score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredElement {
    pub element: Element,
    pub counts: SpectrumCounts,
    pub score: f64,
}

/// Derive spectrum counts and scores for every element in the universe.
///
/// `failing` partitions the matrix's observed tests; any observed test not
/// in the set is passing. Elements covered by no test still get a score
/// (the formula's floor), in universe (file, line) order.
pub fn score_matrix(
    matrix: &CoverageMatrix,
    failing: &BTreeSet<String>,
    formula: Formula,
) -> Vec<ScoredElement> {
    let total_failing = matrix
        .tests()
        .iter()
        .filter(|test| failing.contains(*test))
        .count() as u32;
    let total_passing = matrix.tests().len() as u32 - total_failing;

    matrix
        .elements()
        .map(|element| {
            let mut ef = 0u32;
            let mut ep = 0u32;
            for test in matrix.tests() {
                if matrix.is_covered(element, test) {
                    if failing.contains(test) {
                        ef += 1;
                    } else {
                        ep += 1;
                    }
                }
            }
            let counts = SpectrumCounts {
                ef,
                nf: total_failing - ef,
                ep,
                np: total_passing - ep,
            };
            ScoredElement {
                element: element.clone(),
                counts,
                score: formula.score(counts),
            }
        })
        .collect()
}
