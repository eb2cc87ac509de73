//! Culpar - Spectrum-based fault localization for compiled test suites
//!
//! This library turns per-test gcov line-coverage traces plus a failing-test
//! report into a ranked list of suspicious source lines: parse each trace,
//! merge them into an element-by-test coverage matrix, derive the four
//! spectrum counts per element, and score them with a selectable
//! suspiciousness formula.

pub mod cli;
pub mod gcov;
pub mod matrix;
pub mod pipeline;
pub mod report;
pub mod score;
pub mod test_report;
