//! CLI argument parsing for Culpar

use crate::score::Formula;
use crate::test_report::TestsFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "culpar")]
#[command(version)]
#[command(about = "Spectrum-based fault localization from per-test line coverage", long_about = None)]
pub struct Cli {
    /// Failing-tests source: CTest failed-tests log or JUnit XML report
    pub failing_tests: PathBuf,

    /// Coverage base directory with one subdirectory of .gcov traces per test
    pub coverage_dir: PathBuf,

    /// Destination path for the ranked JSON report
    #[arg(short, long, default_value = "sbfl-report.json")]
    pub output: PathBuf,

    /// Suspiciousness formula applied to the spectrum counts
    #[arg(long, value_enum, default_value = "ochiai")]
    pub formula: Formula,

    /// Failing-tests source kind (auto sniffs XML vs line log)
    #[arg(long = "tests-format", value_enum, default_value = "auto")]
    pub tests_format: TestsFormat,

    /// Enable verbose tracing output on stderr
    #[arg(long)]
    pub debug: bool,
}
