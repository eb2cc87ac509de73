use anyhow::Result;
use clap::Parser;
use culpar::{
    cli::Cli,
    pipeline::{self, PipelineConfig, RunOutcome},
};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; record-level warnings stay visible by default
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = PipelineConfig {
        failing_tests: args.failing_tests,
        coverage_dir: args.coverage_dir,
        output: args.output,
        formula: args.formula,
        tests_format: args.tests_format,
    };

    match pipeline::run(&config)? {
        RunOutcome::AllTestsPassed { observed_tests } => {
            println!(
                "all {} observed test(s) passed; no suspiciousness report generated",
                observed_tests
            );
        }
        RunOutcome::ReportWritten {
            path,
            elements,
            failing,
            passing,
        } => {
            println!(
                "ranked {} element(s) from {} failing / {} passing test(s) -> {}",
                elements,
                failing,
                passing,
                path.display()
            );
        }
    }

    Ok(())
}
