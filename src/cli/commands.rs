//! Command implementations for the Stylometer CLI.

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::session::Session;

/// Execute a CLI command.
pub fn execute_command(args: StylometerArgs) -> Result<()> {
    match &args.command {
        Command::Analyze(analyze_args) => analyze(analyze_args, &args),
        Command::Inspect(inspect_args) => inspect(inspect_args, &args),
    }
}

/// Run the full analysis and write the report directory.
fn analyze(args: &AnalyzeArgs, cli_args: &StylometerArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let session = Session::open(&args.input)?;

    let mut pipeline = Pipeline::new(config)?;
    if args.no_projections {
        pipeline = pipeline.without_projections();
    }
    let report = pipeline.run_session(&session)?;

    let written = report.write_outputs(&args.output_dir, !args.no_plots)?;
    let files = written
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    info!("Session {} finished", session.id());

    output_result(
        "Analysis complete",
        &AnalysisSummary::from_report(&report, files),
        cli_args,
    )
}

/// Load the documents and report what was found.
fn inspect(args: &InspectArgs, cli_args: &StylometerArgs) -> Result<()> {
    let config = AnalysisConfig {
        label_policy: args.label_policy,
        ..AnalysisConfig::default()
    };
    let session = Session::open(&args.input)?;
    let corpus = session.load_corpus(&config)?;

    output_result(
        &format!("Inspected {}", args.input.display()),
        &InspectionResult {
            documents: corpus.documents().to_vec(),
            label_counts: corpus.label_counts(),
        },
        cli_args,
    )
}
