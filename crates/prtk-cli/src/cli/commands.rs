use super::CliError;
use super::helpers::{default_reference_dir, render_run_summary, resolve_project_paths};
use anyhow::Context;
use prtk_core::domain::{TableError, load_project_description};
use prtk_core::modules::Channel;
use prtk_core::pipelines::{MaterialPipeline, PipelineExecutor};
use prtk_core::tables::ParticleDomain;
use std::io::Write;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct RunArgs {
    /// Project description (JSON) produced by the layer and material readers
    #[arg(long)]
    project: PathBuf,

    /// Table directory; overrides the project's outputDir
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Target grid size; overrides the project's gridPoints
    #[arg(long)]
    grid_points: Option<usize>,

    /// Reference data root; defaults to prtk_files next to the executable
    #[arg(long)]
    reference_dir: Option<PathBuf>,

    /// Directory of <material>.stp proton stopping tables
    #[arg(long)]
    proton_dir: Option<PathBuf>,
}

pub(super) fn run_tables_command(args: RunArgs) -> Result<i32, CliError> {
    let mut description = load_project_description(&args.project).map_err(|error| {
        CliError::Compute(TableError::input_validation(
            "INPUT.PROJECT",
            error.to_string(),
        ))
    })?;
    resolve_project_paths(&mut description, &args.project);

    if let Some(output_dir) = args.output_dir {
        description.output_dir = output_dir;
    }
    if let Some(grid_points) = args.grid_points {
        description.grid_points = grid_points;
    }
    if args.reference_dir.is_some() {
        description.reference_dir = args.reference_dir;
    } else if description.reference_dir.is_none() {
        description.reference_dir = default_reference_dir();
    }
    if args.proton_dir.is_some() {
        description.proton_dir = args.proton_dir;
    }

    tracing::info!(
        project = %args.project.display(),
        output_dir = %description.output_dir.display(),
        grid_points = description.grid_points,
        "starting table run"
    );
    let pipeline = MaterialPipeline::from_project(&description).map_err(CliError::Compute)?;
    let summary = pipeline.execute(&description).map_err(CliError::Compute)?;
    print!("{}", render_run_summary(&summary));

    if summary.succeeded() { Ok(0) } else { Ok(1) }
}

pub(super) fn run_channels_command() -> Result<i32, CliError> {
    let mut stdout = std::io::stdout().lock();
    for channel in Channel::ALL {
        writeln!(
            stdout,
            "{}\t{}\t{}\t{}",
            channel.stem(),
            channel.key(),
            channel
                .domain()
                .map_or("external", ParticleDomain::directory),
            channel.name()
        )
        .context("failed to write channel list")?;
    }
    Ok(0)
}
