use std::{fs::File, io::BufWriter, process::ExitCode};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use streetmend::{GeometryFormat, GraphExport, InputFormat, load_network, run_pipeline};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    args::{Cli, RepairMode},
    settings::Settings,
};

mod args;
mod prompt;
mod settings;

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

fn decide_repair(cli: &Cli, configured: bool) -> Result<bool> {
    let ask = || {
        prompt::confirm_on_terminal(
            "Check for missing landmarks at crossing streets? This may take a while.",
        )
        .context("Failed to read answer from terminal")
    };

    match cli.repair {
        Some(RepairMode::Yes) => Ok(true),
        Some(RepairMode::No) => Ok(false),
        Some(RepairMode::Ask) => ask(),
        None if cli.config.is_some() => Ok(configured),
        None => ask(),
    }
}

fn run(cli: &Cli, format: InputFormat) -> Result<()> {
    let mut config = Settings::load(cli.config.as_deref())?.pipeline;
    format.apply_defaults(&mut config);
    if let Some((x, y)) = cli.translation() {
        config.translate_x = x;
        config.translate_y = y;
    }
    config.repair_crossings = decide_repair(cli, config.repair_crossings)?;

    let output = cli.output_path();
    info!("Converting {} to {}", cli.input.display(), output.display());

    let network = load_network(&cli.input, format, config.tolerance)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let outcome = run_pipeline(network, &config).context("Pipeline failed")?;

    GeometryFormat::from(cli.geometry_format)
        .write_file(&outcome.network, &output, cli.append)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let mut exports: Vec<GraphExport> = Vec::new();
    for export in cli.graph_formats.iter().map(|&format| GraphExport::from(format)) {
        if !exports.contains(&export) {
            exports.push(export);
        }
    }
    for export in exports {
        export
            .export_to(&outcome.graph, &output)
            .with_context(|| format!("Failed to export graph as {export:?}"))?;
    }

    if let Some(path) = &cli.report {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &outcome.report)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    info!("Written to {}", output.display());
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let Some(format) = InputFormat::from_path(&cli.input) else {
        error!("Unknown file extension in {}", cli.input.display());
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    };

    run(&cli, format)?;
    Ok(ExitCode::SUCCESS)
}
