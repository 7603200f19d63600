use crate::infra::{default_start_date, simulate, SimulationOverrides};
use chrono::NaiveDate;
use clap::Args;
use fleet_readiness::config::{AppConfig, SimulationConfig};
use fleet_readiness::error::AppError;
use fleet_readiness::readiness::export::{write_records, write_records_to_path};
use fleet_readiness::readiness::{PredictionService, ReadinessRulePredictor, SimulationSummary};
use fleet_readiness::telemetry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct GenerateArgs {
    /// Write the dataset here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// First simulated night (YYYY-MM-DD). Defaults to `nights` days ago.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Number of consecutive nights (overrides FLEET_NIGHTS)
    #[arg(long)]
    pub(crate) nights: Option<u32>,
    /// Number of vehicles (overrides FLEET_SIZE)
    #[arg(long)]
    pub(crate) fleet_size: Option<usize>,
    /// Seed for a reproducible run (overrides FLEET_SEED)
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Simulate nights on the rayon pool
    #[arg(long)]
    pub(crate) parallel: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Readiness CSV to score
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination for the augmented CSV
    #[arg(long, default_value = "predicted_metro_data.csv")]
    pub(crate) output: PathBuf,
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let output = args.output.clone();
    let summary = generate_dataset(args, &config.simulation)?;
    if let Some(path) = output {
        println!(
            "Wrote {} records over {} nights to {} (seed {})",
            summary.records,
            summary.nights,
            path.display(),
            summary.seed
        );
        println!(
            "- enter_service {} | standby {} | hold_in_ibl {} | unscheduled withdrawals {}",
            summary.enter_service,
            summary.standby,
            summary.hold_in_ibl,
            summary.unscheduled_withdrawals
        );
    }
    Ok(())
}

pub(crate) fn generate_dataset(
    args: GenerateArgs,
    base: &SimulationConfig,
) -> Result<SimulationSummary, AppError> {
    let GenerateArgs {
        output,
        start_date,
        nights,
        fleet_size,
        seed,
        parallel,
    } = args;

    let config = SimulationOverrides {
        nights,
        fleet_size,
        seed,
    }
    .apply(base);
    config.validate()?;
    let start_date = match start_date {
        Some(date) => date,
        None => default_start_date(config.nights)?,
    };

    let (summary, records) = simulate(config, start_date, parallel)?;
    let written = match &output {
        Some(path) => write_records_to_path(path, &records)?,
        None => write_records(std::io::stdout().lock(), &records)?,
    };

    info!(
        rows = written,
        seed = summary.seed,
        %start_date,
        parallel,
        "readiness dataset generated"
    );
    Ok(summary)
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let rows = predict_file(&args.input, &args.output)?;
    println!(
        "Wrote {} predictions to {}",
        rows,
        args.output.display()
    );
    Ok(())
}

/// Score `input` with the baseline predictor and write the augmented CSV.
pub(crate) fn predict_file(input: &Path, output: &Path) -> Result<usize, AppError> {
    let upload = std::fs::read(input)?;
    let service = PredictionService::new(Arc::new(ReadinessRulePredictor));
    let predicted = service.predict_csv(&upload)?;
    std::fs::write(output, &predicted)?;

    let rows = predicted
        .split(|byte| *byte == b'\n')
        .filter(|line| !line.is_empty())
        .count()
        .saturating_sub(1);
    info!(input = %input.display(), output = %output.display(), rows, "batch prediction written");
    Ok(rows)
}
