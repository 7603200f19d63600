use crate::commands::{run_generate, run_predict, GenerateArgs, PredictArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fleet_readiness::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Readiness",
    about = "Simulate nightly fleet readiness, rank vehicles, and serve probability-of-use predictions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Simulate nights of fleet readiness records and write them as CSV
    Generate(GenerateArgs),
    /// Append predicted probability of use to a readiness CSV
    Predict(PredictArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Generate(args) => run_generate(args),
        Command::Predict(args) => run_predict(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["fleet-readiness-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_generate_overrides() {
        let cli = Cli::try_parse_from([
            "fleet-readiness-api",
            "generate",
            "--output",
            "fleet.csv",
            "--start-date",
            "2025-09-01",
            "--nights",
            "7",
            "--fleet-size",
            "12",
            "--seed",
            "42",
            "--parallel",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Generate(args)) => {
                assert_eq!(args.output, Some(PathBuf::from("fleet.csv")));
                assert_eq!(
                    args.start_date,
                    chrono::NaiveDate::from_ymd_opt(2025, 9, 1)
                );
                assert_eq!(args.nights, Some(7));
                assert_eq!(args.fleet_size, Some(12));
                assert_eq!(args.seed, Some(42));
                assert!(args.parallel);
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn predict_requires_input() {
        assert!(Cli::try_parse_from(["fleet-readiness-api", "predict"]).is_err());

        let cli = Cli::try_parse_from(["fleet-readiness-api", "predict", "--input", "in.csv"])
            .expect("parses");
        match cli.command {
            Some(Command::Predict(args)) => {
                assert_eq!(args.input, PathBuf::from("in.csv"));
                assert_eq!(args.output, PathBuf::from("predicted_metro_data.csv"));
            }
            other => panic!("expected predict, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_start_date() {
        assert!(Cli::try_parse_from([
            "fleet-readiness-api",
            "generate",
            "--start-date",
            "01/09/2025",
        ])
        .is_err());
    }
}
