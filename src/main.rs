use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use kpidash::cli::OutputFormat;
use kpidash::core::Filters;
use kpidash::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct ReportArgs {
    /// Sales KPI workbook or CSV export
    #[arg(long)]
    sales: Option<PathBuf>,

    /// Financial KPI workbook or CSV export
    #[arg(long)]
    financial: Option<PathBuf>,

    /// Training evaluation form workbook or CSV export
    #[arg(long)]
    evaluation: Option<PathBuf>,

    /// Only include rows for this year
    #[arg(long, default_value = "All")]
    year: String,

    /// Only include rows for this month, as written in the Month column
    #[arg(long, default_value = "All")]
    month: String,

    /// Only include evaluations for this trainer
    #[arg(long, default_value = "All")]
    trainer: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl From<ReportArgs> for kpidash::RunArgs {
    fn from(args: ReportArgs) -> kpidash::RunArgs {
        kpidash::RunArgs {
            sales: args.sales,
            financial: args.financial,
            evaluation: args.evaluation,
            filters: Filters {
                year: args.year,
                month: args.month,
                trainer: args.trainer,
            },
            format: args.format,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the full dashboard: sales, training and financial panels
    Dashboard(ReportArgs),
    /// Display sales KPIs, funnel and conversion trends
    Sales(ReportArgs),
    /// Display training evaluation results
    Training(ReportArgs),
    /// Display financial KPIs and monthly trends
    Financial(ReportArgs),
    /// List the values available for each filter
    Options(ReportArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    let result = match cli.command {
        Some(Commands::Setup) => kpidash::cli::setup::setup(),
        Some(Commands::Dashboard(args)) => {
            kpidash::run_command(kpidash::AppCommand::Dashboard, config_path, &args.into())
        }
        Some(Commands::Sales(args)) => {
            kpidash::run_command(kpidash::AppCommand::Sales, config_path, &args.into())
        }
        Some(Commands::Training(args)) => {
            kpidash::run_command(kpidash::AppCommand::Training, config_path, &args.into())
        }
        Some(Commands::Financial(args)) => {
            kpidash::run_command(kpidash::AppCommand::Financial, config_path, &args.into())
        }
        Some(Commands::Options(args)) => {
            kpidash::run_command(kpidash::AppCommand::Options, config_path, &args.into())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
