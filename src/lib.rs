pub mod cli;
pub mod core;

pub use crate::core::config;

use crate::cli::OutputFormat;
use crate::cli::{dashboard as render, options, ui};
use crate::core::dashboard::{self, Filters};
use crate::core::session::{Category, FilterOptions, Session};
use crate::core::{DashboardError, config::AppConfig};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Dashboard,
    Sales,
    Training,
    Financial,
    Options,
}

/// Input paths and filter selection given on the command line.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub sales: Option<PathBuf>,
    pub financial: Option<PathBuf>,
    pub evaluation: Option<PathBuf>,
    pub filters: Filters,
    pub format: OutputFormat,
}

impl RunArgs {
    fn path(&self, category: Category) -> Option<&PathBuf> {
        match category {
            Category::Sales => self.sales.as_ref(),
            Category::Financial => self.financial.as_ref(),
            Category::Evaluation => self.evaluation.as_ref(),
        }
    }
}

pub fn run_command(command: AppCommand, config_path: Option<&str>, args: &RunArgs) -> Result<()> {
    let output = render_command(command, config_path, args)?;
    println!("{output}");
    Ok(())
}

/// Loads the inputs, computes the requested view and returns it rendered.
pub fn render_command(
    command: AppCommand,
    config_path: Option<&str>,
    args: &RunArgs,
) -> Result<String> {
    info!("kpidash starting...");

    let mut config = AppConfig::load_or_default(config_path)?;
    for category in Category::ALL {
        if let Some(path) = args.path(category) {
            config.inputs.get_mut(category).path = Some(path.clone());
        }
    }
    debug!("Loaded config: {config:#?}");

    let pb = ui::new_spinner("Loading input files...");
    let loaded = Session::load_inputs(&config.inputs, &|category| {
        pb.set_message(format!("Loaded {category}"))
    });
    pb.finish_and_clear();
    let session = loaded?;

    let data = match session.loaded() {
        Ok(data) => data,
        Err(DashboardError::MissingInputs(missing)) => {
            warn!(?missing, "Inputs missing, dashboard not rendered");
            return match args.format {
                OutputFormat::Table => Ok(render::render_upload_prompt(&missing)),
                OutputFormat::Json => Ok(serde_json::to_string_pretty(
                    &serde_json::json!({ "missing": missing }),
                )?),
            };
        }
        Err(e) => return Err(e.into()),
    };

    let filters = &args.filters;
    let generated_at = chrono::Local::now().naive_local();
    let json = args.format == OutputFormat::Json;

    let output = match command {
        AppCommand::Dashboard => {
            let view = dashboard::build_dashboard(&data, filters, &config, generated_at);
            if json {
                serde_json::to_string_pretty(&view)?
            } else {
                render::render_dashboard(&view)
            }
        }
        AppCommand::Sales => {
            let filtered = dashboard::apply_filters(&data, filters, &config);
            let panel = dashboard::sales_panel(&filtered.sales, &config);
            if json {
                serde_json::to_string_pretty(&panel)?
            } else {
                render::render_header(filters) + &render::render_sales(&panel)
            }
        }
        AppCommand::Training => {
            let filtered = dashboard::apply_filters(&data, filters, &config);
            let panel = dashboard::training_panel(
                &filtered.evaluation,
                data.evaluation,
                &filters.trainer,
                &config,
            );
            if json {
                serde_json::to_string_pretty(&panel)?
            } else {
                render::render_header(filters) + &render::render_training(&panel)
            }
        }
        AppCommand::Financial => {
            let filtered = dashboard::apply_filters(&data, filters, &config);
            let panel = dashboard::financial_panel(&filtered.financial, &config);
            if json {
                serde_json::to_string_pretty(&panel)?
            } else {
                render::render_header(filters) + &render::render_financial(&panel)
            }
        }
        AppCommand::Options => {
            let opts = FilterOptions::from_data(&data, &config.schema);
            if json {
                serde_json::to_string_pretty(&opts)?
            } else {
                options::render_options(&opts)
            }
        }
    };

    Ok(output)
}
