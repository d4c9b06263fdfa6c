use std::fs;
use std::path::Path;
use tracing::info;

mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const SALES_CSV: &str = "\
Year,Month,Dials,Calls,DM  Conducted,DW Conducted,Proposals Sent,Proposals Sold,Sales Value,Dials to calls %,Calls to DM %
2024,January,60,40,20,6,5,2,12500,0.5,0.5
2024,February,40,20,10,4,3,1,oops,0.25,0.5
";

    pub const FINANCIAL_CSV: &str = "\
Year,Month,Cashflow_Coverage_Months,Total_Sales_Value,Cost_of_Goods_Sold,Operating_Cost,Total_Cost,Net_Profit_Loss,Overdue_Invoices_Count,Overdue_Invoices_Value
2024,January,3,25000,9000,6000,15000,10000,2,4000
2024,February,4,18000,8000,5000,13000,5000,1,
";

    pub const EVALUATION_CSV: &str = "\
Trainer Name اسم المدرب,How would you rate the content? تقييم المحتوى التدريبي,How would you rate the exercises? تقييم التمارين التدريبية,How would you rate the facilitator? تقييم المدرب,how did this session compare with your expectations? كيف كانت هذه الجلسة مقارنة بتوقعاتك؟,Training Date تاريخ الدورة التدريبية
Sara,5,4,5,4,2024-03-02
Ahmed,3,3,4,2,2024-01-15
Sara,4,5,5,5,2024-02-10
Ahmed,2,n/a,3,1,not recorded
";

    pub fn write_inputs(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        let sales = dir.join("sales.csv");
        let financial = dir.join("financial.csv");
        let evaluation = dir.join("evaluation.csv");
        fs::write(&sales, SALES_CSV).expect("Failed to write sales file");
        fs::write(&financial, FINANCIAL_CSV).expect("Failed to write financial file");
        fs::write(&evaluation, EVALUATION_CSV).expect("Failed to write evaluation file");
        (sales, financial, evaluation)
    }

    pub fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("config.yaml");
        fs::write(&path, body).expect("Failed to write config file");
        path
    }
}

fn args_with_inputs(dir: &Path, format: kpidash::cli::OutputFormat) -> kpidash::RunArgs {
    let (sales, financial, evaluation) = test_utils::write_inputs(dir);
    kpidash::RunArgs {
        sales: Some(sales),
        financial: Some(financial),
        evaluation: Some(evaluation),
        format,
        ..kpidash::RunArgs::default()
    }
}

#[test_log::test]
fn test_full_dashboard_from_cli_paths() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), "{}");
    let args = args_with_inputs(temp_dir.path(), kpidash::cli::OutputFormat::Table);

    let result = kpidash::render_command(
        kpidash::AppCommand::Dashboard,
        Some(config_path.to_str().unwrap()),
        &args,
    );
    assert!(result.is_ok(), "Dashboard failed with: {:?}", result.err());

    let output = console::strip_ansi_codes(&result.unwrap()).to_string();
    info!("{output}");
    assert!(output.contains("Management KPIs Dashboard"));
    assert!(output.contains("TOTAL DIALS"));
    assert!(output.contains("Prop Sold"));
    assert!(output.contains("Trainer Performance Comparison".to_uppercase().as_str()));
    // 25000 + 18000 total sales across both months.
    assert!(output.contains("43K"));
    assert!(!output.contains("Trend unavailable"));
}

#[test_log::test]
fn test_dashboard_json_from_config_inputs() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let (sales, financial, evaluation) = test_utils::write_inputs(temp_dir.path());
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &format!(
            r#"
inputs:
  sales:
    path: "{}"
  financial:
    path: "{}"
  evaluation:
    path: "{}"
thresholds:
  low_expectation_max: 2
"#,
            sales.display(),
            financial.display(),
            evaluation.display()
        ),
    );
    let args = kpidash::RunArgs {
        format: kpidash::cli::OutputFormat::Json,
        filters: kpidash::core::Filters {
            month: "January".to_string(),
            ..kpidash::core::Filters::default()
        },
        ..kpidash::RunArgs::default()
    };

    let output = kpidash::render_command(
        kpidash::AppCommand::Dashboard,
        Some(config_path.to_str().unwrap()),
        &args,
    )
    .expect("Dashboard failed");
    let view: serde_json::Value = serde_json::from_str(&output).expect("Output is not JSON");

    assert_eq!(view["filters"]["month"], "January");
    assert_eq!(view["sales"]["funnel"][0]["label"], "Dials");
    assert_eq!(view["sales"]["funnel"][0]["value"], 60.0);
    assert_eq!(view["financial"]["kpis"][1]["display"], "25K");
    // Ratings 4, 2, 5, 1 with a threshold of 2.
    assert_eq!(view["training"]["expectation"]["low"], 2);
    assert_eq!(view["training"]["expectation"]["good"], 2);

    let trend = &view["training"]["monthly_trend"];
    assert_eq!(trend["status"], "available");
    let months: Vec<_> = trend["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(months, ["Jan", "Feb", "Mar"]);
}

#[test_log::test]
fn test_missing_inputs_show_upload_prompt() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), "{}");
    let sales = temp_dir.path().join("sales.csv");
    fs::write(&sales, test_utils::SALES_CSV).expect("Failed to write sales file");
    let args = kpidash::RunArgs {
        sales: Some(sales),
        ..kpidash::RunArgs::default()
    };

    let output = kpidash::render_command(
        kpidash::AppCommand::Dashboard,
        Some(config_path.to_str().unwrap()),
        &args,
    )
    .expect("Missing inputs should not be an error");
    let output = console::strip_ansi_codes(&output).to_string();

    assert!(output.contains("Upload all 3 Excel files to start"));
    assert!(output.contains("missing Financial KPI"));
    assert!(output.contains("missing Evaluation Form"));
    assert!(!output.contains("TOTAL DIALS"));
}

#[test_log::test]
fn test_unreadable_input_is_an_error() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), "{}");
    let mut args = args_with_inputs(temp_dir.path(), kpidash::cli::OutputFormat::Table);
    args.financial = Some(temp_dir.path().join("does-not-exist.csv"));

    let result = kpidash::render_command(
        kpidash::AppCommand::Financial,
        Some(config_path.to_str().unwrap()),
        &args,
    );
    let err = result.expect_err("A missing file should fail");
    assert!(err.to_string().contains("does-not-exist.csv"));
}

#[test_log::test]
fn test_options_command_lists_filter_values() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), "{}");
    let args = args_with_inputs(temp_dir.path(), kpidash::cli::OutputFormat::Json);

    let output = kpidash::render_command(
        kpidash::AppCommand::Options,
        Some(config_path.to_str().unwrap()),
        &args,
    )
    .expect("Options failed");
    let options: serde_json::Value = serde_json::from_str(&output).expect("Output is not JSON");

    assert_eq!(options["months"], serde_json::json!(["All", "February", "January"]));
    assert_eq!(options["trainers"], serde_json::json!(["All", "Ahmed", "Sara"]));
    assert_eq!(options["years"], serde_json::json!(["All", "2024"]));
}

#[test_log::test]
fn test_trainer_panel_with_renamed_columns() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let evaluation = temp_dir.path().join("renamed_evaluation.csv");
    fs::write(
        &evaluation,
        "Trainer,Expectation,Date\nSara,4,2024-05-01\nSara,2,2024-04-01\nOmar,5,2024-04-20\n",
    )
    .expect("Failed to write evaluation file");
    let config_path = test_utils::write_config(
        temp_dir.path(),
        r#"
schema:
  evaluation:
    trainer: "Trainer"
    expectation: "Expectation"
    training_date: "Date"
"#,
    );
    let mut args = args_with_inputs(temp_dir.path(), kpidash::cli::OutputFormat::Json);
    args.evaluation = Some(evaluation);
    args.filters.trainer = "Sara".to_string();

    let output = kpidash::render_command(
        kpidash::AppCommand::Training,
        Some(config_path.to_str().unwrap()),
        &args,
    )
    .expect("Training panel failed");
    let panel: serde_json::Value = serde_json::from_str(&output).expect("Output is not JSON");

    assert_eq!(panel["trainer"], "Sara");
    assert_eq!(panel["expectation"]["low"], 1);
    assert_eq!(panel["expectation"]["good"], 1);
    assert_eq!(panel["trainer_performance"]["series"], serde_json::json!(["Expectation"]));
    let months: Vec<_> = panel["monthly_trend"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["month"].as_u64().unwrap())
        .collect();
    assert_eq!(months, [4, 5]);
}
