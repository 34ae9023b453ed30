use anyhow::{Context, Result};
use chrono::NaiveDate;
use flow_toolkit::config::{Config, DEFAULT_CONFIG_PATH};
use flow_toolkit::data::source::DataSource;
use flow_toolkit::logging::setup_logging;
use flow_toolkit::report::Report;
use flow_toolkit::{AnalysisSession, Analyzer, DateRange};
use std::env;
use tracing::{info, warn};

fn parse_date_arg(raw: Option<String>, name: &str) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("{} must be YYYY-MM-DD, got {:?}", name, s))
    })
    .transpose()
}

fn main() -> Result<()> {
    let config_path =
        env::var("FLOW_TOOLKIT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;
    setup_logging(&config.logging.level);

    // Usage: flow-toolkit [SOURCE] [START_DATE] [END_DATE]
    let mut args = env::args().skip(1);
    let source = DataSource::parse(&args.next().unwrap_or_else(|| config.data.source.clone()));
    let start = parse_date_arg(args.next(), "START_DATE")?;
    let end = parse_date_arg(args.next(), "END_DATE")?;

    let mut session = AnalysisSession::new(config.ingest_options(), config.session.cache_capacity);
    let dataset = session
        .load_source(&source, &config.fetch_limits())
        .with_context(|| format!("failed to load dataset from {}", source))?;
    info!(
        records = dataset.len(),
        first = ?dataset.first_date(),
        last = ?dataset.last_date(),
        "dataset ready"
    );

    let range = DateRange::new(start, end);
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            warn!(start = %s, end = %e, "start date is after end date, window is empty");
        }
    }
    let window = dataset.window(&range);

    let analyzer = Analyzer::new(config.analysis);
    let analysis = analyzer.analyze(window);
    let report = Report::build(window, analysis, config.report.preview_rows);

    println!("{}", report);

    if let Some(path) = &config.report.json_output {
        report
            .write_json(path)
            .with_context(|| format!("failed to write JSON report to {}", path.display()))?;
    }

    Ok(())
}
