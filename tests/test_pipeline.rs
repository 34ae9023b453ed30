use approx::assert_relative_eq;
use chrono::NaiveDate;
use flow_toolkit::analysis::correlation::CorrelationError;
use flow_toolkit::analysis::transform::{sort_by_date, transform};
use flow_toolkit::analysis::{Analyzer, CorrelationOutcome};
use flow_toolkit::data::loader::{DataLoader, IngestOptions};
use flow_toolkit::data::{ColumnLayout, DataError, DateRange, ValidationError};
use flow_toolkit::types::{ColumnRole, LayoutVariant, Metric};
use flow_toolkit::AnalysisSession;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn bundled() -> IngestOptions {
    IngestOptions {
        layout: ColumnLayout::variant(LayoutVariant::Bundled),
        ..IngestOptions::default()
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn defined_r(outcome: Option<&CorrelationOutcome>) -> f64 {
    outcome
        .and_then(|o| o.defined())
        .map(|c| c.r)
        .expect("correlation should be defined")
}

#[test]
fn test_three_day_scenario_end_to_end() {
    let table = DataLoader::load_path(fixture("scenario_bundled.csv"), &bundled())
        .expect("Failed to load scenario");
    assert_eq!(table.records.len(), 3);

    let dataset = transform(table).unwrap();
    let records = dataset.records();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].date, date("2024-01-02"));
    assert_eq!(records[0].next_index_value, 102.0);
    assert_relative_eq!(records[0].index_change_pct, 2.0, epsilon = 1e-9);

    assert_eq!(records[1].date, date("2024-01-03"));
    assert_eq!(records[1].next_index_value, 101.0);
    assert_relative_eq!(records[1].index_change_pct, -0.980392156862745, epsilon = 1e-9);

    let report = Analyzer::default().analyze(records);
    assert_relative_eq!(
        defined_r(report.correlation(Metric::NextDayFutures)),
        1.0,
        epsilon = 1e-12
    );
    assert_relative_eq!(
        defined_r(report.correlation(Metric::NextDaySpot)),
        -1.0,
        epsilon = 1e-12
    );
    assert_relative_eq!(
        defined_r(report.correlation(Metric::IndexChangePct)),
        1.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_dates_strictly_increasing_after_cleaning() {
    let options = IngestOptions::default();
    let sorted = transform(DataLoader::load_path(fixture("flows_utf8.csv"), &options).unwrap())
        .unwrap();
    let shuffled =
        transform(DataLoader::load_path(fixture("flows_unsorted.csv"), &options).unwrap())
            .unwrap();

    assert!(sorted.records().windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(sorted, shuffled);
    assert_eq!(sorted.first_date(), Some(date("2024-03-04")));
    // The last trading day has no successor and is dropped.
    assert_eq!(sorted.last_date(), Some(date("2024-03-18")));
}

#[test]
fn test_next_day_shift_matches_successor() {
    let options = IngestOptions::default();
    let table = DataLoader::load_path(fixture("flows_unsorted.csv"), &options).unwrap();
    let raw = sort_by_date(table.records.clone()).unwrap();
    let dataset = transform(table).unwrap();

    assert_eq!(dataset.len(), raw.len() - 1);
    for (i, record) in dataset.records().iter().enumerate() {
        assert_eq!(record.date, raw[i].date);
        assert_eq!(record.next_index_value, raw[i + 1].index_value);
        assert_eq!(record.next_day_futures, raw[i + 1].day_futures);
        assert_eq!(record.next_day_spot, raw[i + 1].day_spot);
    }
}

#[test]
fn test_thousands_separators_in_fixture() {
    let table = DataLoader::load_path(fixture("flows_utf8.csv"), &IngestOptions::default())
        .unwrap();
    let first = &table.records[0];
    assert_eq!(first.line, 3);
    assert_eq!(first.index_value, 365.12);
    assert_eq!(first.night_futures, 1250.0);
    assert_eq!(first.day_spot, 1020.0);
    assert_eq!(first.day_futures, -2345.0);
}

#[test]
fn test_reload_is_idempotent() {
    let bytes = std::fs::read(fixture("flows_utf8.csv")).unwrap();

    let mut first_session = AnalysisSession::new(IngestOptions::default(), 1);
    let mut second_session = AnalysisSession::new(IngestOptions::default(), 0);
    let a = first_session.load_bytes(&bytes).unwrap();
    let b = second_session.load_bytes(&bytes).unwrap();
    let c = second_session.load_bytes(&bytes).unwrap();
    assert_eq!(*a, *b);
    assert_eq!(*b, *c);

    let analyzer = Analyzer::default();
    let ra = analyzer.analyze(a.records());
    let rc = analyzer.analyze(c.records());
    for metric in Metric::ALL {
        assert_relative_eq!(
            defined_r(ra.correlation(metric)),
            defined_r(rc.correlation(metric)),
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_correlations_are_bounded() {
    let dataset = transform(
        DataLoader::load_path(fixture("flows_utf8.csv"), &IngestOptions::default()).unwrap(),
    )
    .unwrap();
    let report = Analyzer::default().analyze(dataset.records());

    for analysis in &report.metrics {
        let c = analysis.correlation.defined().unwrap();
        assert!((-1.0..=1.0).contains(&c.r));
        let p = c.p_value.unwrap();
        assert!((0.0..=1.0).contains(&p));
        assert_eq!(c.observations, 11);
    }
    assert_eq!(report.summary.days, 11);
    assert_eq!(
        report.insights.net_buy_days + report.insights.net_sell_days,
        11
    );
}

#[test]
fn test_window_sizes_at_the_boundary() {
    let dataset = transform(
        DataLoader::load_path(fixture("flows_utf8.csv"), &IngestOptions::default()).unwrap(),
    )
    .unwrap();
    let analyzer = Analyzer::default();

    let two = dataset.window(&DateRange::new(
        Some(date("2024-03-04")),
        Some(date("2024-03-05")),
    ));
    assert_eq!(two.len(), 2);
    let r = defined_r(analyzer.analyze(two).correlation(Metric::NextDayFutures));
    assert_relative_eq!(r.abs(), 1.0, epsilon = 1e-12);

    let one = dataset.window(&DateRange::new(Some(date("2024-03-04")), Some(date("2024-03-04"))));
    assert_eq!(one.len(), 1);
    let report = analyzer.analyze(one);
    assert_eq!(
        report.correlation(Metric::NextDaySpot),
        Some(&CorrelationOutcome::Undefined {
            metric: Metric::NextDaySpot,
            error: CorrelationError::InsufficientData { pairs: 1 },
        })
    );

    let none = dataset.window(&DateRange::new(Some(date("2025-01-01")), None));
    assert!(none.is_empty());
    let report = analyzer.analyze(none);
    assert!(report.metrics.iter().all(|m| m.correlation.defined().is_none()));
}

#[test]
fn test_garbage_cell_is_reported_with_location() {
    match DataLoader::load_path(fixture("bad_number.csv"), &bundled()) {
        Err(DataError::Validation(ValidationError::InvalidNumber {
            line,
            column,
            value,
        })) => {
            assert_eq!(line, 3);
            assert_eq!(column, ColumnRole::NightFutures);
            assert_eq!(value, "n/a");
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
}
