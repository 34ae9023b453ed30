pub mod charts;

use crate::analysis::insights::Insights;
use crate::analysis::{AnalysisReport, CorrelationOutcome};
use crate::data::DailyRecord;
use charts::{scatter_chart, time_series_chart, ScatterChart, TimeSeriesChart};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    pub date: NaiveDate,
    pub night_futures: f64,
    pub next_day_spot: f64,
    pub next_day_futures: f64,
    pub index_change_pct: f64,
}

impl From<&DailyRecord> for PreviewRow {
    fn from(r: &DailyRecord) -> Self {
        Self {
            date: r.date,
            night_futures: r.night_futures,
            next_day_spot: r.next_day_spot,
            next_day_futures: r.next_day_futures,
            index_change_pct: r.index_change_pct,
        }
    }
}

/// Everything the presentation layer needs for one analysed window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub analysis: AnalysisReport,
    pub scatter_charts: Vec<ScatterChart>,
    pub time_series: TimeSeriesChart,
    pub preview: Vec<PreviewRow>,
    pub insight_text: Vec<String>,
}

impl Report {
    /// `preview_rows` of zero keeps every row.
    pub fn build(records: &[DailyRecord], analysis: AnalysisReport, preview_rows: usize) -> Self {
        let scatter_charts = analysis
            .metrics
            .iter()
            .map(|m| scatter_chart(records, m))
            .collect();
        let take = if preview_rows == 0 {
            records.len()
        } else {
            preview_rows
        };
        let insight_text = insight_sentences(&analysis.insights);

        Self {
            scatter_charts,
            time_series: time_series_chart(records),
            preview: records.iter().take(take).map(PreviewRow::from).collect(),
            insight_text,
            analysis,
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "wrote JSON report");
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.analysis.summary;

        writeln!(f, "=== Overnight Foreign Futures vs Next-Day Market ===")?;
        match (self.analysis.start, self.analysis.end) {
            (Some(start), Some(end)) => writeln!(f, "Window: {} to {}", start, end)?,
            _ => writeln!(f, "Window: no records")?,
        }

        writeln!(f, "\n=== Key Metrics ===")?;
        writeln!(f, "{:<32} {:>12}", "Days analysed", summary.days)?;
        for (label, value) in [
            ("Mean overnight futures", summary.mean_night_futures),
            ("Mean regular-session futures", summary.mean_day_futures),
            ("Mean regular-session spot", summary.mean_day_spot),
        ] {
            writeln!(f, "{:<32} {:>12}", label, optional(value, 0))?;
        }

        writeln!(f, "\n=== Correlation Results ===")?;
        writeln!(
            f,
            "{:<28} {:>8} {:<10} {:<10} {:>9} {:<12}",
            "Metric", "r", "Strength", "Direction", "p-value", "Significant"
        )?;
        writeln!(f, "{:-<82}", "")?;
        for metric in &self.analysis.metrics {
            match &metric.correlation {
                CorrelationOutcome::Defined(c) => {
                    let p = c
                        .p_value
                        .map_or_else(|| "n/a".to_string(), |p| format!("{:.4}", p));
                    let significant = match c.significant {
                        Some(true) => "yes",
                        Some(false) => "no",
                        None => "n/a",
                    };
                    writeln!(
                        f,
                        "{:<28} {:>8.3} {:<10} {:<10} {:>9} {:<12}",
                        c.metric.label(),
                        c.r,
                        c.strength.to_string(),
                        c.direction.to_string(),
                        p,
                        significant
                    )?;
                }
                CorrelationOutcome::Undefined { metric, error } => {
                    writeln!(f, "{:<28} undefined ({})", metric.label(), error)?;
                }
            }
        }

        writeln!(f, "\n=== Trendlines (OLS) ===")?;
        for chart in &self.scatter_charts {
            match &chart.trendline {
                Some(t) => writeln!(
                    f,
                    "{:<28} y = {:.6}x {:+.4}",
                    chart.metric.label(),
                    t.slope,
                    t.intercept
                )?,
                None => writeln!(f, "{:<28} no trendline", chart.metric.label())?,
            }
        }

        writeln!(f, "\n=== Data Preview ===")?;
        writeln!(
            f,
            "{:<12} {:>14} {:>14} {:>14} {:>12}",
            "Date", "Night fut.", "Next spot", "Next fut.", "Index chg %"
        )?;
        for row in &self.preview {
            writeln!(
                f,
                "{:<12} {:>14} {:>14} {:>14} {:>12.2}",
                row.date.to_string(),
                format_thousands(row.night_futures, 0),
                format_thousands(row.next_day_spot, 0),
                format_thousands(row.next_day_futures, 0),
                row.index_change_pct
            )?;
        }

        writeln!(f, "\n=== Insights ===")?;
        for sentence in &self.insight_text {
            writeln!(f, "- {}", sentence)?;
        }
        Ok(())
    }
}

pub fn insight_sentences(insights: &Insights) -> Vec<String> {
    let mut sentences = Vec::new();

    match &insights.strongest {
        Some(s) => sentences.push(format!(
            "The strongest relationship is between overnight futures and {} (r = {:.3}).",
            s.metric.label().to_lowercase(),
            s.r
        )),
        None => sentences.push(
            "No correlation could be computed for the selected window.".to_string(),
        ),
    }

    sentences.push(format!(
        "Foreign investors were net buyers of overnight futures on {} days and net sellers on {} days.",
        insights.net_buy_days, insights.net_sell_days
    ));

    if let Some(avg) = insights.mean_change_pct {
        sentences.push(format!(
            "The average next-day index change over the window is {:.2}%.",
            avg
        ));
    }

    sentences
}

fn optional(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format_thousands(v, decimals))
}

/// Formats with comma thousands separators, e.g. `-1234567.8` -> `-1,234,568` at zero decimals.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // No sign on values that round to zero.
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
