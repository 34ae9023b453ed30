//! Chart descriptions handed to whatever renders them.

use crate::analysis::regression::finite_range;
use crate::analysis::{series, MetricAnalysis};
use crate::data::DailyRecord;
use crate::types::Metric;
use chrono::NaiveDate;
use serde::Serialize;

pub const NIGHT_FUTURES_LABEL: &str = "Overnight foreign futures";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Trendline clipped to the observed x range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSegment {
    pub start: Point,
    pub end: Point,
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub metric: Metric,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<Point>,
    pub trendline: Option<TrendSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarSign {
    Negative,
    NonNegative,
}

impl BarSign {
    pub fn of(value: f64) -> Self {
        if value < 0.0 {
            BarSign::Negative
        } else {
            BarSign::NonNegative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub value: f64,
    pub sign: BarSign,
}

/// Upper panel: index level line. Lower panel: overnight futures bars coloured by sign.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesChart {
    pub index_line: Vec<DatedValue>,
    pub futures_bars: Vec<Bar>,
}

pub fn scatter_chart(records: &[DailyRecord], analysis: &MetricAnalysis) -> ScatterChart {
    let metric = analysis.metric;
    let points = records
        .iter()
        .map(|r| Point {
            x: r.night_futures,
            y: r.metric(metric),
        })
        .collect();

    let x = series(records, |r| r.night_futures);
    let trendline = analysis.trendline.and_then(|line| {
        let (lo, hi) = finite_range(x.view())?;
        Some(TrendSegment {
            start: Point {
                x: lo,
                y: line.predict(lo),
            },
            end: Point {
                x: hi,
                y: line.predict(hi),
            },
            slope: line.slope,
            intercept: line.intercept,
        })
    });

    ScatterChart {
        title: format!("{} vs {}", NIGHT_FUTURES_LABEL, metric.label()),
        metric,
        x_label: NIGHT_FUTURES_LABEL,
        y_label: metric.label(),
        points,
        trendline,
    }
}

pub fn time_series_chart(records: &[DailyRecord]) -> TimeSeriesChart {
    TimeSeriesChart {
        index_line: records
            .iter()
            .map(|r| DatedValue {
                date: r.date,
                value: r.index_value,
            })
            .collect(),
        futures_bars: records
            .iter()
            .map(|r| Bar {
                date: r.date,
                value: r.night_futures,
                sign: BarSign::of(r.night_futures),
            })
            .collect(),
    }
}
