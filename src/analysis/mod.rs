pub mod correlation;
pub mod insights;
pub mod regression;
pub mod transform;

use crate::data::DailyRecord;
use crate::types::Metric;
use chrono::NaiveDate;
use correlation::{correlate, CorrelationError, CorrelationPolicy, CorrelationResult};
use insights::{derive_insights, summarize, Insights, SummaryMetrics};
use ndarray::Array1;
use regression::{ols, Trendline};
use serde::{Serialize, Serializer};
use std::fmt::Display;
use tracing::{debug, warn};

fn serialize_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// A coefficient, or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    Defined(CorrelationResult),
    Undefined {
        metric: Metric,
        #[serde(serialize_with = "serialize_display")]
        error: CorrelationError,
    },
}

impl CorrelationOutcome {
    pub fn metric(&self) -> Metric {
        match self {
            CorrelationOutcome::Defined(result) => result.metric,
            CorrelationOutcome::Undefined { metric, .. } => *metric,
        }
    }

    pub fn defined(&self) -> Option<&CorrelationResult> {
        match self {
            CorrelationOutcome::Defined(result) => Some(result),
            CorrelationOutcome::Undefined { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAnalysis {
    pub metric: Metric,
    pub correlation: CorrelationOutcome,
    pub trendline: Option<Trendline>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub summary: SummaryMetrics,
    pub metrics: Vec<MetricAnalysis>,
    pub insights: Insights,
}

impl AnalysisReport {
    pub fn correlation(&self, metric: Metric) -> Option<&CorrelationOutcome> {
        self.metrics
            .iter()
            .find(|m| m.metric == metric)
            .map(|m| &m.correlation)
    }
}

/// Extracts one column of the record window as an array.
pub fn series<F: Fn(&DailyRecord) -> f64>(records: &[DailyRecord], field: F) -> Array1<f64> {
    records.iter().map(field).collect()
}

/// Correlates overnight futures volume with each next-day metric over a record window.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    policy: CorrelationPolicy,
}

impl Analyzer {
    pub fn new(policy: CorrelationPolicy) -> Self {
        Self { policy }
    }

    pub fn analyze(&self, records: &[DailyRecord]) -> AnalysisReport {
        let metrics: Vec<MetricAnalysis> = Metric::ALL
            .iter()
            .map(|&metric| self.analyze_metric(records, metric))
            .collect();

        let insights = derive_insights(
            records,
            metrics.iter().filter_map(|m| m.correlation.defined()),
        );

        AnalysisReport {
            start: records.first().map(|r| r.date),
            end: records.last().map(|r| r.date),
            summary: summarize(records),
            metrics,
            insights,
        }
    }

    pub fn analyze_metric(&self, records: &[DailyRecord], metric: Metric) -> MetricAnalysis {
        let x = series(records, |r| r.night_futures);
        let y = series(records, |r| r.metric(metric));

        let correlation = match correlate(metric, x.view(), y.view(), &self.policy) {
            Ok(result) => {
                debug!(%metric, r = result.r, p_value = ?result.p_value, "correlation computed");
                CorrelationOutcome::Defined(result)
            }
            Err(error) => {
                warn!(%metric, %error, "correlation undefined");
                CorrelationOutcome::Undefined { metric, error }
            }
        };
        let trendline = ols(x.view(), y.view()).ok();

        MetricAnalysis {
            metric,
            correlation,
            trendline,
        }
    }
}
