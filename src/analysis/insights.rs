use super::correlation::CorrelationResult;
use crate::data::DailyRecord;
use crate::types::Metric;
use ndarray::Array1;
use serde::Serialize;

/// Headline figures for the analysed window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub days: usize,
    pub mean_night_futures: Option<f64>,
    pub mean_day_futures: Option<f64>,
    pub mean_day_spot: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrongestCorrelation {
    pub metric: Metric,
    pub r: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub strongest: Option<StrongestCorrelation>,
    pub net_buy_days: usize,
    pub net_sell_days: usize,
    pub mean_change_pct: Option<f64>,
}

fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    Array1::from_iter(values).mean()
}

pub fn summarize(records: &[DailyRecord]) -> SummaryMetrics {
    SummaryMetrics {
        days: records.len(),
        mean_night_futures: mean(records.iter().map(|r| r.night_futures)),
        mean_day_futures: mean(records.iter().map(|r| r.day_futures)),
        mean_day_spot: mean(records.iter().map(|r| r.day_spot)),
    }
}

/// Largest |r| among the given results; the earliest wins a tie.
pub fn strongest<'a, I>(results: I) -> Option<&'a CorrelationResult>
where
    I: IntoIterator<Item = &'a CorrelationResult>,
{
    results.into_iter().fold(None, |best, candidate| match best {
        Some(current) if current.r.abs() >= candidate.r.abs() => Some(current),
        _ => Some(candidate),
    })
}

pub fn derive_insights<'a, I>(records: &[DailyRecord], correlations: I) -> Insights
where
    I: IntoIterator<Item = &'a CorrelationResult>,
{
    Insights {
        strongest: strongest(correlations).map(|c| StrongestCorrelation {
            metric: c.metric,
            r: c.r,
        }),
        // Flat days (exactly zero) count toward neither side.
        net_buy_days: records.iter().filter(|r| r.night_futures > 0.0).count(),
        net_sell_days: records.iter().filter(|r| r.night_futures < 0.0).count(),
        mean_change_pct: mean(records.iter().map(|r| r.index_change_pct)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CorrelationStrength, Direction};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn record(day: u32, night: f64, change: f64) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            index_value: 100.0,
            night_futures: night,
            day_futures: 10.0 * day as f64,
            day_spot: -2.0,
            next_index_value: 100.0 + change,
            next_day_futures: 0.0,
            next_day_spot: 0.0,
            index_change_pct: change,
        }
    }

    fn result(metric: Metric, r: f64) -> CorrelationResult {
        CorrelationResult {
            metric,
            r,
            p_value: None,
            observations: 10,
            strength: CorrelationStrength::Weak,
            direction: Direction::Positive,
            significant: None,
        }
    }

    #[test]
    fn test_summary_means() {
        let records = vec![record(1, 100.0, 1.0), record(2, -50.0, -0.5)];
        let summary = summarize(&records);
        assert_eq!(summary.days, 2);
        assert_relative_eq!(summary.mean_night_futures.unwrap(), 25.0);
        assert_relative_eq!(summary.mean_day_futures.unwrap(), 15.0);
        assert_relative_eq!(summary.mean_day_spot.unwrap(), -2.0);
    }

    #[test]
    fn test_empty_window_has_no_means() {
        let summary = summarize(&[]);
        assert_eq!(summary.days, 0);
        assert_eq!(summary.mean_night_futures, None);
    }

    #[test]
    fn test_strongest_by_magnitude_first_wins_ties() {
        let results = vec![
            result(Metric::NextDayFutures, 0.2),
            result(Metric::NextDaySpot, -0.6),
            result(Metric::IndexChangePct, 0.6),
        ];
        let best = strongest(&results).unwrap();
        assert_eq!(best.metric, Metric::NextDaySpot);
        assert!(strongest(&Vec::<CorrelationResult>::new()).is_none());
    }

    #[test]
    fn test_day_counts_and_mean_change() {
        let records = vec![
            record(1, 5.0, 2.0),
            record(2, -4.0, -1.0),
            record(3, 0.0, 0.5),
            record(4, 7.0, 0.5),
        ];
        let results = vec![result(Metric::NextDayFutures, 0.4)];
        let insights = derive_insights(&records, &results);
        assert_eq!(insights.net_buy_days, 2);
        assert_eq!(insights.net_sell_days, 1);
        assert_relative_eq!(insights.mean_change_pct.unwrap(), 0.5);
        assert_eq!(
            insights.strongest,
            Some(StrongestCorrelation {
                metric: Metric::NextDayFutures,
                r: 0.4
            })
        );
    }
}
