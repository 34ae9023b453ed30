use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic role of a positional CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    IndexValue,
    NightFutures,
    DayFutures,
    DaySpot,
    Ignore,
}

impl ColumnRole {
    pub const REQUIRED: [ColumnRole; 5] = [
        ColumnRole::Date,
        ColumnRole::IndexValue,
        ColumnRole::NightFutures,
        ColumnRole::DayFutures,
        ColumnRole::DaySpot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::IndexValue => "index_value",
            ColumnRole::NightFutures => "night_futures",
            ColumnRole::DayFutures => "day_futures",
            ColumnRole::DaySpot => "day_spot",
            ColumnRole::Ignore => "ignore",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Known export variants. The column order is fixed per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    /// Uploaded exports: date, index, night futures, spot, futures, followed by a unit row.
    Upload,
    /// Bundled dataset: date, index, night futures, futures, spot.
    Bundled,
}

/// Next-day series compared against overnight futures volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    NextDayFutures,
    NextDaySpot,
    IndexChangePct,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::NextDayFutures,
        Metric::NextDaySpot,
        Metric::IndexChangePct,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::NextDayFutures => "Next-day regular futures",
            Metric::NextDaySpot => "Next-day regular spot",
            Metric::IndexChangePct => "Next-day index change %",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Weak => "weak",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Positive => f.write_str("positive"),
            Direction::Negative => f.write_str("negative"),
        }
    }
}
