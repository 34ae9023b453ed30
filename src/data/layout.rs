use super::ValidationError;
use crate::types::{ColumnRole, LayoutVariant};
use serde::{Deserialize, Serialize};

/// Positional mapping from CSV columns to semantic roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub columns: Vec<ColumnRole>,
    /// The first row after the header carries units rather than values.
    #[serde(default)]
    pub unit_row: bool,
}

impl ColumnLayout {
    pub fn variant(variant: LayoutVariant) -> Self {
        use ColumnRole::*;
        match variant {
            LayoutVariant::Upload => Self {
                columns: vec![Date, IndexValue, NightFutures, DaySpot, DayFutures],
                unit_row: true,
            },
            LayoutVariant::Bundled => Self {
                columns: vec![Date, IndexValue, NightFutures, DayFutures, DaySpot],
                unit_row: false,
            },
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn position(&self, role: ColumnRole) -> Option<usize> {
        self.columns.iter().position(|c| *c == role)
    }

    /// Every measured role must appear exactly once; `Ignore` may repeat.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for role in ColumnRole::REQUIRED {
            let count = self.columns.iter().filter(|c| **c == role).count();
            if count != 1 {
                return Err(ValidationError::InvalidLayout(format!(
                    "column {} appears {} times, expected exactly once",
                    role, count
                )));
            }
        }
        Ok(())
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::variant(LayoutVariant::Upload)
    }
}
