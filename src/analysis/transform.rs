use crate::data::{DailyRecord, Dataset, LoadedTable, RawRecord, ValidationError};
use tracing::{debug, info};

pub type Result<T> = std::result::Result<T, ValidationError>;

/// A sorted row with its successor's values attached. Derived fields are `None`
/// where no successor exists or the change percentage is undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub record: RawRecord,
    pub next_index_value: Option<f64>,
    pub next_day_futures: Option<f64>,
    pub next_day_spot: Option<f64>,
    pub index_change_pct: Option<f64>,
}

impl DerivedRow {
    fn complete(&self) -> Option<DailyRecord> {
        Some(DailyRecord {
            date: self.record.date,
            index_value: self.record.index_value,
            night_futures: self.record.night_futures,
            day_futures: self.record.day_futures,
            day_spot: self.record.day_spot,
            next_index_value: self.next_index_value?,
            next_day_futures: self.next_day_futures?,
            next_day_spot: self.next_day_spot?,
            index_change_pct: self.index_change_pct?,
        })
    }
}

/// Sort, derive next-day fields, then drop rows lacking any derived value.
pub fn transform(table: LoadedTable) -> Result<Dataset> {
    let sorted = sort_by_date(table.records)?;
    let derived = derive_next_day(&sorted);
    let records = drop_incomplete(derived);
    info!(records = records.len(), "built analysis dataset");
    Ok(Dataset::new(records))
}

/// Stable ascending sort by date. Duplicate dates are rejected.
pub fn sort_by_date(mut records: Vec<RawRecord>) -> Result<Vec<RawRecord>> {
    records.sort_by_key(|r| r.date);
    if let Some(pair) = records.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(ValidationError::DuplicateDate(pair[1].date));
    }
    Ok(records)
}

/// Row i borrows index, regular futures and regular spot from row i + 1.
pub fn derive_next_day(records: &[RawRecord]) -> Vec<DerivedRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let next = records.get(i + 1);
            let next_index_value = next.map(|n| n.index_value);
            DerivedRow {
                record: record.clone(),
                next_index_value,
                next_day_futures: next.map(|n| n.day_futures),
                next_day_spot: next.map(|n| n.day_spot),
                index_change_pct: next_index_value
                    .and_then(|next_value| change_pct(record.index_value, next_value)),
            }
        })
        .collect()
}

/// Percentage change from `current` to `next`; undefined when `current` is zero.
pub fn change_pct(current: f64, next: f64) -> Option<f64> {
    if current == 0.0 {
        return None;
    }
    Some((next - current) / current * 100.0)
}

/// Keeps only rows whose derived values are all defined. This always removes the
/// final row (it has no successor) and any row with a zero index level.
pub fn drop_incomplete(rows: Vec<DerivedRow>) -> Vec<DailyRecord> {
    let total = rows.len();
    let complete: Vec<DailyRecord> = rows.iter().filter_map(DerivedRow::complete).collect();
    debug!(
        dropped = total - complete.len(),
        kept = complete.len(),
        "dropped rows with undefined derived values"
    );
    complete
}
