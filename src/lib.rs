//! Correlation analysis between overnight foreign-investor futures flow and
//! next-day market behaviour.
//!
//! The pipeline runs `decode -> parse -> sort -> shift -> derive -> correlate`:
//! [`data::loader`] turns raw CSV bytes into [`data::RawRecord`]s,
//! [`analysis::transform`] builds the immutable [`data::Dataset`], and
//! [`analysis::Analyzer`] produces the report consumed by [`report`].

pub mod analysis;
pub mod config;
pub mod data;
pub mod logging;
pub mod report;
pub mod session;
pub mod types;

pub use analysis::{AnalysisReport, Analyzer};
pub use config::Config;
pub use data::{DailyRecord, DataError, Dataset, DateRange};
pub use session::AnalysisSession;
