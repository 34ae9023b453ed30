use crate::analysis::transform::transform;
use crate::data::cache::{DatasetCache, Fingerprint};
use crate::data::loader::{DataLoader, IngestOptions};
use crate::data::source::{DataSource, FetchLimits};
use crate::data::{Dataset, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the dataset snapshot for one analysis session.
///
/// Loading the same bytes again returns the cached snapshot instead of
/// re-running the pipeline. A failed load clears the current snapshot so that
/// no stale data is analysed in its place.
#[derive(Debug)]
pub struct AnalysisSession {
    options: IngestOptions,
    cache: DatasetCache,
    current: Option<(Fingerprint, Arc<Dataset>)>,
}

impl AnalysisSession {
    pub fn new(options: IngestOptions, cache_capacity: usize) -> Self {
        Self {
            options,
            cache: DatasetCache::new(cache_capacity),
            current: None,
        }
    }

    pub fn load_source(&mut self, source: &DataSource, limits: &FetchLimits) -> Result<Arc<Dataset>> {
        let bytes = match source.read_bytes(limits) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.current = None;
                return Err(e);
            }
        };
        self.load_bytes(&bytes)
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<Arc<Dataset>> {
        let fingerprint = Fingerprint::compute(bytes, &self.options);

        if let Some(dataset) = self.cache.get(&fingerprint) {
            info!(%fingerprint, records = dataset.len(), "reusing cached dataset");
            self.current = Some((fingerprint, Arc::clone(&dataset)));
            return Ok(dataset);
        }

        match Self::build(bytes, &self.options) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                self.cache.insert(fingerprint, Arc::clone(&dataset));
                self.current = Some((fingerprint, Arc::clone(&dataset)));
                Ok(dataset)
            }
            Err(e) => {
                warn!(%fingerprint, error = %e, "load failed");
                self.current = None;
                Err(e)
            }
        }
    }

    fn build(bytes: &[u8], options: &IngestOptions) -> Result<Dataset> {
        let table = DataLoader::load_bytes(bytes, options)?;
        Ok(transform(table)?)
    }

    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.current.as_ref().map(|(_, dataset)| Arc::clone(dataset))
    }

    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.current.as_ref().map(|(fingerprint, _)| *fingerprint)
    }

    pub fn cached_datasets(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnLayout, DataError};
    use crate::types::LayoutVariant;

    const CSV: &str = "date,index,night,fut,spot\n\
                       2024-01-03,101,2,-2,3\n\
                       2024-01-01,100,5,3,2\n\
                       2024-01-02,102,-4,1,-1\n";

    fn session() -> AnalysisSession {
        AnalysisSession::new(
            IngestOptions {
                layout: ColumnLayout::variant(LayoutVariant::Bundled),
                ..IngestOptions::default()
            },
            1,
        )
    }

    #[test]
    fn test_reload_reuses_snapshot() {
        let mut session = session();
        let first = session.load_bytes(CSV.as_bytes()).unwrap();
        let second = session.load_bytes(CSV.as_bytes()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert_eq!(session.cached_datasets(), 1);
    }

    #[test]
    fn test_changed_input_replaces_snapshot() {
        let mut session = session();
        let first = session.load_bytes(CSV.as_bytes()).unwrap();
        let fingerprint = session.fingerprint().unwrap();

        let changed = CSV.replace("2024-01-03,101", "2024-01-03,104");
        let second = session.load_bytes(changed.as_bytes()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_ne!(session.fingerprint().unwrap(), fingerprint);
        assert_eq!(session.cached_datasets(), 1);
    }

    #[test]
    fn test_failed_load_clears_snapshot() {
        let mut session = session();
        session.load_bytes(CSV.as_bytes()).unwrap();
        let broken = "date,index,night,fut,spot\n2024-01-01,100,x,3,2\n";
        assert!(matches!(
            session.load_bytes(broken.as_bytes()),
            Err(DataError::Validation(_))
        ));
        assert!(session.current().is_none());
    }
}
