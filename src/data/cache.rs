//! Content-addressed cache of transformed datasets.

use super::loader::IngestOptions;
use super::Dataset;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// SHA-256 over the raw input bytes and the ingestion options that shaped them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn compute(bytes: &[u8], options: &IngestOptions) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
        for role in &options.layout.columns {
            hasher.update(role.name().as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([options.layout.unit_row as u8]);
        for label in &options.encodings {
            hasher.update(label.as_bytes());
            hasher.update([0u8]);
        }
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough for log lines.
        f.write_str(&self.to_hex()[..12])
    }
}

/// Bounded map from fingerprint to dataset; the oldest entry is evicted first.
#[derive(Debug)]
pub struct DatasetCache {
    capacity: usize,
    entries: HashMap<Fingerprint, Arc<Dataset>>,
    order: VecDeque<Fingerprint>,
}

impl DatasetCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<Dataset>> {
        self.entries.get(fingerprint).cloned()
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, dataset: Arc<Dataset>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(fingerprint, dataset).is_none() {
            self.order.push_back(fingerprint);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
