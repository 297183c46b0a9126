use std::sync::Arc;

use crate::normalizer::Prediction;

pub const HISTORY_CAP: usize = 10;

/// Newest-first list of recent predictions. Every operation returns a new
/// list; records are shared with the previous value, never copied or mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryList {
    entries: Vec<Arc<Prediction>>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: impl Into<Arc<Prediction>>) -> Self {
        let mut entries = Vec::with_capacity(HISTORY_CAP);
        entries.push(record.into());
        entries.extend(self.entries.iter().take(HISTORY_CAP - 1).cloned());
        Self { entries }
    }

    pub fn clear(&self) -> Self {
        Self::new()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Prediction>> {
        self.entries.iter()
    }
}
