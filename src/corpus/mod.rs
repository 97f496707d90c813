//! Ordered input records.
//!
//! Loaders hand the orchestrator a finished, ordered `Vec<Record>`; batch
//! indices are positions in that vector, so a loader must return the same
//! order on every run for resume to line up.

pub mod csv;
pub mod ndjson;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
pub trait CorpusLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<Record>>;
}

/// Loader over records already in memory.
#[derive(Debug, Clone, Default)]
pub struct VecCorpus {
    records: Vec<Record>,
}

impl VecCorpus {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Records with ids `"0"`, `"1"`, .. in the order given.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Record::new(i.to_string(), text))
            .collect();
        Self { records }
    }
}

#[async_trait]
impl CorpusLoader for VecCorpus {
    async fn load(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

pub(crate) fn apply_sample_cap(mut records: Vec<Record>, cap: Option<usize>) -> Vec<Record> {
    if let Some(cap) = cap {
        records.truncate(cap);
    }
    records
}
