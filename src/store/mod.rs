//! Durable state: the transformed output and the progress checkpoint.

pub mod checkpoint;
pub mod csv;
pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::corpus::Record;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed,
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    pub id: String,
    pub original_text: String,
    /// `None` is the failure marker; it is written as an empty cell.
    pub transformed_text: Option<String>,
    pub outcome: Outcome,
}

impl TransformResult {
    pub fn success(record: &Record, transformed: String) -> Self {
        Self {
            id: record.id.clone(),
            original_text: record.text.clone(),
            transformed_text: Some(transformed),
            outcome: Outcome::Success,
        }
    }

    pub fn failed(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            original_text: record.text.clone(),
            transformed_text: None,
            outcome: Outcome::Failed,
        }
    }
}

/// Append-only destination for transformed rows.
#[async_trait]
pub trait OutputSink: Send {
    /// Persist `results` in order. With `first_write_of_run` the sink starts
    /// fresh and writes its header before the rows.
    async fn append_batch(&mut self, results: &[TransformResult], first_write_of_run: bool)
        -> Result<()>;
}

/// Durable "last recorded batch" marker.
#[async_trait]
pub trait CheckpointStore: Send {
    /// `None` when no batch has been recorded yet.
    async fn load(&self) -> Result<Option<usize>>;

    /// Replace the stored value. Must leave either the old or the new value
    /// behind if the process dies midway.
    async fn save(&mut self, batch: usize) -> Result<()>;
}

/// Batch index a run should start from, given the stored checkpoint.
///
/// Saturates, so a checkpoint at `usize::MAX` resumes past every batch.
pub fn resume_index(checkpoint: Option<usize>) -> usize {
    checkpoint.map_or(0, |last| last.saturating_add(1))
}
