use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::store::{CheckpointStore, OutputSink, TransformResult};

#[derive(Debug, Default)]
struct SinkState {
    rows: Vec<TransformResult>,
    headers_written: usize,
    appends: usize,
    fail_on_append: Option<usize>,
}

/// In-memory sink. Clones share the same rows, so a caller can keep a handle
/// while the orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<SinkState>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`-th append (1-based) fail with a persistence error.
    pub fn fail_on_append(self, n: usize) -> Self {
        self.lock().fail_on_append = Some(n);
        self
    }

    pub fn rows(&self) -> Vec<TransformResult> {
        self.lock().rows.clone()
    }

    pub fn headers_written(&self) -> usize {
        self.lock().headers_written
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn append_batch(
        &mut self,
        results: &[TransformResult],
        first_write_of_run: bool,
    ) -> Result<()> {
        let mut state = self.lock();
        state.appends += 1;
        if state.fail_on_append == Some(state.appends) {
            return Err(Error::persistence(
                "memory sink",
                std::io::Error::other("injected append failure"),
            ));
        }
        if first_write_of_run {
            state.rows.clear();
            state.headers_written += 1;
        }
        state.rows.extend_from_slice(results);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CheckpointState {
    saves: Vec<usize>,
    attempts: usize,
    fail_on_save: Option<usize>,
}

/// In-memory checkpoint that remembers every successful save.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpoint {
    state: Arc<Mutex<CheckpointState>>,
}

impl MemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(batch: usize) -> Self {
        let checkpoint = Self::default();
        checkpoint.lock().saves.push(batch);
        checkpoint
    }

    /// Make the `n`-th save (1-based) fail with a persistence error. The
    /// stored value is left as it was.
    pub fn fail_on_save(self, n: usize) -> Self {
        self.lock().fail_on_save = Some(n);
        self
    }

    pub fn saves(&self) -> Vec<usize> {
        self.lock().saves.clone()
    }

    fn lock(&self) -> MutexGuard<'_, CheckpointState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpoint {
    async fn load(&self) -> Result<Option<usize>> {
        Ok(self.lock().saves.last().copied())
    }

    async fn save(&mut self, batch: usize) -> Result<()> {
        let mut state = self.lock();
        state.attempts += 1;
        if state.fail_on_save == Some(state.attempts) {
            return Err(Error::persistence(
                "memory checkpoint",
                std::io::Error::other("injected save failure"),
            ));
        }
        state.saves.push(batch);
        Ok(())
    }
}
