use crate::corpus::Record;
use crate::error::{Error, Result};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::config::{CheckpointPolicy, PipelineConfig};
use crate::pipeline::rate::{Pause, RateLimiter};
use crate::pipeline::retry::{BatchOutcome, RetryPolicy};
use crate::pipeline::schedule::{Batch, BatchScheduler};
use crate::store::{resume_index, CheckpointStore, OutputSink, TransformResult};
use crate::transform::BatchTransform;

/// Per-batch lifecycle: `Pending -> Attempting -> Committed | FailedRecorded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Pending,
    Attempting,
    Committed,
    /// Retries ran out or the batch hit an error; the rows were still written
    /// with the failure marker.
    FailedRecorded,
}

impl BatchState {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Committed | Self::FailedRecorded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub index: usize,
    pub records: usize,
    pub state: BatchState,
    pub attempts: u32,
    pub pause: Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every batch has been recorded.
    Done,
    /// The cancel token fired before the corpus was exhausted.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub resumed_from: usize,
    pub total_batches: usize,
    pub batches: Vec<BatchReport>,
}

impl RunSummary {
    pub fn committed(&self) -> usize {
        self.count(BatchState::Committed)
    }

    pub fn failed(&self) -> usize {
        self.count(BatchState::FailedRecorded)
    }

    fn count(&self, state: BatchState) -> usize {
        self.batches.iter().filter(|b| b.state == state).count()
    }
}

/// Drives the sequential batch loop.
///
/// Batches run one at a time. Each batch is retried as a unit, written to the
/// sink (with failure markers when retries run out), and followed by the rate
/// limiter's sleep. Sink and checkpoint failures end the run with `Err`;
/// nothing else does.
pub struct Orchestrator<B, S, C> {
    config: PipelineConfig,
    scheduler: BatchScheduler,
    retry: RetryPolicy,
    limiter: RateLimiter,
    transform: B,
    sink: S,
    checkpoint: C,
    cancel: CancelToken,
}

impl<B, S, C> Orchestrator<B, S, C>
where
    B: BatchTransform,
    S: OutputSink,
    C: CheckpointStore,
{
    pub fn new(config: PipelineConfig, transform: B, sink: S, checkpoint: C) -> Result<Self> {
        config.validate()?;
        let scheduler = BatchScheduler::new(config.batch_size)?;
        let retry = RetryPolicy::new(config.retries).delay(config.retry_delay);
        let limiter = RateLimiter::new(
            config.max_requests_before_pause,
            config.delay_between_batches,
            config.long_pause_duration,
        );
        Ok(Self {
            config,
            scheduler,
            retry,
            limiter,
            transform,
            sink,
            checkpoint,
            cancel: CancelToken::default(),
        })
    }

    /// Replace the default retry policy, e.g. to narrow what counts as retryable.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn transform(&self) -> &B {
        &self.transform
    }

    pub fn into_parts(self) -> (B, S, C) {
        (self.transform, self.sink, self.checkpoint)
    }

    pub async fn run(&mut self, corpus: &[Record]) -> Result<RunSummary> {
        let corpus = match self.config.sample_size {
            Some(cap) if cap < corpus.len() => &corpus[..cap],
            _ => corpus,
        };

        let resumed_from = resume_index(self.checkpoint.load().await?);
        let total_batches = self.scheduler.total_batches(corpus.len());

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::INFO,
            event = "rephrase.run.start",
            records = corpus.len(),
            batch_size = self.scheduler.batch_size(),
            total_batches = total_batches,
            resume = resumed_from,
            "rephrase.run.start"
        );

        #[cfg(feature = "tracing")]
        if resumed_from > 0 {
            tracing::event!(
                tracing::Level::INFO,
                event = "rephrase.run.resume",
                skipped_batches = resumed_from.min(total_batches),
                "rephrase.run.resume"
            );
        }

        let mut first_write = resumed_from == 0;
        let mut last_recorded: Option<usize> = None;
        let mut unsaved = false;
        let mut reports = Vec::new();
        let mut status = RunStatus::Done;

        for batch in self.scheduler.batches(corpus, resumed_from) {
            if self.cancel.is_cancelled() {
                #[cfg(feature = "tracing")]
                tracing::event!(
                    tracing::Level::DEBUG,
                    event = "rephrase.cancelled",
                    where_ = "batch",
                    next_batch = batch.index,
                    "rephrase.cancelled"
                );
                status = RunStatus::Stopped;
                break;
            }

            let (state, attempts) = self.process(&batch, first_write).await?;
            first_write = false;
            last_recorded = Some(batch.index);

            let pause = self.limiter.record(batch.len());
            let save_now = match self.config.checkpoint_policy {
                CheckpointPolicy::EveryBatch => true,
                CheckpointPolicy::AtPause => pause.is_long(),
            };
            if save_now {
                self.checkpoint.save(batch.index).await?;
                unsaved = false;
            } else {
                unsaved = true;
            }

            reports.push(BatchReport {
                index: batch.index,
                records: batch.len(),
                state,
                attempts,
                pause,
            });

            let is_last = batch.index + 1 == total_batches;
            if !is_last && !self.sleep(pause).await {
                status = RunStatus::Stopped;
                break;
            }
        }

        if status == RunStatus::Done && unsaved {
            if let Some(index) = last_recorded {
                self.checkpoint.save(index).await?;
            }
        }

        let summary = RunSummary {
            status,
            resumed_from,
            total_batches,
            batches: reports,
        };

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::INFO,
            event = "rephrase.run.done",
            status = ?summary.status,
            committed = summary.committed(),
            failed = summary.failed(),
            "rephrase.run.done"
        );

        Ok(summary)
    }

    /// Attempt one batch and write its rows. Only sink errors escape.
    async fn process(&mut self, batch: &Batch<'_>, first_write: bool) -> Result<(BatchState, u32)> {
        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::INFO,
            event = "rephrase.batch.start",
            batch = batch.index,
            first_row = batch.start_row(self.scheduler.batch_size()),
            records = batch.len(),
            state = ?BatchState::Attempting,
            "rephrase.batch.start"
        );

        let texts: Vec<String> = batch.records.iter().map(|r| r.text.clone()).collect();
        let outcome = self.retry.run(batch.index, &texts, &mut self.transform).await;
        let attempts = outcome.attempts();

        let (state, results): (BatchState, Vec<TransformResult>) = match outcome {
            BatchOutcome::Committed { transformed, .. } => (
                BatchState::Committed,
                batch
                    .records
                    .iter()
                    .zip(transformed)
                    .map(|(record, text)| TransformResult::success(record, text))
                    .collect(),
            ),
            BatchOutcome::Failed { reason, .. } => {
                log_failed(batch, &reason);
                (
                    BatchState::FailedRecorded,
                    batch.records.iter().map(TransformResult::failed).collect(),
                )
            }
        };

        self.sink.append_batch(&results, first_write).await?;

        #[cfg(feature = "tracing")]
        if state == BatchState::Committed {
            tracing::event!(
                tracing::Level::INFO,
                event = "rephrase.batch.committed",
                batch = batch.index,
                attempts = attempts,
                "rephrase.batch.committed"
            );
        }

        Ok((state, attempts))
    }

    async fn sleep(&self, pause: Pause) -> bool {
        #[cfg(feature = "tracing")]
        match pause {
            Pause::Long(d) => tracing::event!(
                tracing::Level::INFO,
                event = "rephrase.rate.pause",
                max_requests = self.config.max_requests_before_pause,
                pause_ms = d.as_millis() as u64,
                "rephrase.rate.pause"
            ),
            Pause::Short(d) => tracing::event!(
                tracing::Level::DEBUG,
                event = "rephrase.rate.delay",
                delay_ms = d.as_millis() as u64,
                "rephrase.rate.delay"
            ),
        }

        let slept = self.cancel.sleep(pause.duration()).await;

        #[cfg(feature = "tracing")]
        if !slept {
            tracing::event!(
                tracing::Level::DEBUG,
                event = "rephrase.cancelled",
                where_ = "pause",
                "rephrase.cancelled"
            );
        }

        slept
    }
}

fn log_failed(_batch: &Batch<'_>, _reason: &Error) {
    #[cfg(feature = "tracing")]
    tracing::event!(
        tracing::Level::ERROR,
        event = "rephrase.batch.failed",
        batch = _batch.index,
        records = _batch.len(),
        error = %_reason,
        "rephrase.batch.failed"
    );
}
