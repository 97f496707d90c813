//! # rephrase
//!
//! **Resumable, rate-limited round-trip paraphrasing in Rust.**
//!
//! `rephrase` pushes a large, ordered corpus of short texts through an
//! external translator (source → intermediate language → target) and writes a
//! paraphrased copy of the corpus. The external service is slow, throttled and
//! sometimes wrong, and runs take hours, so the pipeline is built to be
//! stopped and restarted at any point.
//!
//! It is designed for those constraints:
//!
//! - fixed-size, index-addressed batches
//! - batch-granular retry with a fixed delay
//! - a shared request budget with long pauses
//! - a durable checkpoint and append-only output
//! - memoized calls with a bounded cache
//!
//! ---
//!
//! ## Core Model
//!
//! One batch at a time, strictly in order:
//!
//! ```text
//! Checkpoint → Scheduler → Retry(Transform) → Sink → Checkpoint → RateLimiter
//! ```
//!
//! A batch whose retries run out is still written, with an empty transformed
//! cell for every record, so the output always lines up row for row with the
//! input. Only configuration and persistence failures stop a run.
//!
//! ---
//!
//! ## Example
//!
//! ```no_run
//! use rephrase::corpus::{csv::CsvCorpus, CorpusLoader};
//! use rephrase::pipeline::config::PipelineConfig;
//! use rephrase::pipeline::orchestrator::Orchestrator;
//! use rephrase::store::{checkpoint::FileCheckpoint, csv::CsvSink};
//! use rephrase::transform::{TransformationClient, Translator};
//!
//! # async fn demo(translator: impl Translator) -> rephrase::error::Result<()> {
//! let config = PipelineConfig::default().batch_size(10).retries(2);
//! let corpus = CsvCorpus::from_file("reviews.csv")
//!     .text_column("comments_cleaned")
//!     .load()
//!     .await?;
//!
//! let client = TransformationClient::new(translator, &config);
//! let mut run = Orchestrator::new(
//!     config,
//!     client,
//!     CsvSink::new("processed_data.csv"),
//!     FileCheckpoint::new("checkpoint.txt"),
//! )?;
//!
//! let summary = run.run(&corpus).await?;
//! println!("{} committed, {} failed", summary.committed(), summary.failed());
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Resume Contract
//!
//! The checkpoint holds the index of the last recorded batch; the next run
//! starts at the batch after it. With [`CheckpointPolicy::EveryBatch`] (the
//! default) a crash replays at most the one batch that was appended but not
//! yet checkpointed. [`CheckpointPolicy::AtPause`] only writes the checkpoint
//! on long pauses and at the end of a run, so every batch since the last pause
//! is replayed and appended again.
//!
//! ---
//!
//! ## Observability
//!
//! With the default `tracing` feature, `rephrase` emits events such as
//! `rephrase.batch.start`, `rephrase.batch.committed`,
//! `rephrase.batch.failed`, `rephrase.retry.attempt_failed`,
//! `rephrase.rate.pause`, `rephrase.checkpoint.saved` and
//! `rephrase.transform.fallback`.
//!
//! ---
//!
//! ## Feature Flags
//!
//! - `tracing` *(default)*: structured events.
//! - `http`: [`transform::http::HttpTranslator`] for LibreTranslate-compatible services.
//! - `cli`: the `rephrase` binary.
//!
//! [`CheckpointPolicy::EveryBatch`]: pipeline::config::CheckpointPolicy::EveryBatch
//! [`CheckpointPolicy::AtPause`]: pipeline::config::CheckpointPolicy::AtPause

pub mod corpus;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod transform;

pub mod prelude {
    //! Convenient imports for most `rephrase` users.

    pub use crate::corpus::{CorpusLoader, Record};
    pub use crate::pipeline::cancel::CancelToken;
    pub use crate::pipeline::config::{CheckpointPolicy, PipelineConfig};
    pub use crate::pipeline::orchestrator::{Orchestrator, RunStatus, RunSummary};
    pub use crate::pipeline::retry::RetryPolicy;
    pub use crate::store::{CheckpointStore, OutputSink};
    pub use crate::transform::{BatchTransform, TransformationClient, Translator};
}
