use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use rephrase::corpus::csv::CsvCorpus;
use rephrase::corpus::ndjson::NdjsonCorpus;
use rephrase::corpus::CorpusLoader;
use rephrase::error::Result;
use rephrase::pipeline::cancel::CancelToken;
use rephrase::pipeline::config::{CheckpointPolicy, PipelineConfig};
use rephrase::pipeline::orchestrator::{Orchestrator, RunStatus};
use rephrase::store::checkpoint::FileCheckpoint;
use rephrase::store::csv::CsvSink;
use rephrase::transform::http::{HttpTranslator, HttpTranslatorConfig};
use rephrase::transform::TransformationClient;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    Csv,
    Ndjson,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    EveryBatch,
    AtPause,
}

/// Paraphrase a corpus by round-trip translation, resuming from the last checkpoint.
#[derive(Parser, Debug)]
#[command(name = "rephrase", version)]
struct Cli {
    /// Input corpus (CSV with a header row, or NDJSON)
    input: PathBuf,

    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    #[arg(long, default_value = "id")]
    id_column: String,

    #[arg(long, default_value = "comments")]
    text_column: String,

    #[arg(long, default_value = "processed_data.csv")]
    output: PathBuf,

    #[arg(long, default_value = "checkpoint.txt")]
    checkpoint: PathBuf,

    /// JSON file with pipeline settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    max_requests_before_pause: Option<usize>,

    /// Seconds
    #[arg(long)]
    delay_between_batches: Option<f64>,

    /// Seconds
    #[arg(long)]
    long_pause: Option<f64>,

    #[arg(long)]
    retries: Option<u32>,

    /// Seconds
    #[arg(long)]
    retry_delay: Option<f64>,

    #[arg(long)]
    intermediate_language: Option<String>,

    #[arg(long)]
    sample_size: Option<usize>,

    #[arg(long, value_enum)]
    checkpoint_policy: Option<Policy>,

    #[arg(long, default_value = "http://localhost:5000")]
    translator_url: String,

    #[arg(long, env = "REPHRASE_API_KEY")]
    api_key: Option<String>,

    /// Seconds
    #[arg(long, default_value_t = 30.0)]
    request_timeout: f64,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(n) = self.batch_size {
            config = config.batch_size(n);
        }
        if let Some(n) = self.max_requests_before_pause {
            config = config.max_requests_before_pause(n);
        }
        if let Some(secs) = self.delay_between_batches {
            config = config.delay_between_batches(seconds(secs)?);
        }
        if let Some(secs) = self.long_pause {
            config = config.long_pause_duration(seconds(secs)?);
        }
        if let Some(n) = self.retries {
            config = config.retries(n);
        }
        if let Some(secs) = self.retry_delay {
            config = config.retry_delay(seconds(secs)?);
        }
        if let Some(lang) = &self.intermediate_language {
            config = config.intermediate_language(lang.clone());
        }
        if self.sample_size.is_some() {
            config = config.sample_size(self.sample_size);
        }
        if let Some(policy) = self.checkpoint_policy {
            config = config.checkpoint_policy(match policy {
                Policy::EveryBatch => CheckpointPolicy::EveryBatch,
                Policy::AtPause => CheckpointPolicy::AtPause,
            });
        }
        config.validate()?;
        Ok(config)
    }

    fn format(&self) -> InputFormat {
        self.format.unwrap_or_else(|| {
            match self.input.extension().and_then(|e| e.to_str()) {
                Some("ndjson" | "jsonl") => InputFormat::Ndjson,
                _ => InputFormat::Csv,
            }
        })
    }
}

fn seconds(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| {
        rephrase::error::Error::invalid_config(format!("invalid duration {secs}: {e}"))
    })
}

async fn run(cli: Cli) -> Result<RunStatus> {
    let config = cli.pipeline_config()?;

    let records = match cli.format() {
        InputFormat::Csv => {
            CsvCorpus::from_file(&cli.input)
                .id_column(&cli.id_column)
                .text_column(&cli.text_column)
                .sample_size(config.sample_size)
                .load()
                .await?
        }
        InputFormat::Ndjson => {
            NdjsonCorpus::from_file(&cli.input)
                .id_field(&cli.id_column)
                .text_field(&cli.text_column)
                .allow_empty_lines(true)
                .sample_size(config.sample_size)
                .load()
                .await?
        }
    };

    let translator = HttpTranslator::new(HttpTranslatorConfig {
        base_url: cli.translator_url.clone(),
        timeout: seconds(cli.request_timeout)?,
        api_key: cli.api_key.clone(),
    })?;
    let client = TransformationClient::new(translator, &config);

    let cancel = CancelToken::default();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current batch");
            on_signal.cancel();
        }
    });

    let mut orchestrator = Orchestrator::new(
        config,
        client,
        CsvSink::new(&cli.output),
        FileCheckpoint::new(&cli.checkpoint),
    )?
    .with_cancel(cancel);

    let summary = orchestrator.run(&records).await?;
    let stats = orchestrator.transform().stats();
    tracing::info!(
        status = ?summary.status,
        resumed_from = summary.resumed_from,
        total_batches = summary.total_batches,
        committed = summary.committed(),
        failed = summary.failed(),
        round_trips = stats.round_trips,
        cache_hits = stats.cache_hits,
        fallbacks = stats.fallbacks,
        "run finished"
    );
    Ok(summary.status)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rephrase=info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(RunStatus::Done) => ExitCode::SUCCESS,
        Ok(RunStatus::Stopped) => ExitCode::from(130),
        Err(err) => {
            tracing::error!(error = %err, "run aborted");
            ExitCode::FAILURE
        }
    }
}
