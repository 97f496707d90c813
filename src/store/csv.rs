use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::store::{OutputSink, TransformResult};

pub const HEADER: [&str; 3] = ["id", "original_text", "transformed_text"];

/// Delimited output file, appended batch by batch and synced after each one.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(&self, results: &[TransformResult], with_header: bool) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        if with_header {
            writer.write_record(HEADER)?;
        }
        for row in results {
            writer.write_record([
                row.id.as_str(),
                row.original_text.as_str(),
                row.transformed_text.as_deref().unwrap_or_default(),
            ])?;
        }
        writer
            .into_inner()
            .map_err(|err| Error::persistence("failed encoding output rows", err.into_error()))
    }
}

#[async_trait]
impl OutputSink for CsvSink {
    async fn append_batch(
        &mut self,
        results: &[TransformResult],
        first_write_of_run: bool,
    ) -> Result<()> {
        let bytes = self.encode(results, first_write_of_run)?;

        let mut options = OpenOptions::new();
        options.create(true);
        if first_write_of_run {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }

        let write = async {
            let mut file = options.open(&self.path).await?;
            file.write_all(&bytes).await?;
            file.sync_data().await?;
            Ok::<(), std::io::Error>(())
        };
        write.await.map_err(|err| {
            Error::persistence(format!("failed appending to {}", self.path.display()), err)
        })
    }
}
