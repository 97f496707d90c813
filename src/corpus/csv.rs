use std::path::PathBuf;

use async_trait::async_trait;

use crate::corpus::{apply_sample_cap, CorpusLoader, Record};
use crate::error::{Error, Result};

const MISSING: &str = "missing";

/// Headered CSV corpus with one id column and one text column.
///
/// Rows whose text is blank or the `missing` placeholder are dropped.
pub struct CsvCorpus {
    path: PathBuf,
    id_column: String,
    text_column: String,
    sample_size: Option<usize>,
}

impl CsvCorpus {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            id_column: "id".to_string(),
            text_column: "comments".to_string(),
            sample_size: None,
        }
    }

    pub fn id_column(mut self, name: impl Into<String>) -> Self {
        self.id_column = name.into();
        self
    }

    pub fn text_column(mut self, name: impl Into<String>) -> Self {
        self.text_column = name.into();
        self
    }

    /// Keep only the first `cap` usable rows.
    pub fn sample_size(mut self, cap: Option<usize>) -> Self {
        self.sample_size = cap;
        self
    }

    fn parse(&self, raw: &[u8]) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(raw);

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                Error::corpus(format!(
                    "column {name:?} not found in {}",
                    self.path.display()
                ))
            })
        };
        let id_idx = column(&self.id_column)?;
        let text_idx = column(&self.text_column)?;

        let mut records = Vec::new();
        for row in reader.records() {
            if self.sample_size.is_some_and(|cap| records.len() >= cap) {
                break;
            }
            let row = row?;
            let text = row.get(text_idx).unwrap_or_default().trim();
            if text.is_empty() || text == MISSING {
                continue;
            }
            let id = row.get(id_idx).unwrap_or_default();
            records.push(Record::new(id, text));
        }
        Ok(apply_sample_cap(records, self.sample_size))
    }
}

#[async_trait]
impl CorpusLoader for CsvCorpus {
    async fn load(&self) -> Result<Vec<Record>> {
        let raw = tokio::fs::read(&self.path).await?;
        let records = self.parse(&raw)?;

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::INFO,
            event = "rephrase.corpus.loaded",
            path = %self.path.display(),
            records = records.len(),
            "rephrase.corpus.loaded"
        );

        Ok(records)
    }
}
