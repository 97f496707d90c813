use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::corpus::{apply_sample_cap, CorpusLoader, Record};
use crate::error::{Error, Result};

const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;
const DEFAULT_READ_CHUNK_BYTES: usize = 8 * 1024;

/// One JSON object per line.
///
/// The file is read in chunks; lines may cross chunk boundaries. Ids may be
/// JSON strings or numbers.
pub struct NdjsonCorpus {
    path: PathBuf,
    id_field: String,
    text_field: String,
    read_chunk_bytes: usize,
    max_line_bytes: usize,
    allow_empty_lines: bool,
    sample_size: Option<usize>,
}

impl NdjsonCorpus {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            id_field: "id".to_string(),
            text_field: "text".to_string(),
            read_chunk_bytes: DEFAULT_READ_CHUNK_BYTES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            allow_empty_lines: false,
            sample_size: None,
        }
    }

    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = name.into();
        self
    }

    pub fn text_field(mut self, name: impl Into<String>) -> Self {
        self.text_field = name.into();
        self
    }

    /// Number of bytes read per filesystem call.
    pub fn read_chunk_bytes(mut self, n: usize) -> Self {
        self.read_chunk_bytes = n.max(1);
        self
    }

    /// Maximum number of bytes allowed for one line.
    pub fn max_line_bytes(mut self, n: usize) -> Self {
        self.max_line_bytes = n;
        self
    }

    /// Whether blank lines should be ignored.
    pub fn allow_empty_lines(mut self, yes: bool) -> Self {
        self.allow_empty_lines = yes;
        self
    }

    pub fn sample_size(mut self, cap: Option<usize>) -> Self {
        self.sample_size = cap;
        self
    }

    fn parse_line(&self, line: &[u8], line_no: usize) -> Result<Option<Record>> {
        let line = strip_cr(line);

        if line.is_empty() && self.allow_empty_lines {
            return Ok(None);
        }

        let value = serde_json::from_slice::<Value>(line).map_err(|err| {
            Error::corpus(format!(
                "line {line_no}: failed to parse ({} bytes, preview: {:?}): {err}",
                line.len(),
                preview(line)
            ))
        })?;

        let id = match value.get(&self.id_field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(Error::corpus(format!(
                    "line {line_no}: missing string or numeric field {:?}",
                    self.id_field
                )))
            }
        };
        let text = value
            .get(&self.text_field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::corpus(format!(
                    "line {line_no}: missing string field {:?}",
                    self.text_field
                ))
            })?;

        Ok(Some(Record::new(id, text)))
    }
}

#[async_trait]
impl CorpusLoader for NdjsonCorpus {
    async fn load(&self) -> Result<Vec<Record>> {
        let mut file = File::open(&self.path).await?;
        let mut chunk = vec![0u8; self.read_chunk_bytes];
        let mut line_buf = Vec::new();
        let mut line_no = 0usize;
        let mut records = Vec::new();
        let full = |records: &Vec<Record>| self.sample_size.is_some_and(|cap| records.len() >= cap);

        'read: loop {
            let n = file.read(&mut chunk).await?;
            if n == 0 {
                break;
            }

            for &byte in &chunk[..n] {
                if byte == b'\n' {
                    line_no += 1;
                    if let Some(record) = self.parse_line(&line_buf, line_no)? {
                        records.push(record);
                    }
                    line_buf.clear();
                    if full(&records) {
                        break 'read;
                    }
                    continue;
                }

                line_buf.push(byte);
                if line_buf.len() > self.max_line_bytes {
                    return Err(Error::corpus(format!(
                        "line {}: exceeded max_line_bytes ({} > {})",
                        line_no + 1,
                        line_buf.len(),
                        self.max_line_bytes
                    )));
                }
            }
        }

        if !line_buf.is_empty() && !full(&records) {
            if let Some(record) = self.parse_line(&line_buf, line_no + 1)? {
                records.push(record);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::INFO,
            event = "rephrase.corpus.loaded",
            path = %self.path.display(),
            records = records.len(),
            "rephrase.corpus.loaded"
        );

        Ok(apply_sample_cap(records, self.sample_size))
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn preview(line: &[u8]) -> String {
    const PREVIEW_LEN: usize = 80;
    let text = String::from_utf8_lossy(line);
    let mut short = text.chars().take(PREVIEW_LEN).collect::<String>();
    if text.chars().count() > PREVIEW_LEN {
        short.push_str("...");
    }
    short
}
