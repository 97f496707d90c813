use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::store::CheckpointStore;

/// Checkpoint kept as a single integer in a text file.
///
/// A missing or blank file means no batch has been recorded. Saves go through
/// a sibling `.tmp` file that is synced and renamed over the target.
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpoint {
    async fn load(&self) -> Result<Option<usize>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(Error::persistence(
                    format!("failed reading checkpoint {}", self.path.display()),
                    err,
                ))
            }
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse::<usize>().map(Some).map_err(|err| {
            Error::persistence(
                format!("corrupt checkpoint {}", self.path.display()),
                std::io::Error::new(ErrorKind::InvalidData, format!("{trimmed:?}: {err}")),
            )
        })
    }

    async fn save(&mut self, batch: usize) -> Result<()> {
        let tmp_path = self.tmp_path();
        let write = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(batch.to_string().as_bytes()).await?;
            file.sync_all().await?;
            Ok::<(), std::io::Error>(())
        };
        write.await.map_err(|err| {
            Error::persistence(
                format!("failed writing checkpoint temp {}", tmp_path.display()),
                err,
            )
        })?;

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| {
                Error::persistence(
                    format!("failed replacing checkpoint {}", self.path.display()),
                    err,
                )
            })?;

        #[cfg(feature = "tracing")]
        tracing::event!(
            tracing::Level::DEBUG,
            event = "rephrase.checkpoint.saved",
            batch = batch,
            path = %self.path.display(),
            "rephrase.checkpoint.saved"
        );

        Ok(())
    }
}
