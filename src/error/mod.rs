use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("persistence error: {context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("service error: {context}")]
    Service { context: String },

    #[error("corpus error: {context}")]
    Corpus { context: String },

    #[error("batch size mismatch: expected {expected}, got {actual}")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn persistence(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Persistence {
            context: context.into(),
            source,
        }
    }

    pub fn service(context: impl Into<String>) -> Self {
        Self::Service {
            context: context.into(),
        }
    }

    pub fn corpus(context: impl Into<String>) -> Self {
        Self::Corpus {
            context: context.into(),
        }
    }

    /// Whether another attempt at the same batch could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Service { .. } | Self::BatchSizeMismatch { .. } | Self::Io(_)
        )
    }

    /// Errors that must stop the run instead of being recorded per batch.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. } | Self::InvalidConfiguration { .. }
        )
    }
}
