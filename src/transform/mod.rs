//! Round-trip paraphrasing through an external translator.

pub mod cache;
#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::pipeline::config::PipelineConfig;
use crate::transform::cache::MemoCache;

/// The opaque external capability.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, dest: &str) -> Result<String>;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for std::sync::Arc<T> {
    async fn translate(&self, text: &str, source: &str, dest: &str) -> Result<String> {
        (**self).translate(text, source, dest).await
    }
}

/// Batch-level transform attempted by the retry policy.
///
/// A well-behaved implementation returns exactly one output per input, in
/// order; anything else is treated as a failed attempt.
#[async_trait]
pub trait BatchTransform: Send {
    async fn transform_batch(&mut self, texts: &[String]) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Round trips sent to the translator.
    pub round_trips: u64,
    pub cache_hits: u64,
    /// Round trips that failed and returned the original text.
    pub fallbacks: u64,
    pub evictions: u64,
}

/// Memoized round-trip transformer.
///
/// `transform` never fails: when either leg of the round trip errors, the
/// failure is logged and the input comes back unchanged. Such fallbacks are
/// not memoized.
pub struct TransformationClient<T> {
    translator: T,
    source_language: String,
    intermediate_language: String,
    target_language: String,
    cache: MemoCache<(String, String), String>,
    stats: ClientStats,
}

impl<T: Translator> TransformationClient<T> {
    pub fn new(translator: T, config: &PipelineConfig) -> Self {
        Self {
            translator,
            source_language: config.source_language.clone(),
            intermediate_language: config.intermediate_language.clone(),
            target_language: config.target_language.clone(),
            cache: MemoCache::new(config.cache_capacity),
            stats: ClientStats::default(),
        }
    }

    pub fn stats(&self) -> ClientStats {
        self.stats
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub async fn transform(&mut self, text: &str, intermediate: &str) -> String {
        let key = (text.to_string(), intermediate.to_string());
        if let Some(hit) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            return hit.clone();
        }

        self.stats.round_trips += 1;
        match self.round_trip(text, intermediate).await {
            Ok(paraphrased) => {
                if let Some(_evicted) = self.cache.insert(key, paraphrased.clone()) {
                    self.stats.evictions += 1;
                    #[cfg(feature = "tracing")]
                    tracing::event!(
                        tracing::Level::TRACE,
                        event = "rephrase.cache.evicted",
                        capacity = self.cache.capacity(),
                        "rephrase.cache.evicted"
                    );
                }
                paraphrased
            }
            Err(_err) => {
                self.stats.fallbacks += 1;
                #[cfg(feature = "tracing")]
                tracing::event!(
                    tracing::Level::WARN,
                    event = "rephrase.transform.fallback",
                    intermediate = intermediate,
                    chars = text.chars().count(),
                    error = %_err,
                    "rephrase.transform.fallback"
                );
                text.to_string()
            }
        }
    }

    async fn round_trip(&self, text: &str, intermediate: &str) -> Result<String> {
        let there = self
            .translator
            .translate(text, &self.source_language, intermediate)
            .await?;
        self.translator
            .translate(&there, intermediate, &self.target_language)
            .await
    }
}

#[async_trait]
impl<T: Translator> BatchTransform for TransformationClient<T> {
    async fn transform_batch(&mut self, texts: &[String]) -> Result<Vec<String>> {
        let intermediate = self.intermediate_language.clone();
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.transform(text, &intermediate).await);
        }
        Ok(out)
    }
}
