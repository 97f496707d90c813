#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rephrase::corpus::Record;
use rephrase::error::{Error, Result};
use rephrase::transform::{BatchTransform, Translator};

pub fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record::new(format!("r{i}"), format!("text {i}")))
        .collect()
}

pub fn texts(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.text.clone()).collect()
}

/// Deterministic translator: each leg prefixes the destination language, so a
/// round trip of `hi` through `fr` back to `en` yields `en|fr|hi`.
#[derive(Clone, Default)]
pub struct ScriptedTranslator {
    calls: Arc<Mutex<Vec<(String, String, String)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any leg whose input equals `text` fails.
    pub fn fail_on(self, text: &str) -> Self {
        self.failing.lock().unwrap().insert(text.to_string());
        self
    }

    pub fn recover(&self, text: &str) {
        self.failing.lock().unwrap().remove(text);
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of first legs sent for `text`.
    pub fn round_trips_for(&self, text: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(t, source, _)| t == text && source == "auto")
            .count()
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    async fn translate(&self, text: &str, source: &str, dest: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), source.to_string(), dest.to_string()));
        if self.failing.lock().unwrap().contains(text) {
            return Err(Error::service(format!("cannot translate {text:?}")));
        }
        Ok(format!("{dest}|{text}"))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Return one text fewer than requested.
    Short,
    /// Return a transient service error.
    Fail,
    /// Return a non-retryable error.
    Fatal,
    Ok,
}

/// Batch transform that follows a script, then succeeds by upper-casing.
#[derive(Clone, Default)]
pub struct FlakyTransform {
    script: Arc<Mutex<VecDeque<Step>>>,
    attempts: Arc<AtomicUsize>,
}

impl FlakyTransform {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into_iter().collect())),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BatchTransform for FlakyTransform {
    async fn transform_batch(&mut self, texts: &[String]) -> Result<Vec<String>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Ok);
        match step {
            Step::Short => Ok(texts
                .iter()
                .skip(1)
                .map(|t| t.to_uppercase())
                .collect()),
            Step::Fail => Err(Error::service("transient")),
            Step::Fatal => Err(Error::corpus("unreadable")),
            Step::Ok => Ok(texts.iter().map(|t| t.to_uppercase()).collect()),
        }
    }
}
