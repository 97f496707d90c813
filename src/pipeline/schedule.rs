use crate::corpus::Record;
use crate::error::{Error, Result};

/// A contiguous, index-addressed slice of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    pub index: usize,
    pub records: &'a [Record],
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of the first record in the corpus.
    pub fn start_row(&self, batch_size: usize) -> usize {
        self.index * batch_size
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
    batch_size: usize,
}

impl BatchScheduler {
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::invalid_config("batch_size must be greater than zero"));
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn total_batches(&self, corpus_len: usize) -> usize {
        corpus_len.div_ceil(self.batch_size)
    }

    /// Batches `resume, resume + 1, ..` up to the end of the corpus.
    ///
    /// A resume index at or past the end yields nothing.
    pub fn batches<'a>(&self, corpus: &'a [Record], resume: usize) -> Batches<'a> {
        Batches {
            corpus,
            batch_size: self.batch_size,
            next: resume,
            total: self.total_batches(corpus.len()),
        }
    }
}

pub struct Batches<'a> {
    corpus: &'a [Record],
    batch_size: usize,
    next: usize,
    total: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = Batch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let index = self.next;
        let start = index * self.batch_size;
        let end = (start + self.batch_size).min(self.corpus.len());
        self.next += 1;
        Some(Batch {
            index,
            records: &self.corpus[start..end],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total.saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Batches<'_> {}
