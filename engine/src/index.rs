use crate::error::{EngineError, Result};
use crate::ranking;
use crate::tokenizer::{normalize_term, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::io::{BufRead, BufReader, Read};

pub type TermCount = u32;

/// Bounds a document identifier must satisfy to key the store and break ranking ties.
pub trait DocumentKey: Eq + Hash + Ord + Clone + fmt::Debug {}

impl<T: Eq + Hash + Ord + Clone + fmt::Debug> DocumentKey for T {}

/// Caller-supplied document identifier, ordered lexicographically.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Term counts for a single document. Missing terms read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFrequencyTable {
    counts: HashMap<String, TermCount>,
}

impl TermFrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, term: &str) -> TermCount {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.counts.contains_key(term)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the document length in tokens.
    pub fn total_terms(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TermCount)> + '_ {
        self.counts.iter().map(|(t, &c)| (t.as_str(), c))
    }

    // pins at TermCount::MAX instead of wrapping
    fn increment(&mut self, term: String) {
        let count = self.counts.entry(term).or_insert(0);
        *count = count.saturating_add(1);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    /// Distinct terms across the whole collection.
    pub distinct_terms: usize,
    pub total_terms: u64,
}

/// Forward index: one term-frequency table per document.
///
/// Posting sets are not stored; every lookup scans the forward tables, so a
/// newly added document is visible to all queries immediately.
#[derive(Debug, Clone)]
pub struct IndexStore<D = DocumentId> {
    docs: HashMap<D, TermFrequencyTable>,
}

impl<D: DocumentKey> Default for IndexStore<D> {
    fn default() -> Self {
        Self { docs: HashMap::new() }
    }
}

impl<D: DocumentKey> IndexStore<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document read line-by-line from `reader`.
    ///
    /// If `id` is already present the call is a no-op and the reader is not
    /// touched. A read error is returned as-is; terms counted before the
    /// failure stay in the store.
    pub fn add_document<R: Read>(&mut self, id: D, reader: R) -> Result<()> {
        if self.docs.contains_key(&id) {
            tracing::debug!(doc = ?id, "document already indexed, ignoring");
            return Ok(());
        }
        let table = self.docs.entry(id.clone()).or_default();
        for line in BufReader::new(reader).lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!(
                        doc = ?id,
                        error = %err,
                        "read failed, document left partially indexed"
                    );
                    return Err(err.into());
                }
            };
            for term in tokenize(&line) {
                table.increment(term);
            }
        }
        tracing::debug!(doc = ?id, terms = table.len(), "indexed document");
        Ok(())
    }

    pub fn add_text(&mut self, id: D, text: &str) -> Result<()> {
        self.add_document(id, text.as_bytes())
    }

    /// Ids of every document containing `term`. Case-insensitive.
    pub fn index_lookup(&self, term: &str) -> HashSet<D> {
        let term = normalize_term(term);
        self.docs
            .iter()
            .filter(|(_, table)| table.contains(&term))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn term_frequency(&self, id: &D, term: &str) -> Result<TermCount> {
        let table = self.table(id)?;
        Ok(table.get(&normalize_term(term)))
    }

    /// `ln((1 + N) / (1 + M))` with N documents in the store and M of them containing `term`.
    pub fn inverse_document_frequency(&self, term: &str) -> f64 {
        let term = normalize_term(term);
        let n = self.docs.len() as f64;
        let m = self.document_frequency(&term) as f64;
        ((1.0 + n) / (1.0 + m)).ln()
    }

    pub fn tf_idf(&self, id: &D, term: &str) -> Result<f64> {
        let table = self.table(id)?;
        let tf = table.get(&normalize_term(term));
        Ok(f64::from(tf) * self.inverse_document_frequency(term))
    }

    /// Documents containing `term`, most relevant first.
    pub fn relevance_lookup(&self, term: &str) -> Vec<D> {
        ranking::relevance_lookup(self, term)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn contains(&self, id: &D) -> bool {
        self.docs.contains_key(id)
    }

    pub fn document(&self, id: &D) -> Option<&TermFrequencyTable> {
        self.docs.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &D> + '_ {
        self.docs.keys()
    }

    pub fn stats(&self) -> IndexStats {
        let mut vocabulary: HashSet<&str> = HashSet::new();
        let mut total_terms = 0u64;
        for table in self.docs.values() {
            total_terms += table.total_terms();
            vocabulary.extend(table.iter().map(|(t, _)| t));
        }
        IndexStats {
            documents: self.docs.len(),
            distinct_terms: vocabulary.len(),
            total_terms,
        }
    }

    fn table(&self, id: &D) -> Result<&TermFrequencyTable> {
        self.docs.get(id).ok_or_else(|| EngineError::unknown_document(id))
    }

    // expects an already-normalized term
    fn document_frequency(&self, term: &str) -> usize {
        self.docs.values().filter(|table| table.contains(term)).count()
    }
}
