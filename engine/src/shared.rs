use crate::error::Result;
use crate::index::{DocumentId, DocumentKey, IndexStats, IndexStore, TermCount};
use crate::ranking::{self, Scored};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

/// Cloneable handle to one store shared between threads.
///
/// Writers serialize behind a single lock, so readers never see a document
/// that is still being tokenized.
pub struct SharedIndex<D = DocumentId> {
    inner: Arc<RwLock<IndexStore<D>>>,
}

impl<D> Clone for SharedIndex<D> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<D: DocumentKey> Default for SharedIndex<D> {
    fn default() -> Self {
        Self::from_store(IndexStore::new())
    }
}

impl<D: DocumentKey> SharedIndex<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: IndexStore<D>) -> Self {
        Self { inner: Arc::new(RwLock::new(store)) }
    }

    /// Hold the read lock to run several queries against one snapshot.
    pub fn read(&self) -> RwLockReadGuard<'_, IndexStore<D>> {
        self.inner.read()
    }

    pub fn add_document<R: Read>(&self, id: D, reader: R) -> Result<()> {
        self.inner.write().add_document(id, reader)
    }

    pub fn add_text(&self, id: D, text: &str) -> Result<()> {
        self.inner.write().add_text(id, text)
    }

    /// Returns `true` when this call created the document, `false` when the id
    /// was already present and the reader was left untouched.
    pub fn insert_if_absent<R: Read>(&self, id: D, reader: R) -> Result<bool> {
        let mut store = self.inner.write();
        if store.contains(&id) {
            return Ok(false);
        }
        store.add_document(id, reader)?;
        Ok(true)
    }

    pub fn index_lookup(&self, term: &str) -> HashSet<D> {
        self.inner.read().index_lookup(term)
    }

    pub fn term_frequency(&self, id: &D, term: &str) -> Result<TermCount> {
        self.inner.read().term_frequency(id, term)
    }

    pub fn inverse_document_frequency(&self, term: &str) -> f64 {
        self.inner.read().inverse_document_frequency(term)
    }

    pub fn tf_idf(&self, id: &D, term: &str) -> Result<f64> {
        self.inner.read().tf_idf(id, term)
    }

    pub fn relevance_lookup(&self, term: &str) -> Vec<D> {
        ranking::relevance_lookup(&*self.inner.read(), term)
    }

    pub fn relevance_scores(&self, term: &str) -> Vec<Scored<D>> {
        ranking::relevance_scores(&*self.inner.read(), term)
    }

    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
