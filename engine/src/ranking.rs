use crate::index::{DocumentKey, IndexStore};
use crate::tokenizer::normalize_term;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored<D> {
    pub id: D,
    pub score: f64,
}

/// Higher score first; equal scores fall back to ascending id.
pub fn compare_scored<D: Ord>(a: &Scored<D>, b: &Scored<D>) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

/// Score every candidate once and sort with [`compare_scored`].
pub fn rank_by_score<D, I, F>(candidates: I, score: F) -> Vec<Scored<D>>
where
    D: Ord,
    I: IntoIterator<Item = D>,
    F: Fn(&D) -> f64,
{
    let mut scored: Vec<Scored<D>> = candidates
        .into_iter()
        .map(|id| {
            let score = score(&id);
            Scored { id, score }
        })
        .collect();
    scored.sort_by(compare_scored);
    scored
}

/// Documents containing `term` with their tf-idf, most relevant first.
///
/// Documents without the term are left out entirely rather than ranked at 0.
pub fn relevance_scores<D: DocumentKey>(store: &IndexStore<D>, term: &str) -> Vec<Scored<D>> {
    let term = normalize_term(term);
    let candidates = store.index_lookup(&term);
    if candidates.is_empty() {
        return Vec::new();
    }
    let idf = store.inverse_document_frequency(&term);
    rank_by_score(candidates, |id| {
        let tf = store.document(id).map_or(0, |table| table.get(&term));
        f64::from(tf) * idf
    })
}

pub fn relevance_lookup<D: DocumentKey>(store: &IndexStore<D>, term: &str) -> Vec<D> {
    relevance_scores(store, term).into_iter().map(|s| s.id).collect()
}
