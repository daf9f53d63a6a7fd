//! In-memory document index with tf-idf relevance ranking.
//!
//! Documents are tokenized into lowercase terms and kept as one
//! term-frequency table per document. Posting sets, IDF and tf-idf are
//! computed from those tables at query time.

pub mod config;
pub mod error;
pub mod index;
pub mod ranking;
pub mod shared;
pub mod tokenizer;

pub use error::{EngineError, Result};
pub use index::{DocumentId, DocumentKey, IndexStats, IndexStore, TermCount, TermFrequencyTable};
pub use ranking::{rank_by_score, relevance_lookup, relevance_scores, Scored};
pub use shared::SharedIndex;
