//! Compile-time limits shared by the binaries.

/// Number of ranked results returned when the caller does not ask for a size.
pub const DEFAULT_K: usize = 10;

/// Upper bound on ranked results per query.
pub const MAX_K: usize = 100;

/// Largest document body accepted over HTTP, in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 1_000_000;
