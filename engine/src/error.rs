use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The document id was never added to the store.
    #[error("unknown document: {0}")]
    UnknownDocument(String),

    /// The document stream failed while it was being read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn unknown_document(id: &impl std::fmt::Debug) -> Self {
        EngineError::UnknownDocument(format!("{id:?}"))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
