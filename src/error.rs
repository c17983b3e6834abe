use thiserror::Error;

/// Errors raised by the metadata model and its collaborators.
///
/// Failing to find an author or title in a BibTeX entry is not an error;
/// the extractor reports that with `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// A property name that was never registered in the model.
    #[error("property not found: {0}")]
    NotFound(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("PDF has no usable Info dictionary")]
    MissingInfo,
}

pub type Result<T> = std::result::Result<T, Error>;
