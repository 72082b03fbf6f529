use std::io;

use thiserror::Error;

use crate::binary::BinaryError;
use crate::text::TextError;
use crate::xml::XmlError;

/// Convenience alias for results of the format-agnostic entry points.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of [`parse`](crate::parse), [`from_reader`](crate::from_reader) or
/// [`serialize`](crate::serialize).
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer bytes than needed to tell the formats apart.
    #[error("insufficient data: need at least 5 bytes to detect the format, got {len}")]
    InsufficientData {
        /// Number of bytes available.
        len: usize,
    },
    /// The binary codec failed.
    #[error(transparent)]
    Binary(#[from] BinaryError),
    /// The text codec failed.
    #[error(transparent)]
    Text(#[from] TextError),
    /// The XML codec failed.
    #[error(transparent)]
    Xml(#[from] XmlError),
    /// Reading the source or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
