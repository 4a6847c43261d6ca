//! Input validation shared by operations

use crate::gcp::ApiError;
use crate::ui::Console;
use std::io::Write;
use thiserror::Error;

/// Why an operation did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    /// Rejected locally; no remote call was made
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Local input or output failed (file access, malformed JSON)
    #[error("{0}")]
    Local(String),
}

pub type OpResult<T> = Result<T, OpError>;

/// Trimmed value of a required field, or `EmptyField`
pub fn required<'a>(label: &'static str, value: &'a str) -> OpResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OpError::EmptyField(label));
    }
    Ok(trimmed)
}

/// Validate a required field, printing the rejection when empty
pub fn require<'a, W: Write>(
    console: &mut Console<W>,
    label: &'static str,
    value: &'a str,
) -> OpResult<&'a str> {
    required(label, value).inspect_err(|e| console.failure(e))
}
