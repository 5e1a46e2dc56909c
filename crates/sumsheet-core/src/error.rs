use thiserror::Error;

use crate::evaluator::ParseError;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("secure random source unavailable: {0}")]
    RandomUnavailable(String),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

pub type SheetResult<T> = Result<T, SheetError>;
