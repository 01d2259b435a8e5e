use thiserror::Error;

/// A persisted string did not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown contribution category: {0}")]
    UnknownCategory(String),

    #[error("unknown cooperative role: {0}")]
    UnknownRole(String),

    #[error("unknown accrual basis: {0}")]
    UnknownAccrualBasis(String),
}

/// A persisted row could not be mapped onto a typed record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("row is not an object")]
    NotAnObject,

    #[error("missing required column `{0}`")]
    MissingField(&'static str),

    #[error("column `{column}` has the wrong type: expected {expected}")]
    WrongType {
        column: &'static str,
        expected: &'static str,
    },

    #[error("column `{column}` must be a non-negative finite number, got {value}")]
    InvalidNumber { column: &'static str, value: f64 },

    #[error("column `{column}` is not an RFC 3339 timestamp: {value}")]
    InvalidTimestamp { column: &'static str, value: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
