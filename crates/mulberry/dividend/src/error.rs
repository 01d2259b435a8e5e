use chrono::{DateTime, Utc};
use mulberry_types::{ContributionCategory, MemberId};
use thiserror::Error;

use crate::store::StoreError;

/// Errors from the dividend allocator.
///
/// Every error is returned before the member pool is touched: a rejected
/// operation leaves no partial state behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DividendError {
    // --- Input errors ---
    #[error("invalid amount {amount} for {context}: amounts must be finite and non-negative")]
    InvalidAmount { amount: f64, context: &'static str },

    #[error("unknown member: {0}")]
    UnknownMember(MemberId),

    #[error("member already registered: {0}")]
    DuplicateMember(MemberId),

    #[error("invalid settlement period: start {start} is after end {end}")]
    InvalidPeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    // --- Configuration errors ---
    #[error("invalid category weights (sum {sum}): {reason}")]
    InvalidWeightConfiguration { sum: f64, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    // --- Ledger errors ---
    #[error(
        "aggregate mismatch for {member} ({category}): cached {cached}, event log sums to {replayed}"
    )]
    AggregateMismatch {
        member: MemberId,
        category: ContributionCategory,
        cached: f64,
        replayed: f64,
    },

    #[error("member store error: {0}")]
    Store(#[from] StoreError),

    #[error("allocator lock poisoned")]
    LockPoisoned,
}

impl DividendError {
    /// Map a store-level "not found" onto the caller-facing variant.
    pub(crate) fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::MemberNotFound(id) => DividendError::UnknownMember(id),
            StoreError::DuplicateMember(id) => DividendError::DuplicateMember(id),
            other => DividendError::Store(other),
        }
    }
}

pub type DividendResult<T> = Result<T, DividendError>;
