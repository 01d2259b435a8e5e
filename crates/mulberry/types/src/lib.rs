//! Core type definitions for the Mulberry cooperative dividend ledger.
//!
//! This crate provides the shared data model: members, contribution events,
//! distributions and reports, plus the string codecs and row mapping used at
//! the storage edge. No allocation logic lives here.

pub mod contribution;
pub mod distribution;
pub mod error;
pub mod ids;
pub mod member;
pub mod report;
pub mod row;

pub use contribution::{ContributionCategory, ContributionEvent, ContributionTotals};
pub use distribution::{
    AccrualBasis, CategoryWeights, DistributionSummary, DividendBreakdown, DividendDistribution,
};
pub use error::{MappingError, ParseError};
pub use ids::{ContributionId, DistributionId, MemberId};
pub use member::{CooperativeRole, Member};
pub use report::{CooperativeStats, MemberReport};
