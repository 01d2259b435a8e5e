//! # mulberry-dividend
//!
//! Contribution-weighted dividend allocation for the Mulberry cooperative.
//!
//! Members accumulate contributions in three categories (marketing, work
//! hours, revenue). A settlement run splits a payout across the active
//! members: each category receives a fixed weight of the payout (45% / 30% /
//! 25% by default) which is then divided in proportion to each member's
//! figures in that category.
//!
//! - [`DividendAllocator`] runs registrations, contributions and settlements
//!   over an injected [`MemberStore`]
//! - [`AllocatorConfig`] carries the category weights and accrual basis and
//!   loads from TOML
//! - [`SharedAllocator`] serializes access for multi-threaded callers
//!
//! ## Accrual basis
//!
//! By default a run reads the members' running totals and records the
//! settlement period as metadata only. With [`AccrualBasis::PeriodScoped`] a
//! run re-sums only the events timestamped inside the period.

pub mod allocator;
pub mod audit;
pub mod config;
pub mod error;
pub mod report;
pub mod shared;
pub mod store;

pub use allocator::{allocate, Allocation, DividendAllocator};
pub use config::{validate_weights, AllocatorConfig, WEIGHT_EPSILON};
pub use error::{DividendError, DividendResult};
pub use shared::SharedAllocator;
pub use store::{InMemoryMemberStore, MemberStore, StoreError};

pub use mulberry_types::{
    AccrualBasis, CategoryWeights, ContributionCategory, ContributionEvent, ContributionId,
    ContributionTotals, CooperativeRole, CooperativeStats, DividendBreakdown, DividendDistribution, Member, MemberId,
    MemberReport,
};
