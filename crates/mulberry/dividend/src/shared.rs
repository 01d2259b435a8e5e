use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use mulberry_types::{
    ContributionCategory, ContributionEvent, CooperativeRole, CooperativeStats,
    DividendDistribution, Member, MemberId, MemberReport,
};

use crate::allocator::DividendAllocator;
use crate::error::{DividendError, DividendResult};
use crate::store::MemberStore;

/// Cloneable handle that serializes access to one allocator.
///
/// A settlement reads every member's aggregates while a contribution writes
/// one of them, so both go through the same lock: a distribution never sees
/// a half-applied contribution.
pub struct SharedAllocator<S: MemberStore> {
    inner: Arc<Mutex<DividendAllocator<S>>>,
}

impl<S: MemberStore> Clone for SharedAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: MemberStore> SharedAllocator<S> {
    pub fn new(allocator: DividendAllocator<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(allocator)),
        }
    }

    fn lock(&self) -> DividendResult<MutexGuard<'_, DividendAllocator<S>>> {
        self.inner.lock().map_err(|_| DividendError::LockPoisoned)
    }

    /// Run `f` with exclusive access to the allocator.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut DividendAllocator<S>) -> DividendResult<T>,
    ) -> DividendResult<T> {
        let mut guard = self.lock()?;
        f(&mut guard)
    }

    pub fn register_member(
        &self,
        agent_name: impl Into<String>,
        role: CooperativeRole,
    ) -> DividendResult<Member> {
        self.lock()?.register_member(agent_name, role)
    }

    pub fn set_member_active(&self, member_id: &MemberId, active: bool) -> DividendResult<Member> {
        self.lock()?.set_member_active(member_id, active)
    }

    pub fn record_contribution(
        &self,
        member_id: &MemberId,
        category: ContributionCategory,
        amount: f64,
        description: impl Into<String>,
    ) -> DividendResult<ContributionEvent> {
        self.lock()?
            .record_contribution(member_id, category, amount, description)
    }

    pub fn calculate_dividends(
        &self,
        total_amount: f64,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
    ) -> DividendResult<DividendDistribution> {
        self.lock()?
            .calculate_dividends(total_amount, period_start, period_end)
    }

    pub fn get_member_report(&self, member_id: &MemberId) -> DividendResult<MemberReport> {
        self.lock()?.get_member_report(member_id)
    }

    pub fn cooperative_stats(&self) -> DividendResult<CooperativeStats> {
        self.lock()?.cooperative_stats()
    }

    pub fn verify_ledger(&self) -> DividendResult<()> {
        self.lock()?.verify_ledger()
    }
}
