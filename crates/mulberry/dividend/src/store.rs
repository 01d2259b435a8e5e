use std::collections::HashMap;

use mulberry_types::{ContributionEvent, DividendDistribution, Member, MemberId};
use thiserror::Error;

/// Errors returned by member-pool stores.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("member already exists: {0}")]
    DuplicateMember(MemberId),

    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Boundary between the allocator and whatever holds the member pool.
///
/// The write operations that touch more than one record,
/// [`insert_member_with_history`](MemberStore::insert_member_with_history),
/// [`append_contribution`](MemberStore::append_contribution) and
/// [`commit_distribution`](MemberStore::commit_distribution), must apply
/// completely or not at all.
pub trait MemberStore {
    fn insert_member(&mut self, member: Member) -> Result<(), StoreError>;

    /// Insert `member` and append `history` to the log. The member's
    /// aggregates are rebuilt from `history`, whatever `member` carried.
    fn insert_member_with_history(
        &mut self,
        member: Member,
        history: Vec<ContributionEvent>,
    ) -> Result<Member, StoreError>;

    fn member(&self, id: &MemberId) -> Result<Option<Member>, StoreError>;

    /// All members in registration order.
    fn members(&self) -> Result<Vec<Member>, StoreError>;

    fn set_active(&mut self, id: &MemberId, active: bool) -> Result<Member, StoreError>;

    /// Append `event` to the log and bump the owning member's aggregate.
    fn append_contribution(&mut self, event: ContributionEvent) -> Result<Member, StoreError>;

    /// Every event in append order.
    fn contributions(&self) -> Result<Vec<ContributionEvent>, StoreError>;

    /// One member's events in append order.
    fn contributions_for(&self, id: &MemberId) -> Result<Vec<ContributionEvent>, StoreError>;

    /// Credit every member named in `distribution` and append it to history.
    fn commit_distribution(&mut self, distribution: DividendDistribution)
        -> Result<(), StoreError>;

    /// Distribution history in append order.
    fn distributions(&self) -> Result<Vec<DividendDistribution>, StoreError>;
}

/// In-memory store used for tests, local demos, and embedding.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMemberStore {
    members: HashMap<MemberId, Member>,
    order: Vec<MemberId>,
    events: Vec<ContributionEvent>,
    event_index: HashMap<MemberId, Vec<usize>>,
    distributions: Vec<DividendDistribution>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl MemberStore for InMemoryMemberStore {
    fn insert_member(&mut self, member: Member) -> Result<(), StoreError> {
        if self.members.contains_key(&member.id) {
            return Err(StoreError::DuplicateMember(member.id));
        }
        self.order.push(member.id.clone());
        self.members.insert(member.id.clone(), member);
        Ok(())
    }

    fn insert_member_with_history(
        &mut self,
        mut member: Member,
        history: Vec<ContributionEvent>,
    ) -> Result<Member, StoreError> {
        if self.members.contains_key(&member.id) {
            return Err(StoreError::DuplicateMember(member.id));
        }
        if let Some(foreign) = history.iter().find(|e| e.member_id != member.id) {
            return Err(StoreError::MemberNotFound(foreign.member_id.clone()));
        }

        member.marketing_score = 0.0;
        member.work_hours = 0.0;
        member.revenue_generated = 0.0;
        let indices = self.event_index.entry(member.id.clone()).or_default();
        for event in history {
            member.apply_contribution(event.category, event.amount);
            indices.push(self.events.len());
            self.events.push(event);
        }

        self.order.push(member.id.clone());
        self.members.insert(member.id.clone(), member.clone());
        Ok(member)
    }

    fn member(&self, id: &MemberId) -> Result<Option<Member>, StoreError> {
        Ok(self.members.get(id).cloned())
    }

    fn members(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.members.get(id).cloned())
            .collect())
    }

    fn set_active(&mut self, id: &MemberId, active: bool) -> Result<Member, StoreError> {
        let member = self
            .members
            .get_mut(id)
            .ok_or_else(|| StoreError::MemberNotFound(id.clone()))?;
        member.active = active;
        Ok(member.clone())
    }

    fn append_contribution(&mut self, event: ContributionEvent) -> Result<Member, StoreError> {
        let member = self
            .members
            .get_mut(&event.member_id)
            .ok_or_else(|| StoreError::MemberNotFound(event.member_id.clone()))?;

        member.apply_contribution(event.category, event.amount);
        let updated = member.clone();

        self.event_index
            .entry(event.member_id.clone())
            .or_default()
            .push(self.events.len());
        self.events.push(event);

        Ok(updated)
    }

    fn contributions(&self) -> Result<Vec<ContributionEvent>, StoreError> {
        Ok(self.events.clone())
    }

    fn contributions_for(&self, id: &MemberId) -> Result<Vec<ContributionEvent>, StoreError> {
        Ok(self
            .event_index
            .get(id)
            .map(|indices| indices.iter().map(|&i| self.events[i].clone()).collect())
            .unwrap_or_default())
    }

    fn commit_distribution(
        &mut self,
        distribution: DividendDistribution,
    ) -> Result<(), StoreError> {
        // Validate every recipient before crediting any of them.
        if let Some(missing) = distribution
            .member_dividends
            .keys()
            .find(|id| !self.members.contains_key(*id))
        {
            return Err(StoreError::MemberNotFound(missing.clone()));
        }

        for (id, amount) in &distribution.member_dividends {
            if let Some(member) = self.members.get_mut(id) {
                member.credit_dividend(*amount, distribution.distributed_at);
            }
        }
        self.distributions.push(distribution);
        Ok(())
    }

    fn distributions(&self) -> Result<Vec<DividendDistribution>, StoreError> {
        Ok(self.distributions.clone())
    }
}
