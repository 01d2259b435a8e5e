use std::collections::BTreeMap;

use mulberry_types::{CooperativeStats, MemberId, MemberReport};

use crate::allocator::DividendAllocator;
use crate::error::{DividendError, DividendResult};
use crate::store::MemberStore;

impl<S: MemberStore> DividendAllocator<S> {
    /// Current aggregates, dividends received and full contribution history
    /// for one member. Read-only.
    pub fn get_member_report(&self, member_id: &MemberId) -> DividendResult<MemberReport> {
        let member = self
            .store()
            .member(member_id)
            .map_err(DividendError::from_store)?
            .ok_or_else(|| DividendError::UnknownMember(member_id.clone()))?;
        let contributions = self
            .store()
            .contributions_for(member_id)
            .map_err(DividendError::from_store)?;

        Ok(MemberReport::new(&member, contributions))
    }

    /// Cooperative-wide counters and the most recent distributions.
    pub fn cooperative_stats(&self) -> DividendResult<CooperativeStats> {
        let members = self.store().members().map_err(DividendError::from_store)?;
        let contributions = self
            .store()
            .contributions()
            .map_err(DividendError::from_store)?;
        let distributions = self.distribution_history()?;

        let mut members_by_role = BTreeMap::new();
        for member in &members {
            *members_by_role.entry(member.role).or_insert(0) += 1;
        }

        let mut recent: Vec<_> = distributions.iter().map(|d| d.summary()).collect();
        // Stable sort keeps append order among runs sharing a timestamp.
        recent.sort_by(|a, b| b.distributed_at.cmp(&a.distributed_at));
        recent.truncate(self.config().recent_distribution_limit);

        Ok(CooperativeStats {
            total_members: members.len(),
            active_members: members.iter().filter(|m| m.active).count(),
            total_contributions_logged: contributions.len(),
            total_dividends_distributed: distributions.iter().map(|d| d.total_amount).sum(),
            weights: *self.weights(),
            members_by_role,
            recent_distributions: recent,
        })
    }
}
