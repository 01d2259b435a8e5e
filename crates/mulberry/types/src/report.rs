use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contribution::{ContributionEvent, ContributionTotals};
use crate::distribution::{CategoryWeights, DistributionSummary};
use crate::ids::MemberId;
use crate::member::{CooperativeRole, Member};

/// Read-only snapshot of one member and their full contribution history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberReport {
    pub member_id: MemberId,
    pub agent_name: String,
    pub role: CooperativeRole,
    pub active: bool,
    pub metrics: ContributionTotals,
    pub total_dividends_received: f64,
    pub last_dividend_at: Option<DateTime<Utc>>,
    /// Every event for this member, in append order.
    pub contributions: Vec<ContributionEvent>,
}

impl MemberReport {
    pub fn new(member: &Member, contributions: Vec<ContributionEvent>) -> Self {
        Self {
            member_id: member.id.clone(),
            agent_name: member.agent_name.clone(),
            role: member.role,
            active: member.active,
            metrics: member.metrics(),
            total_dividends_received: member.total_dividends_received,
            last_dividend_at: member.last_dividend_at,
            contributions,
        }
    }

    /// The last `n` events, oldest first.
    pub fn recent_contributions(&self, n: usize) -> &[ContributionEvent] {
        let start = self.contributions.len().saturating_sub(n);
        &self.contributions[start..]
    }
}

/// Cooperative-wide counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CooperativeStats {
    pub total_members: usize,
    pub active_members: usize,
    pub total_contributions_logged: usize,
    /// Sum of `total_amount` over every run
    pub total_dividends_distributed: f64,
    pub weights: CategoryWeights,
    pub members_by_role: BTreeMap<CooperativeRole, usize>,
    /// Newest first
    pub recent_distributions: Vec<DistributionSummary>,
}
