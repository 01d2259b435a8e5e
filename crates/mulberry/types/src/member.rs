use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contribution::{ContributionCategory, ContributionTotals};
use crate::error::ParseError;
use crate::ids::MemberId;

/// Role a member plays in the cooperative. Informational only; the
/// allocation never looks at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooperativeRole {
    Marketer,
    Worker,
    RevenueGenerator,
    Coordinator,
    Guardian,
}

impl CooperativeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            CooperativeRole::Marketer => "marketer",
            CooperativeRole::Worker => "worker",
            CooperativeRole::RevenueGenerator => "revenue_generator",
            CooperativeRole::Coordinator => "coordinator",
            CooperativeRole::Guardian => "guardian",
        }
    }
}

impl FromStr for CooperativeRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marketer" => Ok(CooperativeRole::Marketer),
            "worker" => Ok(CooperativeRole::Worker),
            "revenue_generator" => Ok(CooperativeRole::RevenueGenerator),
            "coordinator" => Ok(CooperativeRole::Coordinator),
            "guardian" => Ok(CooperativeRole::Guardian),
            other => Err(ParseError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for CooperativeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant in the allocation pool.
///
/// The three contribution metrics are a cache of the member's event log:
/// re-summing the log must reproduce them exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub agent_name: String,
    pub role: CooperativeRole,
    pub marketing_score: f64,
    pub work_hours: f64,
    pub revenue_generated: f64,
    /// Running total of every dividend ever paid. Never decreases.
    pub total_dividends_received: f64,
    pub last_dividend_at: Option<DateTime<Utc>>,
    /// Inactive members keep their history but are skipped by new runs.
    pub active: bool,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    /// A fresh active member with no contributions.
    pub fn new(id: MemberId, agent_name: impl Into<String>, role: CooperativeRole) -> Self {
        Self {
            id,
            agent_name: agent_name.into(),
            role,
            marketing_score: 0.0,
            work_hours: 0.0,
            revenue_generated: 0.0,
            total_dividends_received: 0.0,
            last_dividend_at: None,
            active: true,
            joined_at: Utc::now(),
        }
    }

    /// Current aggregates as a [`ContributionTotals`].
    pub fn metrics(&self) -> ContributionTotals {
        ContributionTotals {
            marketing: self.marketing_score,
            work_hours: self.work_hours,
            revenue: self.revenue_generated,
        }
    }

    pub fn metric(&self, category: ContributionCategory) -> f64 {
        match category {
            ContributionCategory::Marketing => self.marketing_score,
            ContributionCategory::WorkHours => self.work_hours,
            ContributionCategory::Revenue => self.revenue_generated,
        }
    }

    /// Bump the aggregate for `category`. Callers validate `amount` first.
    pub fn apply_contribution(&mut self, category: ContributionCategory, amount: f64) {
        match category {
            ContributionCategory::Marketing => self.marketing_score += amount,
            ContributionCategory::WorkHours => self.work_hours += amount,
            ContributionCategory::Revenue => self.revenue_generated += amount,
        }
    }

    pub fn credit_dividend(&mut self, amount: f64, at: DateTime<Utc>) {
        self.total_dividends_received += amount;
        self.last_dividend_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_codec() {
        let roles = [
            CooperativeRole::Marketer,
            CooperativeRole::Worker,
            CooperativeRole::RevenueGenerator,
            CooperativeRole::Coordinator,
            CooperativeRole::Guardian,
        ];
        for role in roles {
            assert_eq!(role.as_str().parse::<CooperativeRole>().unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
        assert!(matches!(
            "mayor".parse::<CooperativeRole>(),
            Err(ParseError::UnknownRole(_))
        ));
    }

    #[test]
    fn new_member_is_active_and_empty() {
        let m = Member::new(MemberId::new("M1"), "SNS_Manager", CooperativeRole::Marketer);
        assert!(m.active);
        assert_eq!(m.metrics(), ContributionTotals::default());
        assert_eq!(m.total_dividends_received, 0.0);
        assert!(m.last_dividend_at.is_none());
    }

    #[test]
    fn apply_contribution_targets_one_metric() {
        let mut m = Member::new(MemberId::new("M1"), "Sales_Agent", CooperativeRole::RevenueGenerator);
        m.apply_contribution(ContributionCategory::Revenue, 5_000_000.0);
        m.apply_contribution(ContributionCategory::WorkHours, 12.0);
        assert_eq!(m.revenue_generated, 5_000_000.0);
        assert_eq!(m.work_hours, 12.0);
        assert_eq!(m.marketing_score, 0.0);
        assert_eq!(m.metric(ContributionCategory::Revenue), 5_000_000.0);
    }

    #[test]
    fn credit_dividend_accumulates() {
        let mut m = Member::new(MemberId::new("M1"), "Worker", CooperativeRole::Worker);
        let at = Utc::now();
        m.credit_dividend(100.0, at);
        m.credit_dividend(50.0, at);
        assert_eq!(m.total_dividends_received, 150.0);
        assert_eq!(m.last_dividend_at, Some(at));
    }
}
