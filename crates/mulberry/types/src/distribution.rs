use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contribution::{ContributionCategory, ContributionTotals};
use crate::error::ParseError;
use crate::ids::{DistributionId, MemberId};

/// Share of each settlement payout assigned to each contribution category.
///
/// The three weights must sum to 1.0; the allocator refuses to start otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub marketing: f64,
    pub work_hours: f64,
    pub revenue: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            marketing: 0.45,
            work_hours: 0.30,
            revenue: 0.25,
        }
    }
}

impl CategoryWeights {
    pub fn get(&self, category: ContributionCategory) -> f64 {
        match category {
            ContributionCategory::Marketing => self.marketing,
            ContributionCategory::WorkHours => self.work_hours,
            ContributionCategory::Revenue => self.revenue,
        }
    }

    pub fn sum(&self) -> f64 {
        self.marketing + self.work_hours + self.revenue
    }
}

/// Which contribution figures a settlement run reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualBasis {
    /// Current member aggregates; the period is recorded but not applied.
    #[default]
    RunningTotals,
    /// Only events timestamped inside `[period_start, period_end]`.
    PeriodScoped,
}

impl AccrualBasis {
    pub fn as_str(self) -> &'static str {
        match self {
            AccrualBasis::RunningTotals => "running_totals",
            AccrualBasis::PeriodScoped => "period_scoped",
        }
    }
}

impl FromStr for AccrualBasis {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running_totals" => Ok(AccrualBasis::RunningTotals),
            "period_scoped" => Ok(AccrualBasis::PeriodScoped),
            other => Err(ParseError::UnknownAccrualBasis(other.to_string())),
        }
    }
}

/// How one member's dividend splits across categories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendBreakdown {
    /// Figures the shares were computed from
    pub basis: ContributionTotals,
    pub marketing_share: f64,
    pub work_share: f64,
    pub revenue_share: f64,
}

impl DividendBreakdown {
    pub fn share(&self, category: ContributionCategory) -> f64 {
        match category {
            ContributionCategory::Marketing => self.marketing_share,
            ContributionCategory::WorkHours => self.work_share,
            ContributionCategory::Revenue => self.revenue_share,
        }
    }

    pub fn total(&self) -> f64 {
        self.marketing_share + self.work_share + self.revenue_share
    }
}

/// Result of one settlement run. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DividendDistribution {
    pub id: DistributionId,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_amount: f64,
    pub member_dividends: BTreeMap<MemberId, f64>,
    pub breakdown: BTreeMap<MemberId, DividendBreakdown>,
    /// Category totals across the active pool at calculation time
    pub pool_totals: ContributionTotals,
    pub weights: CategoryWeights,
    pub accrual_basis: AccrualBasis,
    pub distributed_at: DateTime<Utc>,
}

impl DividendDistribution {
    /// Sum actually handed out. Below `total_amount` when a category had no
    /// contributions across the pool.
    pub fn distributed_total(&self) -> f64 {
        self.member_dividends.values().sum()
    }

    /// `total_amount - distributed_total()`.
    pub fn undistributed(&self) -> f64 {
        self.total_amount - self.distributed_total()
    }

    pub fn dividend_for(&self, member: &MemberId) -> Option<f64> {
        self.member_dividends.get(member).copied()
    }

    pub fn summary(&self) -> DistributionSummary {
        DistributionSummary {
            id: self.id.clone(),
            total_amount: self.total_amount,
            distributed_total: self.distributed_total(),
            recipients: self.member_dividends.len(),
            period_start: self.period_start,
            period_end: self.period_end,
            distributed_at: self.distributed_at,
        }
    }
}

/// Condensed view of a distribution for stats listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub id: DistributionId,
    pub total_amount: f64,
    pub distributed_total: f64,
    pub recipients: usize,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub distributed_at: DateTime<Utc>,
}

impl DistributionSummary {
    /// `YYYY-MM-DD ~ YYYY-MM-DD`
    pub fn period_label(&self) -> String {
        format!(
            "{} ~ {}",
            self.period_start.format("%Y-%m-%d"),
            self.period_end.format("%Y-%m-%d")
        )
    }
}
