use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::ids::{ContributionId, MemberId};

/// One of the three tracked dimensions of member effort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionCategory {
    /// Posts, campaigns, reach (unitless score)
    Marketing,
    /// Logged work sessions (hours)
    WorkHours,
    /// Sales attributed to the member (currency)
    Revenue,
}

impl ContributionCategory {
    pub const ALL: [ContributionCategory; 3] = [
        ContributionCategory::Marketing,
        ContributionCategory::WorkHours,
        ContributionCategory::Revenue,
    ];

    /// Persisted column value.
    pub fn as_str(self) -> &'static str {
        match self {
            ContributionCategory::Marketing => "marketing",
            ContributionCategory::WorkHours => "work_hours",
            ContributionCategory::Revenue => "revenue",
        }
    }
}

impl FromStr for ContributionCategory {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marketing" => Ok(ContributionCategory::Marketing),
            "work_hours" => Ok(ContributionCategory::WorkHours),
            "revenue" => Ok(ContributionCategory::Revenue),
            other => Err(ParseError::UnknownCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for ContributionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category amounts. Used for member aggregates, pool totals and
/// period-scoped re-summations alike.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionTotals {
    pub marketing: f64,
    pub work_hours: f64,
    pub revenue: f64,
}

impl ContributionTotals {
    pub fn get(&self, category: ContributionCategory) -> f64 {
        match category {
            ContributionCategory::Marketing => self.marketing,
            ContributionCategory::WorkHours => self.work_hours,
            ContributionCategory::Revenue => self.revenue,
        }
    }

    pub fn add(&mut self, category: ContributionCategory, amount: f64) {
        match category {
            ContributionCategory::Marketing => self.marketing += amount,
            ContributionCategory::WorkHours => self.work_hours += amount,
            ContributionCategory::Revenue => self.revenue += amount,
        }
    }

    /// Element-wise sum.
    pub fn accumulate(&mut self, other: &ContributionTotals) {
        for category in ContributionCategory::ALL {
            self.add(category, other.get(category));
        }
    }

    /// Re-sum a slice of events into per-category totals.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a ContributionEvent>) -> Self {
        let mut totals = Self::default();
        for event in events {
            totals.add(event.category, event.amount);
        }
        totals
    }
}

/// Immutable record of one contribution increment. Never mutated or deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContributionEvent {
    pub id: ContributionId,
    pub member_id: MemberId,
    pub category: ContributionCategory,
    pub amount: f64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}
