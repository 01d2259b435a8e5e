//! Ledger consistency checks.
//!
//! Member aggregates are a cache of the contribution log. These checks replay
//! the log and compare.

use std::collections::HashMap;

use mulberry_types::{ContributionCategory, ContributionTotals, Member, MemberId};
use tracing::{debug, warn};

use crate::allocator::DividendAllocator;
use crate::error::{DividendError, DividendResult};
use crate::store::MemberStore;

/// Relative tolerance for float re-summation drift.
const REPLAY_TOLERANCE: f64 = 1e-9;

fn close_enough(cached: f64, replayed: f64) -> bool {
    (cached - replayed).abs() <= REPLAY_TOLERANCE * cached.abs().max(replayed.abs()).max(1.0)
}

/// Compare a member's cached aggregates against re-summed figures.
pub(crate) fn compare_aggregates(member: &Member, replayed: &ContributionTotals) -> DividendResult<()> {
    for category in ContributionCategory::ALL {
        let cached = member.metric(category);
        let replayed = replayed.get(category);
        if !close_enough(cached, replayed) {
            warn!(member = %member.id, category = %category, cached, replayed, "Aggregate drift detected");
            return Err(DividendError::AggregateMismatch {
                member: member.id.clone(),
                category,
                cached,
                replayed,
            });
        }
    }
    Ok(())
}

impl<S: MemberStore> DividendAllocator<S> {
    /// Replay the contribution log and check it against every member's cached
    /// aggregates.
    pub fn verify_ledger(&self) -> DividendResult<()> {
        let members = self.store().members().map_err(DividendError::from_store)?;
        let events = self
            .store()
            .contributions()
            .map_err(DividendError::from_store)?;

        let mut replayed: HashMap<MemberId, ContributionTotals> = HashMap::new();
        for event in &events {
            if !members.iter().any(|m| m.id == event.member_id) {
                return Err(DividendError::UnknownMember(event.member_id.clone()));
            }
            replayed
                .entry(event.member_id.clone())
                .or_default()
                .add(event.category, event.amount);
        }

        for member in &members {
            let totals = replayed.remove(&member.id).unwrap_or_default();
            compare_aggregates(member, &totals)?;
        }

        debug!(members = members.len(), events = events.len(), "Ledger verified");
        Ok(())
    }
}
