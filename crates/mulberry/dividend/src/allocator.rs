use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use mulberry_types::{
    AccrualBasis, CategoryWeights, ContributionCategory, ContributionEvent, ContributionId,
    ContributionTotals, CooperativeRole, DistributionId, DividendBreakdown, DividendDistribution,
    Member, MemberId,
};
use tracing::{debug, info, warn};

use crate::config::{validate_weights, AllocatorConfig};
use crate::error::{DividendError, DividendResult};
use crate::store::MemberStore;

/// Contribution-weighted dividend allocator.
///
/// Owns a [`MemberStore`] and splits settlement payouts across the active
/// members of that pool. Each category's slice of the payout
/// (`total × weight`) is divided in proportion to the members' figures in
/// that category. A category with no contributions across the pool pays out
/// nothing, so the distributed sum can fall short of the requested total.
///
/// All operations validate before they mutate. A returned error means the
/// pool is exactly as it was before the call.
pub struct DividendAllocator<S: MemberStore> {
    store: S,
    config: AllocatorConfig,
}

/// Result of splitting one payout, before anything is committed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Allocation {
    pub pool_totals: ContributionTotals,
    pub member_dividends: BTreeMap<MemberId, f64>,
    pub breakdown: BTreeMap<MemberId, DividendBreakdown>,
}

/// Split `total_amount` across `pool` using `weights`.
///
/// `pool` pairs each eligible member with the figures to allocate on; the
/// caller decides whether those are running totals or period sums.
pub fn allocate(
    total_amount: f64,
    weights: &CategoryWeights,
    pool: &[(MemberId, ContributionTotals)],
) -> Allocation {
    let mut pool_totals = ContributionTotals::default();
    for (_, figures) in pool {
        pool_totals.accumulate(figures);
    }

    let share_of = |category: ContributionCategory, figures: &ContributionTotals| -> f64 {
        let category_total = pool_totals.get(category);
        if category_total > 0.0 {
            // Ratio first: it never exceeds 1, so the share stays within the slice.
            total_amount * weights.get(category) * (figures.get(category) / category_total)
        } else {
            0.0
        }
    };

    let mut allocation = Allocation {
        pool_totals,
        ..Allocation::default()
    };

    for (member_id, figures) in pool {
        let breakdown = DividendBreakdown {
            basis: *figures,
            marketing_share: share_of(ContributionCategory::Marketing, figures),
            work_share: share_of(ContributionCategory::WorkHours, figures),
            revenue_share: share_of(ContributionCategory::Revenue, figures),
        };
        allocation
            .member_dividends
            .insert(member_id.clone(), breakdown.total());
        allocation.breakdown.insert(member_id.clone(), breakdown);
    }

    allocation
}

fn check_amount(amount: f64, context: &'static str) -> DividendResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        warn!(amount, context, "Rejected invalid amount");
        return Err(DividendError::InvalidAmount { amount, context });
    }
    Ok(())
}

impl<S: MemberStore> DividendAllocator<S> {
    /// Create an allocator over `store`. Fails if the configuration is invalid.
    pub fn new(store: S, config: AllocatorConfig) -> DividendResult<Self> {
        config.validate()?;
        info!(
            marketing = config.weights.marketing,
            work_hours = config.weights.work_hours,
            revenue = config.weights.revenue,
            basis = config.accrual_basis.as_str(),
            "Dividend allocator initialized"
        );
        Ok(Self { store, config })
    }

    /// Create an allocator with default configuration and custom weights.
    pub fn with_weights(store: S, weights: CategoryWeights) -> DividendResult<Self> {
        validate_weights(&weights)?;
        Self::new(store, AllocatorConfig::default().with_weights(weights))
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    pub fn weights(&self) -> &CategoryWeights {
        &self.config.weights
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ── Membership ─────────────────────────────────────────────────────

    /// Register a new active member with no contributions.
    pub fn register_member(
        &mut self,
        agent_name: impl Into<String>,
        role: CooperativeRole,
    ) -> DividendResult<Member> {
        self.register_member_with_id(MemberId::generate(), agent_name, role)
    }

    /// Register a member under a caller-chosen id.
    pub fn register_member_with_id(
        &mut self,
        id: MemberId,
        agent_name: impl Into<String>,
        role: CooperativeRole,
    ) -> DividendResult<Member> {
        let member = Member::new(id, agent_name, role);
        self.store
            .insert_member(member.clone())
            .map_err(DividendError::from_store)?;

        info!(member = %member.id, name = %member.agent_name, role = %role, "Member added");
        Ok(member)
    }

    /// Re-admit a member loaded from persistent storage together with its
    /// event history.
    ///
    /// The history must re-sum to the member's stored aggregates. The store
    /// rebuilds the aggregates from the history in the same call that inserts
    /// the member, so the event log stays the source of truth.
    pub fn restore_member(
        &mut self,
        member: Member,
        history: Vec<ContributionEvent>,
    ) -> DividendResult<Member> {
        if self
            .store
            .member(&member.id)
            .map_err(DividendError::from_store)?
            .is_some()
        {
            return Err(DividendError::DuplicateMember(member.id));
        }
        check_amount(member.total_dividends_received, "restored dividend total")?;
        for event in &history {
            if event.member_id != member.id {
                return Err(DividendError::UnknownMember(event.member_id.clone()));
            }
            check_amount(event.amount, "restored contribution")?;
        }
        crate::audit::compare_aggregates(&member, &ContributionTotals::from_events(&history))?;
        let pool = self.store.members().map_err(DividendError::from_store)?;
        for category in ContributionCategory::ALL {
            let pool_total =
                pool.iter().map(|m| m.metric(category)).sum::<f64>() + member.metric(category);
            if !pool_total.is_finite() {
                return Err(DividendError::InvalidAmount {
                    amount: member.metric(category),
                    context: "restored aggregate",
                });
            }
        }

        let restored = self
            .store
            .insert_member_with_history(member, history)
            .map_err(DividendError::from_store)?;

        debug!(member = %restored.id, "Member restored from storage");
        Ok(restored)
    }

    /// Include or exclude a member from future settlement runs.
    pub fn set_member_active(&mut self, member_id: &MemberId, active: bool) -> DividendResult<Member> {
        let member = self
            .store
            .set_active(member_id, active)
            .map_err(DividendError::from_store)?;
        info!(member = %member_id, active, "Member eligibility changed");
        Ok(member)
    }

    // ── Contributions ──────────────────────────────────────────────────

    /// Append a contribution event and bump the member's aggregate.
    pub fn record_contribution(
        &mut self,
        member_id: &MemberId,
        category: ContributionCategory,
        amount: f64,
        description: impl Into<String>,
    ) -> DividendResult<ContributionEvent> {
        self.record_contribution_at(member_id, category, amount, description, Utc::now())
    }

    /// [`record_contribution`](Self::record_contribution) with an explicit timestamp.
    pub fn record_contribution_at(
        &mut self,
        member_id: &MemberId,
        category: ContributionCategory,
        amount: f64,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> DividendResult<ContributionEvent> {
        check_amount(amount, "contribution")?;
        self.check_pool_headroom(member_id, category, amount)?;

        let event = ContributionEvent {
            id: ContributionId::generate(),
            member_id: member_id.clone(),
            category,
            amount,
            description: description.into(),
            timestamp,
        };

        let member = self
            .store
            .append_contribution(event.clone())
            .map_err(DividendError::from_store)?;

        info!(
            member = %member_id,
            name = %member.agent_name,
            category = %category,
            amount,
            "Contribution logged"
        );
        Ok(event)
    }

    /// Reject a contribution that would push the pool-wide total of its
    /// category past the range of `f64`. Member aggregates and every
    /// settlement's category totals are bounded by that figure.
    fn check_pool_headroom(
        &self,
        member_id: &MemberId,
        category: ContributionCategory,
        amount: f64,
    ) -> DividendResult<()> {
        let members = self.store.members().map_err(DividendError::from_store)?;
        if !members.iter().any(|m| &m.id == member_id) {
            return Err(DividendError::UnknownMember(member_id.clone()));
        }
        let pool_total = members.iter().map(|m| m.metric(category)).sum::<f64>() + amount;
        if !pool_total.is_finite() {
            warn!(member = %member_id, category = %category, amount, "Contribution overflows pool total");
            return Err(DividendError::InvalidAmount {
                amount,
                context: "contribution aggregate",
            });
        }
        Ok(())
    }

    // ── Settlement ─────────────────────────────────────────────────────

    /// Run a settlement: split `total_amount` across active members, credit
    /// their running totals and append the distribution to history.
    ///
    /// A missing `period_end` defaults to now, a missing `period_start` to
    /// `default_period_days` before the end.
    pub fn calculate_dividends(
        &mut self,
        total_amount: f64,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
    ) -> DividendResult<DividendDistribution> {
        self.calculate_dividends_at(total_amount, period_start, period_end, Utc::now())
    }

    /// [`calculate_dividends`](Self::calculate_dividends) with an explicit
    /// settlement time.
    pub fn calculate_dividends_at(
        &mut self,
        total_amount: f64,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DividendResult<DividendDistribution> {
        let distribution = self.preview_dividends_at(total_amount, period_start, period_end, now)?;
        self.check_credits(&distribution)?;

        self.store
            .commit_distribution(distribution.clone())
            .map_err(DividendError::from_store)?;

        info!(
            distribution = %distribution.id,
            total = total_amount,
            distributed = distribution.distributed_total(),
            recipients = distribution.member_dividends.len(),
            "Dividends calculated"
        );
        Ok(distribution)
    }

    /// Compute the distribution a settlement would produce without
    /// committing it.
    pub fn preview_dividends(
        &self,
        total_amount: f64,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
    ) -> DividendResult<DividendDistribution> {
        self.preview_dividends_at(total_amount, period_start, period_end, Utc::now())
    }

    fn preview_dividends_at(
        &self,
        total_amount: f64,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DividendResult<DividendDistribution> {
        check_amount(total_amount, "settlement total")?;

        let end = period_end.unwrap_or(now);
        let start =
            period_start.unwrap_or_else(|| end - Duration::days(self.config.default_period_days));
        if start > end {
            warn!(%start, %end, "Rejected inverted settlement period");
            return Err(DividendError::InvalidPeriod { start, end });
        }

        let pool = self.eligible_pool(start, end)?;
        if pool.is_empty() {
            warn!("No active members; distribution will be empty");
        }

        let allocation = allocate(total_amount, &self.config.weights, &pool);
        debug!(
            marketing = allocation.pool_totals.marketing,
            work_hours = allocation.pool_totals.work_hours,
            revenue = allocation.pool_totals.revenue,
            "Pool category totals"
        );
        for (member_id, amount) in &allocation.member_dividends {
            debug!(member = %member_id, amount, "Member dividend");
        }

        Ok(DividendDistribution {
            id: DistributionId::generate(),
            period_start: start,
            period_end: end,
            total_amount,
            member_dividends: allocation.member_dividends,
            breakdown: allocation.breakdown,
            pool_totals: allocation.pool_totals,
            weights: self.config.weights,
            accrual_basis: self.config.accrual_basis,
            distributed_at: now,
        })
    }

    /// Every share must be finite and leave each recipient's running
    /// dividend total finite.
    fn check_credits(&self, distribution: &DividendDistribution) -> DividendResult<()> {
        for (member_id, amount) in &distribution.member_dividends {
            check_amount(*amount, "dividend share")?;
            let received = self
                .store
                .member(member_id)
                .map_err(DividendError::from_store)?
                .ok_or_else(|| DividendError::UnknownMember(member_id.clone()))?
                .total_dividends_received;
            if !(received + amount).is_finite() {
                warn!(member = %member_id, amount, received, "Dividend credit overflows running total");
                return Err(DividendError::InvalidAmount {
                    amount: *amount,
                    context: "dividend total",
                });
            }
        }
        Ok(())
    }

    /// Active members paired with the figures this run allocates on.
    fn eligible_pool(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DividendResult<Vec<(MemberId, ContributionTotals)>> {
        let active: Vec<Member> = self
            .store
            .members()
            .map_err(DividendError::from_store)?
            .into_iter()
            .filter(|m| m.active)
            .collect();

        match self.config.accrual_basis {
            AccrualBasis::RunningTotals => Ok(active
                .into_iter()
                .map(|m| {
                    let figures = m.metrics();
                    (m.id, figures)
                })
                .collect()),
            AccrualBasis::PeriodScoped => {
                let mut in_period: HashMap<MemberId, ContributionTotals> = HashMap::new();
                for event in self
                    .store
                    .contributions()
                    .map_err(DividendError::from_store)?
                {
                    if event.timestamp >= start && event.timestamp <= end {
                        in_period
                            .entry(event.member_id.clone())
                            .or_default()
                            .add(event.category, event.amount);
                    }
                }
                Ok(active
                    .into_iter()
                    .map(|m| {
                        let figures = in_period.remove(&m.id).unwrap_or_default();
                        (m.id, figures)
                    })
                    .collect())
            }
        }
    }

    /// Every distribution committed so far, oldest first.
    pub fn distribution_history(&self) -> DividendResult<Vec<DividendDistribution>> {
        self.store.distributions().map_err(DividendError::from_store)
    }
}
