//! Property tests: a settlement hands out exactly the weighted slices of the
//! payout that have contributors, in proportion to each member's figures.

use mulberry_dividend::{
    allocate, validate_weights, CategoryWeights, ContributionTotals, DividendError, MemberId,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= 1e-6 * expected.abs().max(1.0)
}

/// Figures with every category strictly positive.
fn arb_positive_figures() -> impl Strategy<Value = ContributionTotals> {
    (0.5f64..1_000.0, 0.5f64..200.0, 1.0f64..10_000_000.0).prop_map(
        |(marketing, work_hours, revenue)| ContributionTotals {
            marketing,
            work_hours,
            revenue,
        },
    )
}

/// Figures where any category may be zero.
fn arb_figures() -> impl Strategy<Value = ContributionTotals> {
    (
        prop_oneof![Just(0.0), 0.5f64..1_000.0],
        prop_oneof![Just(0.0), 0.5f64..200.0],
        prop_oneof![Just(0.0), 1.0f64..10_000_000.0],
    )
        .prop_map(|(marketing, work_hours, revenue)| ContributionTotals {
            marketing,
            work_hours,
            revenue,
        })
}

fn pool_of(figures: Vec<ContributionTotals>) -> Vec<(MemberId, ContributionTotals)> {
    figures
        .into_iter()
        .enumerate()
        .map(|(i, f)| (MemberId::new(format!("M{}", i)), f))
        .collect()
}

/// Weights that sum to 1.0 by construction.
fn arb_weights() -> impl Strategy<Value = CategoryWeights> {
    (0u32..=100, 0u32..=100).prop_map(|(a, b)| {
        let marketing = a as f64 / 100.0;
        let work_hours = b.min(100 - a) as f64 / 100.0;
        CategoryWeights {
            marketing,
            work_hours,
            revenue: 1.0 - marketing - work_hours,
        }
    })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// With every category contributed to, the whole payout is distributed.
    #[test]
    fn full_pool_conserves_total(
        figures in prop::collection::vec(arb_positive_figures(), 1..12),
        total in 0.0f64..100_000_000.0,
    ) {
        let allocation = allocate(total, &CategoryWeights::default(), &pool_of(figures));
        let distributed: f64 = allocation.member_dividends.values().sum();
        prop_assert!(close(distributed, total), "distributed {} of {}", distributed, total);
    }

    /// Empty categories forfeit exactly their weight.
    #[test]
    fn distributed_sum_matches_live_category_weights(
        figures in prop::collection::vec(arb_figures(), 1..12),
        total in 0.0f64..100_000_000.0,
        weights in arb_weights(),
    ) {
        let allocation = allocate(total, &weights, &pool_of(figures));
        let live_weight: f64 = [
            (allocation.pool_totals.marketing, weights.marketing),
            (allocation.pool_totals.work_hours, weights.work_hours),
            (allocation.pool_totals.revenue, weights.revenue),
        ]
        .iter()
        .filter(|(category_total, _)| *category_total > 0.0)
        .map(|(_, weight)| weight)
        .sum();

        let distributed: f64 = allocation.member_dividends.values().sum();
        prop_assert!(close(distributed, total * live_weight));
    }

    /// Twice the marketing score earns twice the marketing share.
    #[test]
    fn marketing_share_is_proportional(
        score in 0.5f64..10_000.0,
        total in 1.0f64..10_000_000.0,
    ) {
        let pool = vec![
            (MemberId::new("A"), ContributionTotals { marketing: 2.0 * score, ..Default::default() }),
            (MemberId::new("B"), ContributionTotals { marketing: score, ..Default::default() }),
        ];
        let allocation = allocate(total, &CategoryWeights::default(), &pool);
        let a = allocation.breakdown[&MemberId::new("A")];
        let b = allocation.breakdown[&MemberId::new("B")];

        prop_assert!(close(a.marketing_share, 2.0 * b.marketing_share));
        prop_assert_eq!(a.work_share, 0.0);
        prop_assert_eq!(b.revenue_share, 0.0);
    }

    /// No member ever receives a negative dividend.
    #[test]
    fn dividends_are_non_negative(
        figures in prop::collection::vec(arb_figures(), 0..12),
        total in 0.0f64..100_000_000.0,
    ) {
        let allocation = allocate(total, &CategoryWeights::default(), &pool_of(figures));
        for amount in allocation.member_dividends.values() {
            prop_assert!(*amount >= 0.0);
        }
    }

    /// Weights off 1.0 by more than the tolerance never validate.
    #[test]
    fn unbalanced_weights_are_rejected(
        marketing in 0.0f64..1.0,
        work_hours in 0.0f64..1.0,
        revenue in 0.0f64..1.0,
    ) {
        let weights = CategoryWeights { marketing, work_hours, revenue };
        let result = validate_weights(&weights);
        if (weights.sum() - 1.0).abs() > 1e-9 {
            let rejected = matches!(result, Err(DividendError::InvalidWeightConfiguration { .. }));
            prop_assert!(rejected);
        } else {
            prop_assert!(result.is_ok());
        }
    }
}
