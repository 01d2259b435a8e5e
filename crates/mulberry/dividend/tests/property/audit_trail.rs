//! Property tests: the contribution log is append-only and member aggregates
//! always equal its re-summation.

use mulberry_dividend::{
    AllocatorConfig, ContributionCategory, CooperativeRole, DividendAllocator, InMemoryMemberStore,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_category() -> impl Strategy<Value = ContributionCategory> {
    prop_oneof![
        Just(ContributionCategory::Marketing),
        Just(ContributionCategory::WorkHours),
        Just(ContributionCategory::Revenue),
    ]
}

/// (member index, category, amount); amount may be negative to exercise rejection.
fn arb_operation(members: usize) -> impl Strategy<Value = (usize, ContributionCategory, f64)> {
    (0..members, arb_category(), -50.0f64..500.0)
}

fn allocator() -> DividendAllocator<InMemoryMemberStore> {
    DividendAllocator::new(InMemoryMemberStore::new(), AllocatorConfig::default()).unwrap()
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// N marketing contributions leave N marketing events in call order and
    /// an aggregate equal to their sum.
    #[test]
    fn marketing_events_are_appended_in_order(
        amounts in prop::collection::vec(0.0f64..1_000.0, 1..40),
    ) {
        let mut alloc = allocator();
        let member = alloc.register_member("SNS_Manager", CooperativeRole::Marketer).unwrap();

        let mut recorded = Vec::new();
        for (i, amount) in amounts.iter().enumerate() {
            let event = alloc
                .record_contribution(&member.id, ContributionCategory::Marketing, *amount, format!("post {}", i))
                .unwrap();
            recorded.push(event);
        }

        let report = alloc.get_member_report(&member.id).unwrap();
        prop_assert_eq!(report.contributions.len(), amounts.len());
        prop_assert_eq!(&report.contributions, &recorded);
        for (event, amount) in report.contributions.iter().zip(&amounts) {
            prop_assert_eq!(event.category, ContributionCategory::Marketing);
            prop_assert_eq!(event.amount, *amount);
        }

        let expected: f64 = amounts.iter().sum();
        prop_assert_eq!(report.metrics.marketing, expected);
    }

    /// Mixed valid and invalid contributions across several members keep
    /// every aggregate equal to its event log; rejected ones leave no trace.
    #[test]
    fn aggregates_track_event_log(
        operations in prop::collection::vec(arb_operation(4), 0..60),
    ) {
        let mut alloc = allocator();
        let members: Vec<_> = (0..4)
            .map(|i| alloc.register_member(format!("agent-{}", i), CooperativeRole::Worker).unwrap())
            .collect();

        let mut accepted = 0usize;
        for (index, category, amount) in operations {
            let result = alloc.record_contribution(&members[index].id, category, amount, "op");
            if amount >= 0.0 {
                prop_assert!(result.is_ok());
                accepted += 1;
            } else {
                prop_assert!(result.is_err());
            }
        }

        prop_assert!(alloc.verify_ledger().is_ok());
        prop_assert_eq!(alloc.cooperative_stats().unwrap().total_contributions_logged, accepted);
    }

    /// Reports are stable between mutations, including after a settlement.
    #[test]
    fn reports_are_idempotent(
        operations in prop::collection::vec(arb_operation(3), 1..30),
        total in 0.0f64..1_000_000.0,
    ) {
        let mut alloc = allocator();
        let members: Vec<_> = (0..3)
            .map(|i| alloc.register_member(format!("agent-{}", i), CooperativeRole::Worker).unwrap())
            .collect();
        for (index, category, amount) in operations {
            let _ = alloc.record_contribution(&members[index].id, category, amount, "op");
        }
        alloc.calculate_dividends(total, None, None).unwrap();

        for member in &members {
            let first = alloc.get_member_report(&member.id).unwrap();
            let second = alloc.get_member_report(&member.id).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
