//! Property tests for behavior vectorization.

use chrono::{Duration, TimeZone, Utc};
use intentum_core::{BehaviorEvent, BehaviorSpace, ToVectorOptions};
use proptest::prelude::*;

fn base() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

proptest! {
    #[test]
    fn distinct_pairs_give_one_dimension_each(n in 1usize..40) {
        let mut space = BehaviorSpace::new();
        for i in 0..n {
            space.observe(BehaviorEvent::new(format!("actor{i}"), "act", base()));
        }
        let v = space.to_vector();
        prop_assert_eq!(v.len(), n);
        prop_assert!(v.iter().all(|(_, value)| value == 1.0));
    }

    #[test]
    fn repeated_pair_counts_up(m in 1usize..60) {
        let mut space = BehaviorSpace::new();
        for i in 0..m {
            let at = base() + Duration::seconds(i as i64);
            space.observe(BehaviorEvent::new("user", "retry", at));
        }
        let v = space.to_vector();
        prop_assert_eq!(v.len(), 1);
        prop_assert_eq!(v.get("user:retry"), Some(m as f64));
    }

    #[test]
    fn l1_sums_to_one(pairs in proptest::collection::vec((0u8..5, 0u8..5), 1..50)) {
        let mut space = BehaviorSpace::new();
        for (a, b) in &pairs {
            space.observe(BehaviorEvent::new(format!("a{a}"), format!("b{b}"), base()));
        }
        let v = space.to_vector_with(&ToVectorOptions::l1());
        prop_assert!((v.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dimensions_never_exceed_distinct_pairs(
        pairs in proptest::collection::vec((0u8..4, 0u8..4, 0i64..100), 0..50),
        lo in 0i64..100,
        span in 0i64..100,
    ) {
        let mut space = BehaviorSpace::new();
        let mut distinct = std::collections::BTreeSet::new();
        for (a, b, t) in &pairs {
            distinct.insert((*a, *b));
            let at = base() + Duration::seconds(*t);
            space.observe(BehaviorEvent::new(format!("a{a}"), format!("b{b}"), at));
        }
        prop_assert_eq!(space.to_vector().len(), distinct.len());
        let windowed = space.to_vector_in_window(
            base() + Duration::seconds(lo),
            base() + Duration::seconds(lo + span),
            None,
        );
        prop_assert!(windowed.len() <= distinct.len());
    }

    #[test]
    fn soft_cap_stays_in_unit_range(count in 1usize..30, cap in 0.5f64..10.0) {
        let mut space = BehaviorSpace::new();
        for _ in 0..count {
            space.observe(BehaviorEvent::new("u", "x", base()));
        }
        let v = space.to_vector_with(&ToVectorOptions::soft_cap(cap));
        prop_assert!(v.iter().all(|(_, value)| (0.0..=1.0).contains(&value)));
    }
}
