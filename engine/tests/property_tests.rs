//! Property tests for version comparison
//!
//! The version order is load-bearing in three places: install gating,
//! catalog compatibility filtering, and the version-descending sort of the
//! installed list. These properties pin down the comparison itself.

use proptest::prelude::*;
use sdk::helpers::compare_versions;
use std::cmp::Ordering;

fn version_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(0u64..1000, 1..5)
        .prop_map(|parts| {
            parts
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(".")
        })
}

proptest! {
    #[test]
    fn comparison_is_reflexive(v in version_strategy()) {
        prop_assert_eq!(compare_versions(&v, &v), Ordering::Equal);
    }

    #[test]
    fn comparison_is_antisymmetric(a in version_strategy(), b in version_strategy()) {
        prop_assert_eq!(compare_versions(&a, &b), compare_versions(&b, &a).reverse());
    }

    #[test]
    fn trailing_zero_components_do_not_change_order(
        a in version_strategy(),
        b in version_strategy(),
        pad in 1usize..4,
    ) {
        let padded = format!("{}{}", a, ".0".repeat(pad));
        prop_assert_eq!(compare_versions(&a, &padded), Ordering::Equal);
        prop_assert_eq!(compare_versions(&padded, &b), compare_versions(&a, &b));
    }

    #[test]
    fn order_matches_numeric_component_order(
        parts_a in proptest::collection::vec(0u64..1000, 1..5),
        parts_b in proptest::collection::vec(0u64..1000, 1..5),
    ) {
        let a = parts_a.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(".");
        let b = parts_b.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(".");

        // zero-pad both to the same length, then compare componentwise
        let len = parts_a.len().max(parts_b.len());
        let mut padded_a = parts_a.clone();
        padded_a.resize(len, 0);
        let mut padded_b = parts_b.clone();
        padded_b.resize(len, 0);

        prop_assert_eq!(compare_versions(&a, &b), padded_a.cmp(&padded_b));
    }

    #[test]
    fn bumping_the_major_component_always_wins(
        parts in proptest::collection::vec(0u64..1000, 1..5),
    ) {
        let version = parts.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(".");
        let bumped = {
            let mut bumped = parts.clone();
            bumped[0] += 1;
            bumped.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(".")
        };
        prop_assert_eq!(compare_versions(&bumped, &version), Ordering::Greater);
    }
}
