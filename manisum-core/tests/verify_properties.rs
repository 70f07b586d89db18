use manisum_core::{verify, Manifest};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn manifest() -> impl Strategy<Value = Manifest> {
    // Small key and digest alphabets so the two sides overlap often.
    proptest::collection::btree_map("[a-e]{1,2}", "[0-2]", 0..12)
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn swapping_sides_swaps_extra_and_missing(a in manifest(), b in manifest()) {
        let ab = verify(&a, &b);
        let ba = verify(&b, &a);
        prop_assert_eq!(&ab.extra_files, &ba.missing_files);
        prop_assert_eq!(&ab.missing_files, &ba.extra_files);
        let ab_keys: Vec<_> = ab.mismatched_paths().collect();
        let ba_keys: Vec<_> = ba.mismatched_paths().collect();
        prop_assert_eq!(ab_keys, ba_keys);
        for (x, y) in ab.mismatched_files.iter().zip(&ba.mismatched_files) {
            prop_assert_eq!(&x.computed, &y.recorded);
            prop_assert_eq!(&x.recorded, &y.computed);
        }
    }

    #[test]
    fn clean_iff_equal(a in manifest(), b in manifest()) {
        prop_assert_eq!(verify(&a, &b).is_clean(), a == b);
        prop_assert!(verify(&a, &a).is_clean());
    }

    #[test]
    fn lists_are_disjoint_and_cover_the_union(a in manifest(), b in manifest()) {
        let r = verify(&a, &b);
        let extra: BTreeSet<_> = r.extra_files.iter().map(String::as_str).collect();
        let missing: BTreeSet<_> = r.missing_files.iter().map(String::as_str).collect();
        let mismatched: BTreeSet<_> = r.mismatched_paths().collect();
        prop_assert!(extra.is_disjoint(&missing));
        prop_assert!(extra.is_disjoint(&mismatched));
        prop_assert!(missing.is_disjoint(&mismatched));
        let union: BTreeSet<_> = a.paths().chain(b.paths()).collect();
        prop_assert_eq!(extra.len() + missing.len() + mismatched.len() + r.files_ok, union.len());
    }
}

#[test]
fn extra_missing_scenario() {
    let computed: Manifest = [("a.txt", "111"), ("b.txt", "222")].into_iter().collect();
    let recorded: Manifest = [("a.txt", "111"), ("c.txt", "333")].into_iter().collect();
    let r = verify(&computed, &recorded);
    assert_eq!(r.extra_files, vec!["c.txt"]);
    assert_eq!(r.missing_files, vec!["b.txt"]);
    assert!(r.mismatched_files.is_empty());
    assert!(!r.is_clean());
}
