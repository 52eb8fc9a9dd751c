//! Property-based tests for the merge engine
//!
//! Uses proptest to verify the merge invariants across randomly generated
//! grouped record collections: idempotence, associativity, and identity
//! preservation.

use newsvault::{merge, ArticleRecord, GroupedRecords};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Generate a small article record
///
/// Field alphabets are kept tiny on purpose so that identity collisions
/// (the interesting case for dedup) actually occur.
fn record_strategy() -> impl Strategy<Value = ArticleRecord> {
    (
        "[a-c]{1,3}",
        "[a-c]{1,3}",
        "[a-c]{1,3}",
        prop::collection::vec("[a-z]{1,4}\\.jpg", 0..3),
    )
        .prop_map(|(topic, url, article, images)| ArticleRecord {
            topic,
            url: format!("https://example.com/{url}"),
            article,
            images,
        })
}

/// Generate a grouped record collection with a handful of groups
fn grouped_strategy() -> impl Strategy<Value = GroupedRecords> {
    prop::collection::btree_map(
        "[a-d]{1,2}",
        prop::collection::vec(record_strategy(), 0..5),
        0..4,
    )
}

/// The set of (group, identity triple) pairs in a collection
fn identities(records: &GroupedRecords) -> BTreeSet<(String, String, String, String)> {
    records
        .iter()
        .flat_map(|(group, list)| {
            list.iter().map(move |r| {
                let (topic, url, article) = r.identity();
                (
                    group.clone(),
                    topic.to_string(),
                    url.to_string(),
                    article.to_string(),
                )
            })
        })
        .collect()
}

proptest! {
    #[test]
    fn merge_with_empty_is_idempotent(a in grouped_strategy(), b in grouped_strategy()) {
        let merged = merge(&a, &b);
        prop_assert_eq!(merge(&merged, &GroupedRecords::new()), merged.clone());
        prop_assert_eq!(merge(&GroupedRecords::new(), &merged), merged);
    }

    #[test]
    fn merging_a_subset_changes_nothing(a in grouped_strategy(), b in grouped_strategy()) {
        let merged = merge(&a, &b);
        // Both inputs are subsets of the merged result under the dedup key
        prop_assert_eq!(merge(&merged, &a), merged.clone());
        prop_assert_eq!(merge(&merged, &b), merged);
    }

    #[test]
    fn merge_is_associative(
        a in grouped_strategy(),
        b in grouped_strategy(),
        c in grouped_strategy(),
    ) {
        prop_assert_eq!(
            merge(&merge(&a, &b), &c),
            merge(&a, &merge(&b, &c))
        );
    }

    #[test]
    fn merge_preserves_the_union_of_identities(a in grouped_strategy(), b in grouped_strategy()) {
        let merged = merge(&a, &b);

        let mut expected = identities(&a);
        expected.extend(identities(&b));
        prop_assert_eq!(identities(&merged), expected);
    }

    #[test]
    fn merged_groups_contain_no_duplicate_identities(
        a in grouped_strategy(),
        b in grouped_strategy(),
    ) {
        let merged = merge(&a, &b);
        for list in merged.values() {
            let unique: BTreeSet<_> = list.iter().map(ArticleRecord::identity).collect();
            prop_assert_eq!(unique.len(), list.len());
        }
    }

    #[test]
    fn old_records_precede_new_ones(a in grouped_strategy(), b in grouped_strategy()) {
        let merged = merge(&a, &b);
        for (group, list) in &merged {
            let old_count = a.get(group).map_or(0, |l| {
                let unique: BTreeSet<_> = l.iter().map(ArticleRecord::identity).collect();
                unique.len()
            });
            // The first old_count entries of every merged group come from `a`
            for record in list.iter().take(old_count) {
                let found_in_old = a[group].iter().any(|r| r == record);
                prop_assert!(found_in_old);
            }
        }
    }
}
