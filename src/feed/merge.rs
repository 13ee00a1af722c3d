//! Link-keyed merging of newly scraped items into an existing feed.

use crate::models::Item;
use std::collections::HashSet;

/// Append every item from `new_items` whose link has not been seen yet.
///
/// Existing items keep their position and content; an article that is
/// re-discovered with a different title or description is left as it was
/// first recorded. Accepted items follow in extraction order, and repeated
/// links within `new_items` collapse to their first occurrence.
///
/// Merging the same batch twice is a no-op the second time.
pub fn merge_items(existing: Vec<Item>, new_items: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<String> = existing.iter().map(|item| item.link.clone()).collect();
    let mut merged = existing;
    merged.reserve(new_items.len());

    for item in new_items {
        if seen.insert(item.link.clone()) {
            merged.push(item);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn item(link: &str, title: &str) -> Item {
        Item {
            title: title.to_string(),
            link: link.to_string(),
            description: format!("about {title}"),
            pub_date: "Mon, 02 Jan 2006 15:04:05 -0700".to_string(),
            media: None,
        }
    }

    fn links(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.link.as_str()).collect()
    }

    #[test]
    fn test_merge_into_empty() {
        let merged = merge_items(vec![], vec![item("https://x.com/a", "A"), item("https://x.com/b", "B")]);
        assert_eq!(links(&merged), vec!["https://x.com/a", "https://x.com/b"]);
    }

    #[test]
    fn test_existing_entry_keeps_original_title() {
        let existing = vec![item("https://x.com/a", "Original")];
        let merged = merge_items(
            existing,
            vec![item("https://x.com/a", "Changed"), item("https://x.com/b", "B")],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "Original");
        assert_eq!(merged[0].description, "about Original");
        assert_eq!(merged[1].link, "https://x.com/b");
    }

    #[test]
    fn test_duplicates_within_batch_keep_first() {
        let merged = merge_items(
            vec![],
            vec![item("https://x.com/a", "first"), item("https://x.com/a", "second")],
        );
        assert_eq!(merged, vec![item("https://x.com/a", "first")]);
    }

    #[test]
    fn test_existing_order_untouched() {
        let existing = vec![item("https://x.com/c", "C"), item("https://x.com/a", "A")];
        let merged = merge_items(existing.clone(), vec![item("https://x.com/b", "B")]);
        assert_eq!(&merged[..2], &existing[..]);
        assert_eq!(merged[2].link, "https://x.com/b");
    }

    fn arb_items(max: usize) -> impl Strategy<Value = Vec<Item>> {
        prop::collection::vec(("[a-f]", "[A-Z]{1,3}"), 0..max).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(slug, title)| item(&format!("https://x.com/{slug}"), &title))
                .collect()
        })
    }

    fn arb_unique_items(max: usize) -> impl Strategy<Value = Vec<Item>> {
        arb_items(max).prop_map(|items| merge_items(vec![], items))
    }

    proptest! {
        #[test]
        fn prop_merge_is_idempotent(existing in arb_unique_items(6), new in arb_items(10)) {
            let once = merge_items(existing.clone(), new);
            let twice = merge_items(existing, once.clone());
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn prop_merge_is_order_stable(existing in arb_unique_items(6), new in arb_items(10)) {
            let merged = merge_items(existing.clone(), new.clone());
            prop_assert_eq!(&merged[..existing.len()], &existing[..]);

            let accepted = &merged[existing.len()..];
            let positions = accepted
                .iter()
                .map(|a| new.iter().position(|n| n == a).unwrap());
            let mut last = None;
            for pos in positions {
                prop_assert!(last.is_none_or(|l| pos > l));
                last = Some(pos);
            }
        }

        #[test]
        fn prop_merge_links_are_unique(existing in arb_unique_items(6), new in arb_items(10)) {
            let merged = merge_items(existing, new);
            let unique: HashSet<_> = merged.iter().map(|i| i.link.clone()).collect();
            prop_assert_eq!(unique.len(), merged.len());
        }
    }
}
