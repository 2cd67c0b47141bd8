// src/filter.rs
//! Filtering pass: keep every item that at least one activated trigger fires on.
//!
//! Input order is preserved, each item appears at most once, and testing for
//! an item stops at the first trigger that fires. No deduplication by id
//! happens here. An empty activation list keeps nothing.

use crate::story::NewsItem;
use crate::trigger::ActivationList;

pub fn filter_stories(items: Vec<NewsItem>, activations: &ActivationList) -> Vec<NewsItem> {
    let total = items.len();
    let kept: Vec<NewsItem> = items
        .into_iter()
        .filter(|item| activations.matches(item))
        .collect();
    tracing::debug!(target: "filter", total, kept = kept.len(), "filter pass");
    kept
}

/// Borrowing variant of [`filter_stories`].
pub fn filter_story_refs<'a>(items: &'a [NewsItem], activations: &ActivationList) -> Vec<&'a NewsItem> {
    items.iter().filter(|item| activations.matches(item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn story(id: &str, title: &str) -> NewsItem {
        NewsItem::new(
            id,
            title,
            "",
            format!("https://example.test/{id}"),
            Utc.with_ymd_and_hms(2016, 10, 12, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn keeps_matching_items_in_order() {
        let mut list = ActivationList::new();
        let alert = list.arena_mut().title("alert");
        list.activate(alert).unwrap();

        let items = vec![story("i1", "Breaking Alert"), story("i2", "Weather Update")];
        let out = filter_stories(items, &list);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "i1");
    }

    #[test]
    fn item_matching_several_triggers_is_kept_once() {
        let list = ActivationList::from_keywords(&["storm", "warning", "storm"]);
        let items = vec![
            story("a", "Storm warning issued"),
            story("b", "Quiet day"),
            story("c", "Storm passes"),
        ];
        let ids: Vec<_> = filter_stories(items, &list).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        let list = ActivationList::from_keywords(&["storm"]);
        assert!(filter_stories(Vec::new(), &list).is_empty());

        let items = vec![story("a", "Storm"), story("b", "Anything")];
        assert!(filter_stories(items, &ActivationList::new()).is_empty());
    }

    #[test]
    fn same_id_is_not_deduplicated() {
        let list = ActivationList::from_keywords(&["storm"]);
        let items = vec![story("dup", "Storm one"), story("dup", "Storm two")];
        assert_eq!(filter_stories(items, &list).len(), 2);
    }

    #[test]
    fn borrowing_variant_agrees() {
        let list = ActivationList::from_keywords(&["alert"]);
        let items = vec![story("i1", "Breaking Alert"), story("i2", "Weather Update")];
        let refs = filter_story_refs(&items, &list);
        assert_eq!(refs, vec![&items[0]]);
    }
}
