// tests/trigger_properties.rs
// Property tests for phrase matching and trigger evaluation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rss_trigger_filter::{contains_phrase, filter_stories, ActivationList, NewsItem, TriggerArena};

const VOCAB: &[&str] = &["storm", "flood", "election", "market", "dow", "rain", "vote", "fed"];

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 10, 12, 12, 0, 0).unwrap()
}

fn word() -> impl Strategy<Value = String> {
    prop::sample::select(VOCAB).prop_map(str::to_string)
}

fn item_strategy() -> impl Strategy<Value = NewsItem> {
    (
        prop::collection::vec(word(), 0..6),
        prop::collection::vec(word(), 0..6),
        -3_600i64..3_600,
    )
        .prop_map(|(title, description, offset)| {
            NewsItem::new(
                "id",
                title.join(" "),
                description.join(" "),
                "https://example.test",
                base() + Duration::seconds(offset),
            )
        })
}

proptest! {
    #[test]
    fn any_word_window_of_normalized_text_matches(
        words in prop::collection::vec("[a-z]{1,8}", 1..12),
        seps in prop::collection::vec(prop::sample::select(vec![" ", ", ", "! ", " - ", "...", "\t"]), 12),
        start in 0usize..12,
        len in 1usize..5,
        upper in any::<bool>(),
    ) {
        let start = start % words.len();
        let end = (start + len).min(words.len());
        let mut text = String::new();
        for (i, w) in words.iter().enumerate() {
            if i > 0 {
                text.push_str(seps[i % seps.len()]);
            }
            text.push_str(w);
        }
        if upper {
            text = text.to_uppercase();
        }
        let phrase = words[start..end].join(" ");
        prop_assert!(contains_phrase(&text, &phrase), "{:?} in {:?}", phrase, text);
    }

    #[test]
    fn double_negation_is_identity(w in word(), item in item_strategy()) {
        let mut arena = TriggerArena::new();
        let t = arena.title(&w);
        let n = arena.not(t).unwrap();
        let nn = arena.not(n).unwrap();
        prop_assert_eq!(arena.evaluate(nn, &item), arena.evaluate(t, &item));
    }

    #[test]
    fn combinators_match_boolean_ops(a in word(), b in word(), item in item_strategy()) {
        let mut arena = TriggerArena::new();
        let ta = arena.title(&a);
        let tb = arena.description(&b);
        let and = arena.and(ta, tb).unwrap();
        let or = arena.or(ta, tb).unwrap();
        let and_rev = arena.and(tb, ta).unwrap();
        let or_rev = arena.or(tb, ta).unwrap();
        let ea = arena.evaluate(ta, &item);
        let eb = arena.evaluate(tb, &item);
        prop_assert_eq!(arena.evaluate(and, &item), ea && eb);
        prop_assert_eq!(arena.evaluate(or, &item), ea || eb);
        prop_assert_eq!(arena.evaluate(and_rev, &item), arena.evaluate(and, &item));
        prop_assert_eq!(arena.evaluate(or_rev, &item), arena.evaluate(or, &item));
    }

    #[test]
    fn before_and_after_never_both_fire(offset in -10i64..10, item in item_strategy()) {
        let cutoff = item.published_at + Duration::seconds(offset);
        let mut arena = TriggerArena::new();
        let before = arena.before(cutoff);
        let after = arena.after(cutoff);
        let b = arena.evaluate(before, &item);
        let a = arena.evaluate(after, &item);
        prop_assert!(!(a && b));
        if offset == 0 {
            prop_assert!(!a && !b);
        } else {
            prop_assert!(a ^ b);
        }
    }

    #[test]
    fn filter_keeps_exactly_the_matching_items_in_order(
        items in prop::collection::vec(item_strategy(), 0..20),
        keywords in prop::collection::vec(word(), 0..3),
    ) {
        // Generated texts are single vocabulary words joined by spaces, so a
        // keyword fires exactly when it is one of the words.
        let has_word = |text: &str, kw: &str| text.split(' ').any(|w| w == kw);
        let expected: Vec<NewsItem> = items
            .iter()
            .filter(|i| {
                keywords
                    .iter()
                    .any(|kw| has_word(&i.title, kw) || has_word(&i.description, kw))
            })
            .cloned()
            .collect();
        let out = filter_stories(items.clone(), &ActivationList::from_keywords(&keywords));
        prop_assert_eq!(&out, &expected);
        if keywords.is_empty() {
            prop_assert!(out.is_empty());
        }
    }
}
