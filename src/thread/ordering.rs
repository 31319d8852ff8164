//! Output deduplication and ordering.
//!
//! Sorting uses the emitted timestamp text, re-parsed with the same
//! normalizer as ingestion, since that is all downstream consumers see.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::post::ConsolidatedPost;
use crate::timestamp::{self, parse_timestamp_or};

/// Drop records whose id was already seen; the first occurrence wins.
///
/// Returns the surviving records and the number removed.
#[must_use]
pub fn dedup_by_id(posts: Vec<ConsolidatedPost>) -> (Vec<ConsolidatedPost>, usize) {
    let mut seen = HashSet::new();
    let mut removed = 0;
    let mut kept = Vec::with_capacity(posts.len());

    for post in posts {
        if seen.insert(post.id.clone()) {
            kept.push(post);
        } else {
            debug!(id = %post.id, "Dropping duplicate consolidated post");
            removed += 1;
        }
    }

    (kept, removed)
}

/// Stable sort, newest first, by re-parsed timestamp.
///
/// Unparseable timestamps sort as `fallback`. Each key is computed once.
#[must_use]
pub fn sort_newest_first(
    posts: Vec<ConsolidatedPost>,
    fallback: NaiveDateTime,
) -> Vec<ConsolidatedPost> {
    let mut keyed: Vec<(NaiveDateTime, ConsolidatedPost)> = posts
        .into_iter()
        .map(|post| (parse_timestamp_or(&post.timestamp, fallback).0, post))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.into_iter().map(|(_, post)| post).collect()
}

/// Deduplicate then sort, using the current time as the fallback instant.
#[must_use]
pub fn order_output(posts: Vec<ConsolidatedPost>) -> (Vec<ConsolidatedPost>, usize) {
    let (deduped, removed) = dedup_by_id(posts);
    (sort_newest_first(deduped, timestamp::now()), removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, timestamp: &str) -> ConsolidatedPost {
        ConsolidatedPost {
            id: id.to_string(),
            timestamp: timestamp.to_string(),
            text: format!("text {id}"),
            is_thread: false,
            member_count: 1,
        }
    }

    fn ids(posts: &[ConsolidatedPost]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_dedup_first_wins() {
        let mut second = record("1", "2025-08-12T10:00:00Z");
        second.text = "later copy".to_string();
        let (kept, removed) = dedup_by_id(vec![
            record("1", "2025-08-12T09:00:00Z"),
            record("2", "2025-08-12T09:30:00Z"),
            second,
        ]);
        assert_eq!(removed, 1);
        assert_eq!(ids(&kept), vec!["1", "2"]);
        assert_eq!(kept[0].text, "text 1");
    }

    #[test]
    fn test_sort_newest_first_mixed_formats() {
        let sorted = sort_newest_first(
            vec![
                record("old", "Tue Aug 12 09:00:00 +0000 2025"),
                record("new", "2025-08-12T12:00:00.000Z"),
                record("mid", "2025-08-12T10:00:00Z"),
            ],
            timestamp::now(),
        );
        assert_eq!(ids(&sorted), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let sorted = sort_newest_first(
            vec![
                record("a", "2025-08-12T10:00:00Z"),
                record("b", "Tue Aug 12 10:00:00 +0000 2025"),
                record("c", "2025-08-12T11:00:00Z"),
            ],
            timestamp::now(),
        );
        assert_eq!(ids(&sorted), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_unparseable_sorts_as_fallback() {
        let fallback = chrono::NaiveDate::from_ymd_opt(2025, 8, 12)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let sorted = sort_newest_first(
            vec![
                record("a", "2025-08-12T10:00:00Z"),
                record("junk", "??"),
                record("c", "2025-08-12T11:00:00Z"),
            ],
            fallback,
        );
        assert_eq!(ids(&sorted), vec!["c", "junk", "a"]);
    }

    #[test]
    fn test_order_output_idempotent() {
        let input = vec![
            record("1", "2025-08-12T09:00:00Z"),
            record("2", "2025-08-12T11:00:00Z"),
            record("1", "2025-08-12T12:00:00Z"),
            record("3", "garbage"),
        ];
        let (once, removed) = order_output(input);
        assert_eq!(removed, 1);
        let (twice, removed_again) = order_output(once.clone());
        assert_eq!(removed_again, 0);
        assert_eq!(once, twice);
    }
}
