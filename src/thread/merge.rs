//! Folding classified clusters into consolidated records.

use crate::post::ConsolidatedPost;
use crate::thread::classifier::Classified;
use crate::thread::cluster::Cluster;

/// Separator placed between member texts of a merged thread.
pub const THREAD_SEPARATOR: &str = "\n\n";

/// Merge a thread into one record represented by its earliest member.
#[must_use]
pub fn merge_thread(cluster: &Cluster) -> ConsolidatedPost {
    let first = cluster.first();
    let text = cluster
        .members()
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(THREAD_SEPARATOR);

    ConsolidatedPost {
        id: first.id.clone(),
        timestamp: first.raw_timestamp.clone(),
        text,
        is_thread: true,
        member_count: cluster.len(),
    }
}

/// Produce one record per thread and one per standalone post.
///
/// Records are returned in the input order of the post that represents
/// them, which is what later tie-breaking relies on.
#[must_use]
pub fn merge(classified: &Classified) -> Vec<ConsolidatedPost> {
    let mut keyed: Vec<(usize, ConsolidatedPost)> =
        Vec::with_capacity(classified.threads.len() + classified.standalone.len());

    keyed.extend(
        classified
            .threads
            .iter()
            .map(|cluster| (cluster.first().input_index, merge_thread(cluster))),
    );
    keyed.extend(
        classified
            .standalone
            .iter()
            .map(|post| (post.input_index, ConsolidatedPost::standalone(post))),
    );

    keyed.sort_by_key(|(index, _)| *index);
    keyed.into_iter().map(|(_, post)| post).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{Engagement, Post};
    use chrono::{NaiveDate, TimeDelta};

    fn post(id: &str, seconds: i64, text: &str, index: usize) -> Post {
        let base = NaiveDate::from_ymd_opt(2025, 8, 12)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Post {
            id: id.to_string(),
            raw_timestamp: format!("raw-{id}"),
            instant: base + TimeDelta::seconds(seconds),
            text: text.to_string(),
            engagement: Engagement::default(),
            author_id: None,
            input_index: index,
        }
    }

    #[test]
    fn test_merge_thread_chronological_text() {
        let cluster = Cluster::new(vec![
            post("c", 20, "C", 0),
            post("a", 0, "A", 1),
            post("b", 10, "B", 2),
        ])
        .unwrap();
        let merged = merge_thread(&cluster);
        assert_eq!(merged.text, "A\n\nB\n\nC");
        assert_eq!(merged.id, "a");
        assert_eq!(merged.timestamp, "raw-a");
        assert!(merged.is_thread);
        assert_eq!(merged.member_count, 3);
    }

    #[test]
    fn test_merge_orders_by_representative_input_index() {
        let thread = Cluster::new(vec![post("t1", 0, "x", 2), post("t2", 5, "y", 0)]).unwrap();
        let classified = Classified {
            threads: vec![thread],
            standalone: vec![post("s", 900, "solo", 1)],
        };
        let merged = merge(&classified);
        let ids: Vec<&str> = merged.iter().map(|p| p.id.as_str()).collect();
        // The thread is represented by t1 (input index 2)
        assert_eq!(ids, vec!["s", "t1"]);
        assert!(!merged[0].is_thread);
        assert_eq!(merged[0].member_count, 1);
    }
}
