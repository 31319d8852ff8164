//! Exploratory thread report.
//!
//! Runs the same clustering as consolidation but classifies with
//! [`HeuristicAugmented`] and reports each accepted thread in detail:
//! time span, numbered combined text, summed engagement. Nothing here
//! feeds the consolidation output.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::engine::EngineError;
use crate::post::{load_posts, Post, RawRecord};
use crate::thread::{classify, cluster_posts, working_order, Cluster, HeuristicAugmented};
use crate::timestamp;

/// Text that already starts with its own position marker (`1/`, `2.`, `3)`).
static NUMBERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[/.)]").expect("Invalid numbering regex"));

/// Summed engagement of a thread's members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ThreadEngagement {
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub total: u64,
}

/// A member post as listed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadMember {
    pub id: String,
    pub text: String,
    pub instant: NaiveDateTime,
}

/// One accepted thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: f64,
    pub post_count: usize,
    pub combined_text: String,
    pub engagement: ThreadEngagement,
    pub author_id: Option<String>,
    pub members: Vec<ThreadMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub total_posts: usize,
    pub threads_found: usize,
    pub standalone_posts: usize,
    pub posts_combined: usize,
}

/// Full report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadAnalysis {
    pub threads: Vec<ThreadSummary>,
    /// Ids of posts outside any accepted thread, cluster by cluster in
    /// working order and chronological within each cluster.
    pub standalone: Vec<String>,
    pub stats: AnalysisStats,
}

/// Build the report for `records`.
///
/// # Errors
///
/// Returns [`EngineError::NoData`] when no record survives validation.
pub fn analyze(
    records: &[RawRecord],
    window_seconds: u64,
    classifier: &HeuristicAugmented,
) -> Result<ThreadAnalysis, EngineError> {
    let loaded = load_posts(records, timestamp::now());
    if loaded.posts.is_empty() {
        return Err(EngineError::NoData {
            total: records.len(),
            dropped: loaded.dropped,
        });
    }

    let total_posts = loaded.posts.len();
    let posts = working_order(loaded.posts);
    let classified = classify(cluster_posts(&posts, window_seconds), classifier);

    let threads: Vec<ThreadSummary> = classified.threads.iter().map(summarize).collect();
    let standalone: Vec<String> = classified.standalone.iter().map(|p| p.id.clone()).collect();

    let stats = AnalysisStats {
        total_posts,
        threads_found: threads.len(),
        standalone_posts: standalone.len(),
        posts_combined: classified.posts_in_threads(),
    };
    info!(
        threads = stats.threads_found,
        standalone = stats.standalone_posts,
        "Thread analysis complete"
    );

    Ok(ThreadAnalysis {
        threads,
        standalone,
        stats,
    })
}

/// Describe one accepted cluster.
#[must_use]
pub fn summarize(cluster: &Cluster) -> ThreadSummary {
    let first = cluster.first();
    let last = cluster.last();
    let members = cluster.members();

    let engagement = members.iter().fold(ThreadEngagement::default(), |acc, p| {
        ThreadEngagement {
            likes: acc.likes.saturating_add(p.engagement.likes),
            retweets: acc.retweets.saturating_add(p.engagement.retweets),
            replies: acc.replies.saturating_add(p.engagement.replies),
            total: 0,
        }
    });

    ThreadSummary {
        thread_id: format!("thread_{}", first.id),
        start: first.instant,
        end: last.instant,
        duration_minutes: cluster.elapsed().num_milliseconds() as f64 / 60_000.0,
        post_count: cluster.len(),
        combined_text: numbered_text(members),
        engagement: ThreadEngagement {
            total: engagement
                .likes
                .saturating_add(engagement.retweets)
                .saturating_add(engagement.replies),
            ..engagement
        },
        author_id: first.author_id.clone(),
        members: members
            .iter()
            .map(|p| ThreadMember {
                id: p.id.clone(),
                text: p.text.clone(),
                instant: p.instant,
            })
            .collect(),
    }
}

/// Join member texts, prefixing `i/n` where the author did not number them.
fn numbered_text(members: &[Post]) -> String {
    let count = members.len();
    members
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if NUMBERED_PREFIX.is_match(&p.text) {
                p.text.clone()
            } else {
                format!("{}/{count} {}", i + 1, p.text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
