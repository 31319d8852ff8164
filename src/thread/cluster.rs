//! Anchor-relative temporal clustering.
//!
//! Each unclaimed post in working order (newest first) becomes an anchor
//! and claims every later unclaimed post within the window of the anchor
//! itself, not of its neighbour. The whole remainder of the list is
//! scanned for every anchor, so a run is quadratic in the worst case.

use chrono::{NaiveDateTime, TimeDelta};

use crate::post::Post;

/// Default clustering window in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 120;

/// Chronologically ordered, non-empty group of posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    members: Vec<Post>,
}

impl Cluster {
    /// Build a cluster; members are sorted oldest first, ties by input order.
    ///
    /// Returns `None` for an empty member list.
    #[must_use]
    pub fn new(mut members: Vec<Post>) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        members.sort_by(|a, b| {
            a.instant
                .cmp(&b.instant)
                .then(a.input_index.cmp(&b.input_index))
        });
        Some(Self { members })
    }

    /// Members in chronological order.
    #[must_use]
    pub fn members(&self) -> &[Post] {
        &self.members
    }

    /// Earliest member; its id and timestamp represent the group.
    #[must_use]
    pub fn first(&self) -> &Post {
        &self.members[0]
    }

    /// Latest member.
    #[must_use]
    pub fn last(&self) -> &Post {
        &self.members[self.members.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`; clusters cannot be built empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Time between the earliest and latest member.
    #[must_use]
    pub fn elapsed(&self) -> TimeDelta {
        self.last().instant - self.first().instant
    }

    #[must_use]
    pub fn into_members(self) -> Vec<Post> {
        self.members
    }
}

/// Sort posts into the working order for clustering: newest first, ties
/// keep their input order.
#[must_use]
pub fn working_order(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.instant.cmp(&a.instant));
    posts
}

/// Partition posts into disjoint clusters.
///
/// `posts` must already be in [`working_order`]. A post joins an anchor's
/// cluster when its distance to the anchor is at most `window_seconds`
/// (inclusive). The scan never stops early.
#[must_use]
pub fn cluster_posts(posts: &[Post], window_seconds: u64) -> Vec<Cluster> {
    let window_ms = i64::try_from(window_seconds)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);

    let mut claimed = vec![false; posts.len()];
    let mut clusters = Vec::new();

    for (i, anchor) in posts.iter().enumerate() {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;
        let mut members = vec![anchor.clone()];

        for (j, candidate) in posts.iter().enumerate().skip(i + 1) {
            if claimed[j] {
                continue;
            }
            if gap_ms(anchor.instant, candidate.instant) <= window_ms {
                claimed[j] = true;
                members.push(candidate.clone());
            }
        }

        if let Some(cluster) = Cluster::new(members) {
            clusters.push(cluster);
        }
    }

    clusters
}

fn gap_ms(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (a - b).num_milliseconds().saturating_abs()
}
