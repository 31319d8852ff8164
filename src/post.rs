//! Post data model.
//!
//! [`RawRecord`] is one row as handed over by the ingestion layer.
//! [`Post`] is a validated row with its instant resolved exactly once.
//! [`ConsolidatedPost`] is what the engine emits.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::timestamp::parse_timestamp_or;

/// One input row, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub raw_timestamp: String,
    pub text: String,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub retweet_count: Option<u64>,
    #[serde(default)]
    pub reply_count: Option<u64>,
    #[serde(default)]
    pub quote_count: Option<u64>,
    #[serde(default)]
    pub author_id: Option<String>,
}

impl RawRecord {
    /// Convenience constructor for the three required fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        raw_timestamp: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            raw_timestamp: raw_timestamp.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Whether the row carries a usable id and text after trimming.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        !self.id.trim().is_empty() && !self.text.trim().is_empty()
    }
}

/// Engagement counters; absent values count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub quotes: u64,
}

/// A validated post. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    /// Timestamp text exactly as received.
    pub raw_timestamp: String,
    /// Canonical instant, derived once from `raw_timestamp`.
    pub instant: NaiveDateTime,
    pub text: String,
    pub engagement: Engagement,
    pub author_id: Option<String>,
    /// Position of the source row in the input collection.
    pub input_index: usize,
}

impl Post {
    /// Build a post from an eligible record.
    ///
    /// Returns `None` when the record has no id or text. The second element
    /// is `true` when the timestamp could not be parsed and `fallback` was
    /// used as the instant.
    #[must_use]
    pub fn from_record(
        record: &RawRecord,
        input_index: usize,
        fallback: NaiveDateTime,
    ) -> Option<(Self, bool)> {
        if !record.is_eligible() {
            return None;
        }
        let (instant, used_fallback) = parse_timestamp_or(&record.raw_timestamp, fallback);
        let post = Self {
            id: record.id.trim().to_string(),
            raw_timestamp: record.raw_timestamp.clone(),
            instant,
            text: record.text.trim().to_string(),
            engagement: Engagement {
                likes: record.like_count.unwrap_or(0),
                retweets: record.retweet_count.unwrap_or(0),
                replies: record.reply_count.unwrap_or(0),
                quotes: record.quote_count.unwrap_or(0),
            },
            author_id: record
                .author_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
            input_index,
        };
        Some((post, used_fallback))
    }
}

/// Result of validating an input collection.
#[derive(Debug, Clone, Default)]
pub struct LoadedPosts {
    pub posts: Vec<Post>,
    pub dropped: usize,
    pub fallback_timestamps: usize,
}

/// Validate records and resolve their instants.
///
/// Rows without an id or text are dropped and counted. Every fallback
/// instant in one load shares the same `fallback` value.
#[must_use]
pub fn load_posts(records: &[RawRecord], fallback: NaiveDateTime) -> LoadedPosts {
    let mut loaded = LoadedPosts::default();
    for (index, record) in records.iter().enumerate() {
        match Post::from_record(record, index, fallback) {
            Some((post, used_fallback)) => {
                if used_fallback {
                    loaded.fallback_timestamps += 1;
                }
                loaded.posts.push(post);
            }
            None => {
                debug!(row = index, id = %record.id, "Dropping row without id or text");
                loaded.dropped += 1;
            }
        }
    }
    loaded
}

/// The engine's terminal output unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedPost {
    /// Id of the chronologically first member.
    pub id: String,
    /// Raw timestamp text of the chronologically first member.
    pub timestamp: String,
    pub text: String,
    pub is_thread: bool,
    pub member_count: usize,
}

impl ConsolidatedPost {
    /// A single post emitted on its own.
    #[must_use]
    pub fn standalone(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            timestamp: post.raw_timestamp.clone(),
            text: post.text.clone(),
            is_thread: false,
            member_count: 1,
        }
    }
}
