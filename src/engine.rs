//! Whole-run consolidation pipeline.
//!
//! A run walks `Loaded → Clustered → Classified → Merged → Deduplicated →
//! Sorted → Emitted`, entering each stage exactly once. Runs share no
//! state; each one takes a fully materialized collection and returns a
//! new one.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::post::{load_posts, ConsolidatedPost, RawRecord};
use crate::progress::ProgressReporter;
use crate::thread::{
    classify, cluster_posts, dedup_by_id, merge, sort_newest_first, working_order,
    ClassifierPolicy, ThreadClassifier, DEFAULT_WINDOW_SECS,
};
use crate::timestamp;

/// Terminal run failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no valid posts to process ({dropped} of {total} rows lacked an id or text)")]
    NoData { total: usize, dropped: usize },
}

/// Stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunStage {
    Loaded,
    Clustered,
    Classified,
    Merged,
    Deduplicated,
    Sorted,
    Emitted,
}

impl RunStage {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Clustered => "clustered",
            Self::Classified => "classified",
            Self::Merged => "merged",
            Self::Deduplicated => "deduplicated",
            Self::Sorted => "sorted",
            Self::Emitted => "emitted",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a consolidation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub window_seconds: u64,
    pub policy: ClassifierPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECS,
            policy: ClassifierPolicy::WindowOnly,
        }
    }
}

/// Counters describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub total_rows: usize,
    pub dropped_rows: usize,
    pub valid_posts: usize,
    pub fallback_timestamps: usize,
    pub threads: usize,
    pub standalone: usize,
    pub posts_in_threads: usize,
    pub duplicates_removed: usize,
}

/// Output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consolidation {
    /// Deduplicated records, newest first.
    pub posts: Vec<ConsolidatedPost>,
    pub stats: RunStats,
}

/// Consolidate `records` using the policy named in `options`.
///
/// # Errors
///
/// Returns [`EngineError::NoData`] when no record survives validation.
pub fn consolidate(
    records: &[RawRecord],
    options: &EngineOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<Consolidation, EngineError> {
    let classifier = options.policy.classifier();
    consolidate_with(records, options.window_seconds, classifier.as_ref(), progress)
}

/// Consolidate `records` with an explicit classifier.
///
/// # Errors
///
/// Returns [`EngineError::NoData`] when no record survives validation.
pub fn consolidate_with(
    records: &[RawRecord],
    window_seconds: u64,
    classifier: &dyn ThreadClassifier,
    progress: &mut dyn ProgressReporter,
) -> Result<Consolidation, EngineError> {
    let mut stats = RunStats {
        total_rows: records.len(),
        ..RunStats::default()
    };

    let loaded = load_posts(records, timestamp::now());
    stats.dropped_rows = loaded.dropped;
    stats.valid_posts = loaded.posts.len();
    stats.fallback_timestamps = loaded.fallback_timestamps;

    if loaded.posts.is_empty() {
        return Err(EngineError::NoData {
            total: stats.total_rows,
            dropped: stats.dropped_rows,
        });
    }
    if stats.dropped_rows > 0 {
        info!(dropped = stats.dropped_rows, "Dropped rows without id or text");
    }
    enter(RunStage::Loaded);
    progress.status(&format!("Loaded {} posts", stats.valid_posts));

    let posts = working_order(loaded.posts);
    let clusters = cluster_posts(&posts, window_seconds);
    enter(RunStage::Clustered);
    debug!(clusters = clusters.len(), window_seconds, "Clustered posts");

    let classified = classify(clusters, classifier);
    stats.threads = classified.threads.len();
    stats.standalone = classified.standalone.len();
    stats.posts_in_threads = classified.posts_in_threads();
    enter(RunStage::Classified);
    info!(
        policy = classifier.name(),
        threads = stats.threads,
        standalone = stats.standalone,
        "Detected threads"
    );
    progress.status(&format!(
        "Detected {} threads and {} standalone posts",
        stats.threads, stats.standalone
    ));

    let merged = merge(&classified);
    enter(RunStage::Merged);

    let (deduped, removed) = dedup_by_id(merged);
    stats.duplicates_removed = removed;
    enter(RunStage::Deduplicated);

    let sorted = sort_newest_first(deduped, timestamp::now());
    enter(RunStage::Sorted);

    info!(posts = sorted.len(), "Consolidated posts");
    progress.status(&format!("Consolidated to {} total posts", sorted.len()));
    enter(RunStage::Emitted);

    Ok(Consolidation {
        posts: sorted,
        stats,
    })
}

fn enter(stage: RunStage) {
    debug!(stage = %stage, "Entering stage");
}
