//! Thread detection.
//!
//! Posts are grouped by temporal proximity ([`cluster`]), each group is
//! accepted or rejected as a thread ([`classifier`]), accepted groups are
//! folded into one record ([`merge`]) and the records are deduplicated and
//! sorted ([`ordering`]).

pub mod classifier;
pub mod cluster;
pub mod merge;
pub mod ordering;

pub use classifier::{
    classify, has_topic_coherence, ClassifierPolicy, Classified, HeuristicAugmented,
    ThreadClassifier, WindowOnly,
};
pub use cluster::{cluster_posts, working_order, Cluster, DEFAULT_WINDOW_SECS};
pub use merge::{merge, merge_thread, THREAD_SEPARATOR};
pub use ordering::{dedup_by_id, order_output, sort_newest_first};
