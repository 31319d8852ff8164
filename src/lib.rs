//! Thread consolidation library.
//!
//! Takes a time-ordered export of short posts, finds fragments of the same
//! rapid-fire thread by temporal proximity, and emits one consolidated
//! record per logical post.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod post;
pub mod progress;
pub mod records;
pub mod thread;
pub mod timestamp;

pub use engine::{consolidate, Consolidation, EngineError, EngineOptions, RunStats};
pub use post::{ConsolidatedPost, Post, RawRecord};
