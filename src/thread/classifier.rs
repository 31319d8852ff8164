//! Thread classification policies.
//!
//! Two policies exist and produce different results on the same input:
//!
//! - [`WindowOnly`]: any cluster with two or more members is a thread. This
//!   is what the consolidation pipeline uses.
//! - [`HeuristicAugmented`]: additionally bounds the cluster's elapsed time
//!   and, for slower clusters, asks for a content-coherence signal. Used by
//!   the analysis report.

use std::collections::HashSet;
use std::fmt;

use crate::post::Post;
use crate::thread::cluster::Cluster;

const BUSINESS_TERMS: &[&str] = &[
    "partnership",
    "collaboration",
    "launch",
    "update",
    "announcement",
    "ecosystem",
    "advisor",
    "advisors",
];

const TECH_TERMS: &[&str] = &["blockchain", "defi", "crypto", "token", "network", "protocol"];

const EVENT_TERMS: &[&str] = &[
    "live",
    "stream",
    "broadcast",
    "calendar",
    "date",
    "featuring",
    "@bybit_official",
    "helen liu",
    "emily bao",
];

const TERM_GROUPS: &[&[&str]] = &[BUSINESS_TERMS, TECH_TERMS, EVENT_TERMS];

/// Default partner brand looked for by [`HeuristicAugmented`].
pub const DEFAULT_PARTNER_KEYWORD: &str = "bybit";

/// Decides whether a cluster is a genuine thread.
pub trait ThreadClassifier: Send + Sync {
    /// Stable identifier for logging.
    fn name(&self) -> &'static str;

    /// Whether `cluster` should be merged into a single record.
    fn is_thread(&self, cluster: &Cluster) -> bool;
}

/// Accepts every cluster with at least two members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowOnly;

impl ThreadClassifier for WindowOnly {
    fn name(&self) -> &'static str {
        "window-only"
    }

    fn is_thread(&self, cluster: &Cluster) -> bool {
        cluster.len() >= 2
    }
}

/// Stricter classifier combining elapsed time with content signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicAugmented {
    /// Clusters spanning at most this many seconds are accepted outright.
    pub auto_accept_secs: i64,
    /// Clusters spanning at most this many seconds need a coherence signal.
    pub coherent_max_secs: i64,
    /// Brand name whose repeated mention counts as a coherence signal.
    pub partner_keyword: String,
}

impl Default for HeuristicAugmented {
    fn default() -> Self {
        Self {
            auto_accept_secs: 60,
            coherent_max_secs: 120,
            partner_keyword: DEFAULT_PARTNER_KEYWORD.to_string(),
        }
    }
}

impl ThreadClassifier for HeuristicAugmented {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn is_thread(&self, cluster: &Cluster) -> bool {
        if cluster.len() < 2 {
            return false;
        }

        let elapsed_ms = cluster.elapsed().num_milliseconds();
        if elapsed_ms <= self.auto_accept_secs.saturating_mul(1000) {
            return true;
        }

        elapsed_ms <= self.coherent_max_secs.saturating_mul(1000)
            && has_topic_coherence(cluster.members(), &self.partner_keyword)
    }
}

/// Whether a group of posts shares enough vocabulary to read as one topic.
///
/// Any one of these signals is sufficient:
/// - hashtags and mentions repeat (fewer than 80% of them are distinct);
/// - two or more members use a term from the same keyword group;
/// - two or more members mention `partner_keyword`.
#[must_use]
pub fn has_topic_coherence(posts: &[Post], partner_keyword: &str) -> bool {
    let texts: Vec<String> = posts.iter().map(|p| p.text.to_lowercase()).collect();

    let key_terms: Vec<&str> = texts
        .iter()
        .flat_map(|t| t.split_whitespace())
        .filter(|w| w.starts_with('#') || w.starts_with('@'))
        .collect();
    let distinct: HashSet<&str> = key_terms.iter().copied().collect();
    if distinct.len() * 5 < key_terms.len() * 4 {
        return true;
    }

    for group in TERM_GROUPS {
        let members = texts
            .iter()
            .filter(|t| group.iter().any(|term| t.contains(term)))
            .count();
        if members >= 2 {
            return true;
        }
    }

    let partner = partner_keyword.to_lowercase();
    !partner.is_empty() && texts.iter().filter(|t| t.contains(&partner)).count() >= 2
}

/// Selectable classification policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClassifierPolicy {
    /// Window membership alone decides.
    #[default]
    WindowOnly,
    /// Elapsed time plus content coherence.
    HeuristicAugmented,
}

impl ClassifierPolicy {
    /// Parse a policy name. Accepts `window-only`/`window` and
    /// `heuristic`/`heuristic-augmented`, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "window-only" | "window" => Some(Self::WindowOnly),
            "heuristic" | "heuristic-augmented" => Some(Self::HeuristicAugmented),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WindowOnly => "window-only",
            Self::HeuristicAugmented => "heuristic",
        }
    }

    /// Classifier implementing this policy with default settings.
    #[must_use]
    pub fn classifier(&self) -> Box<dyn ThreadClassifier> {
        match self {
            Self::WindowOnly => Box::new(WindowOnly),
            Self::HeuristicAugmented => Box::new(HeuristicAugmented::default()),
        }
    }
}

impl fmt::Display for ClassifierPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clusters split by classification outcome.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub threads: Vec<Cluster>,
    /// Members of single-post and rejected clusters.
    pub standalone: Vec<Post>,
}

impl Classified {
    /// Number of posts absorbed into threads.
    #[must_use]
    pub fn posts_in_threads(&self) -> usize {
        self.threads.iter().map(Cluster::len).sum()
    }
}

/// Sort clusters into threads and standalone posts.
#[must_use]
pub fn classify(clusters: Vec<Cluster>, classifier: &dyn ThreadClassifier) -> Classified {
    let mut classified = Classified::default();
    for cluster in clusters {
        if classifier.is_thread(&cluster) {
            classified.threads.push(cluster);
        } else {
            classified.standalone.extend(cluster.into_members());
        }
    }
    classified
}
