//! CSV adapter for raw and processed post files.
//!
//! Raw files carry `tweet_id,created_at,text` plus optional engagement
//! columns. Processed files carry `tweet_id,timestamp,text`, optionally
//! followed by `is_thread,member_count`.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::post::{ConsolidatedPost, RawRecord};

/// One row of a raw export. Every column is optional at this layer.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    tweet_id: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    like_count: Option<String>,
    #[serde(default)]
    retweet_count: Option<String>,
    #[serde(default)]
    reply_count: Option<String>,
    #[serde(default)]
    quote_count: Option<String>,
    #[serde(default)]
    author_id: Option<String>,
}

impl RawRow {
    fn into_record(self) -> RawRecord {
        let id = self.tweet_id;
        RawRecord {
            like_count: parse_counter(&id, "like_count", self.like_count.as_deref()),
            retweet_count: parse_counter(&id, "retweet_count", self.retweet_count.as_deref()),
            reply_count: parse_counter(&id, "reply_count", self.reply_count.as_deref()),
            quote_count: parse_counter(&id, "quote_count", self.quote_count.as_deref()),
            author_id: self.author_id,
            id,
            raw_timestamp: self.created_at,
            text: self.text,
        }
    }
}

/// Blank counters are absent; garbage counters are absent with a warning.
fn parse_counter(id: &str, column: &str, value: Option<&str>) -> Option<u64> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(id = %id, column, value, "Ignoring unparseable counter");
            None
        }
    }
}

#[derive(Debug, Serialize)]
struct ProcessedRow<'a> {
    tweet_id: &'a str,
    timestamp: &'a str,
    text: String,
}

#[derive(Debug, Serialize)]
struct ExtendedRow<'a> {
    tweet_id: &'a str,
    timestamp: &'a str,
    text: String,
    is_thread: bool,
    member_count: usize,
}

/// Flatten line breaks so each record stays on one line.
#[must_use]
pub fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Read raw records from any reader.
///
/// # Errors
///
/// Returns an error if the input is not valid CSV.
pub fn read_raw<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<RawRow>().enumerate() {
        let row = row.with_context(|| format!("Failed to parse CSV row {}", index + 1))?;
        records.push(row.into_record());
    }
    Ok(records)
}

/// Read raw records from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn read_raw_file(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let records = read_raw(file).with_context(|| format!("Failed to read {}", path.display()))?;
    info!(rows = records.len(), path = %path.display(), "Loaded raw records");
    Ok(records)
}

/// Write consolidated posts, optionally with provenance columns.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_processed<W: Write>(writer: W, posts: &[ConsolidatedPost], extended: bool) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    for post in posts {
        if extended {
            csv_writer.serialize(ExtendedRow {
                tweet_id: &post.id,
                timestamp: &post.timestamp,
                text: single_line(&post.text),
                is_thread: post.is_thread,
                member_count: post.member_count,
            })?;
        } else {
            csv_writer.serialize(ProcessedRow {
                tweet_id: &post.id,
                timestamp: &post.timestamp,
                text: single_line(&post.text),
            })?;
        }
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write consolidated posts into `dir/file_name`, creating `dir` if needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_processed_file(
    dir: &Path,
    file_name: &str,
    posts: &[ConsolidatedPost],
    extended: bool,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(file_name);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_processed(std::io::BufWriter::new(file), posts, extended)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(posts = posts.len(), path = %path.display(), "Saved consolidated posts");
    Ok(path)
}

/// Output file name for an input path: `raw-x.csv` becomes
/// `processed-x.csv`, anything else gets a `processed-` prefix.
#[must_use]
pub fn processed_file_name(input: &Path) -> String {
    let base = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match base.strip_prefix("raw-") {
        Some(rest) => format!("processed-{rest}"),
        None => format!("processed-{base}"),
    }
}

/// Report file name for an input path: `raw-x.csv` becomes
/// `threads-x.json`, anything else gets a `threads-` prefix.
#[must_use]
pub fn analysis_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem.strip_prefix("raw-").unwrap_or(&stem);
    format!("threads-{stem}.json")
}

/// Write `value` as pretty JSON into `dir/file_name`, creating `dir` if
/// needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_json_file<T: Serialize>(
    dir: &Path,
    file_name: &str,
    value: &T,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(file_name);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    info!(path = %path.display(), "Saved JSON report");
    Ok(path)
}

/// Resolve an input path, trying `raw_dir` when it does not exist as given.
#[must_use]
pub fn resolve_input(input: &Path, raw_dir: &Path) -> Option<PathBuf> {
    if input.exists() {
        return Some(input.to_path_buf());
    }
    let candidate = raw_dir.join(input);
    candidate.exists().then_some(candidate)
}
