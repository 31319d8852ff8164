//! Integration tests for reading raw exports and writing processed files.

use std::path::Path;

use tempfile::TempDir;
use thread_consolidator::progress::{NullReporter, ProgressEvent};
use thread_consolidator::records::{
    processed_file_name, read_raw_file, resolve_input, write_processed_file,
};
use thread_consolidator::{consolidate, EngineOptions};

const RAW_EXPORT: &str = "\
tweet_id,created_at,text,like_count,retweet_count,reply_count,quote_count,author_id
1955,Tue Aug 12 13:14:00 +0000 2025,Third part,1,0,0,0,77
1954,Tue Aug 12 13:13:00 +0000 2025,Second part,2,0,0,0,77
1953,Tue Aug 12 13:12:30 +0000 2025,\"First part
with a line break\",3,1,0,0,77
1900,Mon Aug 11 08:00:00 +0000 2025,Standalone announcement,40,12,3,1,77
,Mon Aug 11 07:00:00 +0000 2025,Row without id,0,0,0,0,77
";

fn write_raw(dir: &Path, name: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), RAW_EXPORT).unwrap();
}

#[test]
fn test_consolidate_file_end_to_end() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let raw_dir = temp.path().join("raw");
    let processed_dir = temp.path().join("processed");
    write_raw(&raw_dir, "raw-Mantle-2025-08-12.csv");

    // Bare file names are resolved against the raw directory
    let input = resolve_input(Path::new("raw-Mantle-2025-08-12.csv"), &raw_dir)
        .expect("input should resolve");

    let records = read_raw_file(&input).unwrap();
    assert_eq!(records.len(), 5);

    let mut events: Vec<ProgressEvent> = Vec::new();
    let run = consolidate(&records, &EngineOptions::default(), &mut events).unwrap();
    assert_eq!(events[0], ProgressEvent::status("Loaded 4 posts"));
    assert_eq!(run.stats.dropped_rows, 1);

    let file_name = processed_file_name(&input);
    assert_eq!(file_name, "processed-Mantle-2025-08-12.csv");
    let output = write_processed_file(&processed_dir, &file_name, &run.posts, false).unwrap();
    assert_eq!(output, processed_dir.join("processed-Mantle-2025-08-12.csv"));

    let written = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "tweet_id,timestamp,text");
    assert_eq!(
        lines[1],
        "1953,Tue Aug 12 13:12:30 +0000 2025,First part with a line break  Second part  Third part"
    );
    assert_eq!(
        lines[2],
        "1900,Mon Aug 11 08:00:00 +0000 2025,Standalone announcement"
    );
}

#[test]
fn test_extended_output_columns() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    write_raw(temp.path(), "export.csv");
    let input = temp.path().join("export.csv");

    let records = read_raw_file(&input).unwrap();
    let run = consolidate(&records, &EngineOptions::default(), &mut NullReporter).unwrap();
    let output = write_processed_file(
        temp.path(),
        &processed_file_name(&input),
        &run.posts,
        true,
    )
    .unwrap();

    assert!(output.ends_with("processed-export.csv"));
    let written = std::fs::read_to_string(&output).unwrap();
    let mut reader = csv::Reader::from_reader(written.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["tweet_id", "timestamp", "text", "is_thread", "member_count"]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(&rows[0][3], "true");
    assert_eq!(&rows[0][4], "3");
    assert_eq!(&rows[1][3], "false");
    assert_eq!(&rows[1][4], "1");
}

#[test]
fn test_missing_input_does_not_resolve() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    assert!(resolve_input(Path::new("nope.csv"), temp.path()).is_none());
    assert!(read_raw_file(&temp.path().join("nope.csv")).is_err());
}
