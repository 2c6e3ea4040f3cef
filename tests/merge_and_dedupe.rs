#[path = "common/mod.rs"]
mod common;

use common::*;
use media_ingest::{
    deduplicate, duplicate_stats, merge_file_results, parse_files, parse_files_parallel, parse_post, IngestError,
    IngestReport, Ingestor, ParsedBatch, Platform, Post,
};
use serde_json::json;
use std::path::PathBuf;
use time::macros::datetime;
use time::OffsetDateTime;

fn post(id: &str, liked: u64, captured: Option<OffsetDateTime>) -> Post {
    parse_post(&dy_post_with(id, liked), None).unwrap().with_capture(captured, "mem")
}

fn batch_of(posts: Vec<Post>) -> ParsedBatch {
    ParsedBatch {
        success_count: posts.len(),
        total_records: posts.len(),
        platform: Some(Platform::Dy),
        posts,
        ..ParsedBatch::default()
    }
}

/// Two captures of the same post: the later-dated file wins, in either input order.
#[test]
fn later_capture_wins_across_files() {
    let dir = scratch_dir();
    let older = write_json(&dir, "capture_2024_01_01_00_00_00.json", &json!([dy_post_with("42", 100)]));
    let newer = write_json(&dir, "capture_2024_01_02_00_00_00.json", &json!([dy_post_with("42", 250)]));

    let merged = parse_files(&[&older, &newer], true);
    assert_eq!(merged.posts.len(), 1);
    assert_eq!(merged.posts[0].liked_count, 250);
    assert_eq!(merged.posts[0].capture_time, Some(datetime!(2024-01-02 00:00:00 UTC)));
    assert_eq!(merged.total_records, 2);
    assert_eq!(merged.success_count, 1);

    let reversed = parse_files(&[&newer, &older], true);
    assert_eq!(reversed.posts.len(), 1);
    assert_eq!(reversed.posts[0].liked_count, 250);

    let kept = parse_files(&[&older, &newer], false);
    assert_eq!(kept.posts.len(), 2);
    assert_eq!(kept.success_count, 2);
}

/// The rule is applied against the retained record, so it holds across many duplicates.
#[test]
fn resolution_is_transitive() {
    let d = |day: u8| Some(datetime!(2024-01-01 00:00:00 UTC).replace_day(day).unwrap());
    let batch = batch_of(vec![
        post("1", 1, d(3)),
        post("2", 9, None),
        post("1", 2, d(5)),
        post("1", 3, d(4)),
        post("1", 4, d(2)),
    ]);
    let out = deduplicate(&batch);
    assert_eq!(out.posts.len(), 2);
    // first-seen key order is kept
    assert_eq!(out.posts[0].content_id, "1");
    assert_eq!(out.posts[0].liked_count, 2);
    assert_eq!(out.posts[1].content_id, "2");
}

/// Without both capture times the later position wins.
#[test]
fn missing_capture_time_means_last_wins() {
    let t = Some(datetime!(2024-06-01 00:00:00 UTC));
    let out = deduplicate(&batch_of(vec![post("1", 1, t), post("1", 2, None)]));
    assert_eq!(out.posts[0].liked_count, 2);

    let out = deduplicate(&batch_of(vec![post("1", 1, None), post("1", 2, t)]));
    assert_eq!(out.posts[0].liked_count, 2);

    let out = deduplicate(&batch_of(vec![post("1", 1, None), post("1", 2, None), post("1", 3, None)]));
    assert_eq!(out.posts[0].liked_count, 3);
}

/// Keys include the platform: the same id on two platforms is two records.
#[test]
fn keys_are_per_platform() {
    let dy = post("same", 1, None);
    let xhs = parse_post(&json!({"note_id": "same"}), None).unwrap();
    let out = deduplicate(&batch_of(vec![dy, xhs]));
    assert_eq!(out.posts.len(), 2);
}

#[test]
fn dedupe_is_idempotent_and_counts() {
    let batch = batch_of(vec![post("1", 1, None), post("1", 2, None), post("1", 3, None), post("2", 1, None)]);
    let stats = duplicate_stats(&batch);
    assert_eq!(stats.duplicate_posts, 2);
    assert_eq!(stats.duplicate_comments, 0);
    assert_eq!(stats.total_duplicates, 2);
    assert_eq!(batch.deduplication_stats(), stats);

    let once = batch.deduplicate();
    let twice = once.deduplicate();
    assert_eq!(once, twice);
    assert_eq!(once.success_count, 2);
    assert_eq!(once.total_records, 4);
    assert_eq!(once.deduplication_stats().total_duplicates, 0);
}

/// Comments are deduplicated on their own key.
#[test]
fn comments_dedupe_by_comment_id() {
    let dir = scratch_dir();
    let mut edited = dy_comment();
    edited["like_count"] = json!(99);
    let a = write_json(&dir, "c_2024_01_01_00_00_00.json", &json!([dy_comment()]));
    let b = write_json(&dir, "c_2024_01_03_00_00_00.json", &json!([edited]));

    let merged = parse_files(&[a, b], true);
    assert_eq!(merged.comments.len(), 1);
    assert_eq!(merged.comments[0].like_count, 99);
}

/// A file that fails outright becomes one error line; the others still merge.
#[test]
fn failed_files_become_errors() {
    let dir = scratch_dir();
    let good = write_json(&dir, "good.json", &json!([dy_post(), {"unknown_field": 1}]));
    let missing = dir.join("nope.json");

    let merged = parse_files(&[good.clone(), missing.clone()], true);
    assert_eq!(merged.posts.len(), 1);
    assert_eq!(merged.error_count, 2);
    assert_eq!(merged.errors[0], "record 2: unrecognized platform or format");
    assert!(merged.errors[1].starts_with(&missing.display().to_string()));
    assert_eq!(merged.platform, Some(Platform::Dy));
}

/// The merged platform is the first file's non-empty one.
#[test]
fn merged_platform_is_first_non_empty() {
    let results: Vec<Result<ParsedBatch, IngestError>> = vec![
        Ok(ParsedBatch::default()),
        Ok(batch_of(vec![post("1", 1, None)])),
        Ok(ParsedBatch {
            platform: Some(Platform::Xhs),
            ..ParsedBatch::default()
        }),
    ];
    let paths = [PathBuf::from("a.json"), PathBuf::from("b.json"), PathBuf::from("c.json")];
    let merged = merge_file_results(&paths, results, false);
    assert_eq!(merged.platform, Some(Platform::Dy));
    assert_eq!(merged.success_count, 1);
}

/// Parsing on several threads yields exactly the sequential result.
#[test]
fn parallel_matches_sequential() {
    let dir = scratch_dir();
    let mut files = Vec::new();
    for i in 0..12 {
        let name = format!("capture_2024_01_{:02}_00_00_00.json", i + 1);
        files.push(write_json(&dir, &name, &json!([dy_post_with("1", i), dy_post_with(&format!("p{i}"), i)])));
    }
    files.push(dir.join("absent.json"));

    let sequential = parse_files(&files, true);
    let parallel = parse_files_parallel(&files, None, true, 4, None);
    assert_eq!(sequential, parallel);
    assert_eq!(parallel.posts.len(), 13);
    assert_eq!(parallel.posts[0].liked_count, 11);
    assert_eq!(parallel.error_count, 1);
}

/// A directory input is searched recursively; hidden and non-JSON files are skipped.
#[test]
fn ingestor_over_a_directory() {
    let dir = scratch_dir();
    write_json(&dir, "posts/capture.json", &json!([dy_post(), xhs_post()]));
    write_json(&dir, "comments/capture.json", &json!([dy_comment(), xhs_comment()]));
    write_json(&dir, ".cache/capture.json", &json!([bili_post()]));
    write_text(&dir, "notes.txt", "not json");

    let batch = Ingestor::new().parallelism(2).run(&[&dir]);
    assert_eq!(batch.posts.len(), 2);
    assert_eq!(batch.comments.len(), 2);
    assert_eq!(batch.error_count, 0);
    assert!(batch.posts.iter().all(|p| p.platform != Platform::Bili));

    let totals = batch.total_interactions();
    assert_eq!(totals.likes, 15057 + 1000);
    assert_eq!(totals.shares, 578 + 50);
    // dy poster, xhs poster, dy commenter, xhs commenter
    assert_eq!(batch.user_count(), 4);

    let only_xhs = batch.filter_platform(Platform::Xhs);
    assert_eq!(only_xhs.posts.len(), 1);
    assert_eq!(only_xhs.comments.len(), 1);
    assert_eq!(only_xhs.platform, Some(Platform::Xhs));
    assert_eq!(only_xhs.success_count, 2);
}

#[test]
fn display_errors_is_capped() {
    let batch = ParsedBatch {
        errors: (1..=5).map(|i| format!("e{i}")).collect(),
        error_count: 5,
        ..ParsedBatch::default()
    };
    assert_eq!(batch.display_errors(2), vec!["e1", "e2", "... and 3 more"]);
    assert_eq!(batch.display_errors(10).len(), 5);
}

#[test]
fn empty_inputs_give_an_empty_batch() {
    let dir = scratch_dir();
    let batch = Ingestor::new().run(&[&dir]);
    assert!(batch.is_empty());
    assert_eq!(batch.total_records, 0);
    assert_eq!(batch.platform, None);
}

/// A run reports the duplicates it collapsed and the record count before dedup.
#[test]
fn run_report_counts_collapsed_duplicates() {
    let dir = scratch_dir();
    write_json(&dir, "capture_2024_01_01_00_00_00.json", &json!([dy_post_with("42", 100), dy_comment()]));
    write_json(&dir, "capture_2024_01_02_00_00_00.json", &json!([dy_post_with("42", 250), dy_comment()]));

    let report: IngestReport = Ingestor::new().run_report(&[&dir]);
    assert_eq!(report.raw_success_count, 4);
    assert_eq!(report.duplicates.duplicate_posts, 1);
    assert_eq!(report.duplicates.duplicate_comments, 1);
    assert_eq!(report.duplicates.total_duplicates, 2);
    assert_eq!(report.batch.posts.len(), 1);
    assert_eq!(report.batch.posts[0].liked_count, 250);
    assert_eq!(report.batch.success_count, 2);
    assert_eq!(report.batch.total_records, 4);

    // dedup off: the same figures, nothing collapsed
    let kept = Ingestor::new().deduplicate(false).run_report(&[&dir]);
    assert_eq!(kept.duplicates.total_duplicates, 2);
    assert_eq!(kept.batch.posts.len(), 2);
    assert_eq!(kept.batch.success_count, 4);

    assert_eq!(Ingestor::new().run(&[&dir]), report.batch);
}

/// Interaction totals saturate instead of overflowing.
#[test]
fn interaction_totals_saturate() {
    let mut big = post("1", 0, None);
    big.liked_count = u64::MAX;
    let batch = batch_of(vec![big, post("2", 1, None)]);
    let totals = batch.total_interactions();
    assert_eq!(totals.likes, u64::MAX);
    assert_eq!(totals.shares, 0);
}
