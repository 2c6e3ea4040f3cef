//! Collapse repeated observations of the same post/comment into one.
//!
//! Keys are `(platform, content_id)` for posts and `(platform, comment_id)` for
//! comments. Within a key the record with the strictly later capture time is kept;
//! if either side lacks a capture time the later-encountered record wins. The scan
//! always compares against the currently retained record, so the rule holds across
//! any number of duplicates. Output keeps first-seen key order.

use crate::models::{Comment, DedupStats, ParsedBatch, Post};
use crate::platform::Platform;
use ahash::AHashMap;
use time::OffsetDateTime;

/// Anything with a natural key and an optional capture time.
trait Observation {
    fn natural_key(&self) -> (Platform, &str);
    fn captured_at(&self) -> Option<OffsetDateTime>;
}

impl Observation for Post {
    fn natural_key(&self) -> (Platform, &str) { (self.platform, &self.content_id) }
    fn captured_at(&self) -> Option<OffsetDateTime> { self.capture_time }
}

impl Observation for Comment {
    fn natural_key(&self) -> (Platform, &str) { (self.platform, &self.comment_id) }
    fn captured_at(&self) -> Option<OffsetDateTime> { self.capture_time }
}

/// True when `candidate` should replace `retained`.
fn supersedes<T: Observation>(candidate: &T, retained: &T) -> bool {
    match (candidate.captured_at(), retained.captured_at()) {
        (Some(new), Some(old)) => new > old,
        _ => true,
    }
}

fn dedupe_records<T: Observation + Clone>(records: &[T]) -> Vec<T> {
    let mut slot_of: AHashMap<(Platform, &str), usize> = AHashMap::with_capacity(records.len());
    let mut kept: Vec<&T> = Vec::with_capacity(records.len());

    for rec in records {
        match slot_of.get(&rec.natural_key()) {
            Some(&i) => {
                if supersedes(rec, kept[i]) {
                    kept[i] = rec;
                }
            }
            None => {
                slot_of.insert(rec.natural_key(), kept.len());
                kept.push(rec);
            }
        }
    }

    kept.into_iter().cloned().collect()
}

fn extra_occurrences<T: Observation>(records: &[T]) -> usize {
    let mut seen: AHashMap<(Platform, &str), usize> = AHashMap::with_capacity(records.len());
    for rec in records {
        *seen.entry(rec.natural_key()).or_insert(0) += 1;
    }
    seen.values().map(|n| n - 1).sum()
}

/// Deduplicate a batch into a new one. `success_count` becomes the number of
/// surviving records; `total_records`, `error_count` and `errors` carry through.
pub fn deduplicate(batch: &ParsedBatch) -> ParsedBatch {
    let posts = dedupe_records(&batch.posts);
    let comments = dedupe_records(&batch.comments);

    let dropped = (batch.posts.len() - posts.len()) + (batch.comments.len() - comments.len());
    if dropped > 0 {
        tracing::info!(
            "Deduplicated {} records ({} posts, {} comments kept).",
            dropped,
            posts.len(),
            comments.len()
        );
    }

    ParsedBatch {
        success_count: posts.len() + comments.len(),
        posts,
        comments,
        platform: batch.platform,
        total_records: batch.total_records,
        error_count: batch.error_count,
        errors: batch.errors.clone(),
    }
}

/// Count duplicates per kind without deduplicating.
pub fn duplicate_stats(batch: &ParsedBatch) -> DedupStats {
    let duplicate_posts = extra_occurrences(&batch.posts);
    let duplicate_comments = extra_occurrences(&batch.comments);
    DedupStats {
        duplicate_posts,
        duplicate_comments,
        total_duplicates: duplicate_posts + duplicate_comments,
    }
}
