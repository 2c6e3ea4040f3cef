//! Canonical records shared by every platform, and the batch container that
//! ingestion produces.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use time::OffsetDateTime;

/// What kind of content a post carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Note,
    Article,
    #[default]
    Unknown,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Video => "video",
            ContentKind::Note => "note",
            ContentKind::Article => "article",
            ContentKind::Unknown => "unknown",
        }
    }
}

/// Author identity fields, identical in shape for posts and comments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub user_id: String,
    /// Platform-specific secondary id (`sec_uid` on dy).
    pub sec_uid: String,
    pub short_user_id: String,
    pub user_unique_id: String,
    pub nickname: String,
    pub avatar: String,
    pub signature: String,
}

/// One video/note/article observation.
///
/// `(platform, content_id)` is the natural key; several observations of the same
/// key may exist with different capture times until deduplication.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub content_id: String,
    pub platform: Platform,
    pub content_kind: ContentKind,

    pub title: String,
    pub desc: String,
    pub content_url: String,
    pub cover_url: String,
    pub media_urls: Vec<String>,

    #[serde(default, with = "time::serde::rfc3339::option")]
    pub create_time: Option<OffsetDateTime>,
    pub last_modify_ts: Option<i64>,

    pub author: Author,

    pub liked_count: u64,
    pub collected_count: u64,
    pub comment_count: u64,
    pub share_count: u64,

    pub ip_location: String,
    pub source_keyword: String,

    #[serde(default, with = "time::serde::rfc3339::option")]
    pub capture_time: Option<OffsetDateTime>,
    pub source_file: String,

    /// The record as captured, kept for lossy-recovery use. Not exported to tables.
    #[serde(default)]
    pub raw_data: Map<String, Value>,
}

impl Post {
    /// Copy of this post stamped with capture metadata.
    pub fn with_capture(&self, capture_time: Option<OffsetDateTime>, source_file: impl Into<String>) -> Self {
        Self { capture_time, source_file: source_file.into(), ..self.clone() }
    }
}

/// One comment or reply.
///
/// `(platform, comment_id)` is the natural key. `is_sub_comment` holds exactly when
/// `parent_comment_id` is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub content_id: String,
    pub platform: Platform,

    pub content: String,
    pub pictures: Vec<String>,

    #[serde(default, with = "time::serde::rfc3339::option")]
    pub create_time: Option<OffsetDateTime>,
    pub last_modify_ts: Option<i64>,

    pub author: Author,

    pub like_count: u64,
    pub sub_comment_count: u64,

    pub parent_comment_id: Option<String>,
    pub is_sub_comment: bool,

    pub ip_location: String,

    #[serde(default, with = "time::serde::rfc3339::option")]
    pub capture_time: Option<OffsetDateTime>,
    pub source_file: String,

    #[serde(default)]
    pub raw_data: Map<String, Value>,
}

impl Comment {
    /// Copy of this comment stamped with capture metadata.
    pub fn with_capture(&self, capture_time: Option<OffsetDateTime>, source_file: impl Into<String>) -> Self {
        Self { capture_time, source_file: source_file.into(), ..self.clone() }
    }
}

/// Summed interaction counters over the posts of a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Interactions {
    pub likes: u64,
    pub collects: u64,
    pub comments: u64,
    pub shares: u64,
}

/// Extra occurrences per natural key, i.e. how many records deduplication would drop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    pub duplicate_posts: usize,
    pub duplicate_comments: usize,
    pub total_duplicates: usize,
}

/// Output of ingesting one or more capture files.
///
/// For a single file `success_count + error_count == total_records`. After a
/// multi-file merge with deduplication, `success_count` counts surviving records
/// while `total_records` still counts raw input elements.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedBatch {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub platform: Option<Platform>,
    pub total_records: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

impl ParsedBatch {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.comments.is_empty()
    }

    /// Counter sums over posts; saturates at `u64::MAX`.
    pub fn total_interactions(&self) -> Interactions {
        self.posts.iter().fold(Interactions::default(), |acc, p| Interactions {
            likes: acc.likes.saturating_add(p.liked_count),
            collects: acc.collects.saturating_add(p.collected_count),
            comments: acc.comments.saturating_add(p.comment_count),
            shares: acc.shares.saturating_add(p.share_count),
        })
    }

    /// Distinct `(platform, user_id)` pairs across posts and comments; empty ids are ignored.
    pub fn user_count(&self) -> usize {
        let posts = self.posts.iter().map(|p| (p.platform, p.author.user_id.as_str()));
        let comments = self.comments.iter().map(|c| (c.platform, c.author.user_id.as_str()));
        posts
            .chain(comments)
            .filter(|(_, uid)| !uid.is_empty())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Read-only duplicate counts; does not deduplicate.
    pub fn deduplication_stats(&self) -> DedupStats {
        crate::dedupe::duplicate_stats(self)
    }

    /// Deduplicated copy of this batch; see [`crate::deduplicate`].
    pub fn deduplicate(&self) -> ParsedBatch {
        crate::dedupe::deduplicate(self)
    }

    /// New batch that keeps only records of `platform`. Counters describe the kept records.
    pub fn filter_platform(&self, platform: Platform) -> ParsedBatch {
        let posts: Vec<Post> = self.posts.iter().filter(|p| p.platform == platform).cloned().collect();
        let comments: Vec<Comment> = self.comments.iter().filter(|c| c.platform == platform).cloned().collect();
        let kept = posts.len() + comments.len();
        ParsedBatch {
            posts,
            comments,
            platform: Some(platform),
            total_records: kept,
            success_count: kept,
            error_count: 0,
            errors: Vec::new(),
        }
    }

    /// Errors capped at `limit` lines for display, with a trailing summary line.
    pub fn display_errors(&self, limit: usize) -> Vec<String> {
        let mut out: Vec<String> = self.errors.iter().take(limit).cloned().collect();
        if self.errors.len() > limit {
            out.push(format!("... and {} more", self.errors.len() - limit));
        }
        out
    }
}
