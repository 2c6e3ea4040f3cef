//! Tabular export of canonical records.
//!
//! Rows leave out the raw field bag, render times as RFC 3339 text (empty when
//! absent) and join URL lists with commas. Writers go through a temp file that is
//! promoted once complete.

use crate::models::{Comment, ParsedBatch, Post};
use crate::util::{create_with_backoff, promote_file};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostRow {
    pub content_id: String,
    pub platform: String,
    pub content_kind: String,
    pub title: String,
    pub desc: String,
    pub content_url: String,
    pub cover_url: String,
    pub media_urls: String,
    pub create_time: String,
    pub last_modify_ts: String,
    pub user_id: String,
    pub sec_uid: String,
    pub short_user_id: String,
    pub user_unique_id: String,
    pub nickname: String,
    pub avatar: String,
    pub user_signature: String,
    pub liked_count: u64,
    pub collected_count: u64,
    pub comment_count: u64,
    pub share_count: u64,
    pub ip_location: String,
    pub source_keyword: String,
    pub capture_time: String,
    pub source_file: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommentRow {
    pub comment_id: String,
    pub content_id: String,
    pub platform: String,
    pub content: String,
    pub pictures: String,
    pub create_time: String,
    pub last_modify_ts: String,
    pub user_id: String,
    pub sec_uid: String,
    pub short_user_id: String,
    pub user_unique_id: String,
    pub nickname: String,
    pub avatar: String,
    pub user_signature: String,
    pub like_count: u64,
    pub sub_comment_count: u64,
    pub parent_comment_id: String,
    pub is_sub_comment: bool,
    pub ip_location: String,
    pub capture_time: String,
    pub source_file: String,
}

const POST_COLUMNS: [&str; 25] = [
    "content_id", "platform", "content_kind", "title", "desc", "content_url", "cover_url",
    "media_urls", "create_time", "last_modify_ts", "user_id", "sec_uid", "short_user_id",
    "user_unique_id", "nickname", "avatar", "user_signature", "liked_count", "collected_count",
    "comment_count", "share_count", "ip_location", "source_keyword", "capture_time", "source_file",
];

const COMMENT_COLUMNS: [&str; 21] = [
    "comment_id", "content_id", "platform", "content", "pictures", "create_time", "last_modify_ts",
    "user_id", "sec_uid", "short_user_id", "user_unique_id", "nickname", "avatar", "user_signature",
    "like_count", "sub_comment_count", "parent_comment_id", "is_sub_comment", "ip_location",
    "capture_time", "source_file",
];

pub fn time_text(t: Option<OffsetDateTime>) -> String {
    t.and_then(|t| t.format(&Rfc3339).ok()).unwrap_or_default()
}

impl From<&Post> for PostRow {
    fn from(p: &Post) -> Self {
        Self {
            content_id: p.content_id.clone(),
            platform: p.platform.to_string(),
            content_kind: p.content_kind.as_str().to_string(),
            title: p.title.clone(),
            desc: p.desc.clone(),
            content_url: p.content_url.clone(),
            cover_url: p.cover_url.clone(),
            media_urls: p.media_urls.join(","),
            create_time: time_text(p.create_time),
            last_modify_ts: p.last_modify_ts.map(|t| t.to_string()).unwrap_or_default(),
            user_id: p.author.user_id.clone(),
            sec_uid: p.author.sec_uid.clone(),
            short_user_id: p.author.short_user_id.clone(),
            user_unique_id: p.author.user_unique_id.clone(),
            nickname: p.author.nickname.clone(),
            avatar: p.author.avatar.clone(),
            user_signature: p.author.signature.clone(),
            liked_count: p.liked_count,
            collected_count: p.collected_count,
            comment_count: p.comment_count,
            share_count: p.share_count,
            ip_location: p.ip_location.clone(),
            source_keyword: p.source_keyword.clone(),
            capture_time: time_text(p.capture_time),
            source_file: p.source_file.clone(),
        }
    }
}

impl From<&Comment> for CommentRow {
    fn from(c: &Comment) -> Self {
        Self {
            comment_id: c.comment_id.clone(),
            content_id: c.content_id.clone(),
            platform: c.platform.to_string(),
            content: c.content.clone(),
            pictures: c.pictures.join(","),
            create_time: time_text(c.create_time),
            last_modify_ts: c.last_modify_ts.map(|t| t.to_string()).unwrap_or_default(),
            user_id: c.author.user_id.clone(),
            sec_uid: c.author.sec_uid.clone(),
            short_user_id: c.author.short_user_id.clone(),
            user_unique_id: c.author.user_unique_id.clone(),
            nickname: c.author.nickname.clone(),
            avatar: c.author.avatar.clone(),
            user_signature: c.author.signature.clone(),
            like_count: c.like_count,
            sub_comment_count: c.sub_comment_count,
            parent_comment_id: c.parent_comment_id.clone().unwrap_or_default(),
            is_sub_comment: c.is_sub_comment,
            ip_location: c.ip_location.clone(),
            capture_time: time_text(c.capture_time),
            source_file: c.source_file.clone(),
        }
    }
}

impl PostRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.content_id.clone(), self.platform.clone(), self.content_kind.clone(),
            self.title.clone(), self.desc.clone(), self.content_url.clone(), self.cover_url.clone(),
            self.media_urls.clone(), self.create_time.clone(), self.last_modify_ts.clone(),
            self.user_id.clone(), self.sec_uid.clone(), self.short_user_id.clone(),
            self.user_unique_id.clone(), self.nickname.clone(), self.avatar.clone(),
            self.user_signature.clone(), self.liked_count.to_string(),
            self.collected_count.to_string(), self.comment_count.to_string(),
            self.share_count.to_string(), self.ip_location.clone(), self.source_keyword.clone(),
            self.capture_time.clone(), self.source_file.clone(),
        ]
    }
}

impl CommentRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.comment_id.clone(), self.content_id.clone(), self.platform.clone(),
            self.content.clone(), self.pictures.clone(), self.create_time.clone(),
            self.last_modify_ts.clone(), self.user_id.clone(), self.sec_uid.clone(),
            self.short_user_id.clone(), self.user_unique_id.clone(), self.nickname.clone(),
            self.avatar.clone(), self.user_signature.clone(), self.like_count.to_string(),
            self.sub_comment_count.to_string(), self.parent_comment_id.clone(),
            self.is_sub_comment.to_string(), self.ip_location.clone(), self.capture_time.clone(),
            self.source_file.clone(),
        ]
    }
}

pub fn post_rows(posts: &[Post]) -> Vec<PostRow> {
    posts.iter().map(PostRow::from).collect()
}

pub fn comment_rows(comments: &[Comment]) -> Vec<CommentRow> {
    comments.iter().map(CommentRow::from).collect()
}

/// Tabs and line breaks inside a cell would break the row layout.
fn tsv_cell(s: &str) -> String {
    s.replace(['\t', '\r', '\n'], " ")
}

fn tmp_path_for(out: &Path) -> PathBuf {
    let mut name = out.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".inprogress");
    out.with_file_name(name)
}

/// Write through a temp file next to `out`, promoted when `body` succeeds.
fn write_atomic(out: &Path, body: impl FnOnce(&mut BufWriter<std::fs::File>) -> Result<()>) -> Result<()> {
    let tmp = tmp_path_for(out);
    let f = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let mut w = BufWriter::new(f);
    body(&mut w)?;
    w.flush().with_context(|| format!("flush {}", tmp.display()))?;
    drop(w);
    promote_file(&tmp, out).with_context(|| format!("promote {} -> {}", tmp.display(), out.display()))
}

fn write_tsv(out: &Path, header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> Result<usize> {
    let mut n = 0usize;
    write_atomic(out, |w| {
        writeln!(w, "{}", header.join("\t"))?;
        for cells in rows {
            let line: Vec<String> = cells.iter().map(|c| tsv_cell(c)).collect();
            writeln!(w, "{}", line.join("\t"))?;
            n += 1;
        }
        Ok(())
    })?;
    Ok(n)
}

/// Posts as TSV with a header row. Returns the number of data rows.
pub fn write_posts_tsv(posts: &[Post], out: &Path) -> Result<usize> {
    write_tsv(out, &POST_COLUMNS, posts.iter().map(|p| PostRow::from(p).cells()))
}

/// Comments as TSV with a header row. Returns the number of data rows.
pub fn write_comments_tsv(comments: &[Comment], out: &Path) -> Result<usize> {
    write_tsv(out, &COMMENT_COLUMNS, comments.iter().map(|c| CommentRow::from(c).cells()))
}

/// One JSON object per line: post rows first, then comment rows, each tagged with `kind`.
pub fn write_jsonl(batch: &ParsedBatch, out: &Path) -> Result<usize> {
    #[derive(Serialize)]
    struct Tagged<'a, T: Serialize> {
        kind: &'static str,
        #[serde(flatten)]
        row: &'a T,
    }

    let mut n = 0usize;
    write_atomic(out, |w| {
        for row in post_rows(&batch.posts) {
            serde_json::to_writer(&mut *w, &Tagged { kind: "post", row: &row })?;
            w.write_all(b"\n")?;
            n += 1;
        }
        for row in comment_rows(&batch.comments) {
            serde_json::to_writer(&mut *w, &Tagged { kind: "comment", row: &row })?;
            w.write_all(b"\n")?;
            n += 1;
        }
        Ok(())
    })?;
    Ok(n)
}

/// The whole batch as one JSON document, raw field bags included.
pub fn write_batch_json(batch: &ParsedBatch, out: &Path, pretty: bool) -> Result<()> {
    write_atomic(out, |w| {
        if pretty {
            serde_json::to_writer_pretty(&mut *w, batch)?;
        } else {
            serde_json::to_writer(&mut *w, batch)?;
        }
        Ok(())
    })
}
