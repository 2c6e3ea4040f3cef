//! Per-platform record builders and the public `parse_post` / `parse_comment` entry points.
//!
//! Builders are plain functions kept in two lookup tables (posts, comments). A
//! platform without an entry is detectable but not parsable for that kind.

use crate::error::BuildError;
use crate::fields::{coerce_count, coerce_epoch, coerce_pictures, coerce_text, coerce_timestamp, first_present_named, get_first_present};
use crate::models::{Author, Comment, ContentKind, Post};
use crate::platform::{detect_fields, Platform};
use serde_json::{Map, Value};
use time::OffsetDateTime;

pub type PostBuilder = fn(&Map<String, Value>) -> Result<Post, BuildError>;
pub type CommentBuilder = fn(&Map<String, Value>) -> Result<Comment, BuildError>;

static POST_BUILDERS: [(Platform, PostBuilder); 3] = [
    (Platform::Dy, build_dy_post),
    (Platform::Xhs, build_xhs_post),
    (Platform::Bili, build_bili_post),
];

static COMMENT_BUILDERS: [(Platform, CommentBuilder); 3] = [
    (Platform::Dy, build_dy_comment),
    (Platform::Xhs, build_xhs_comment),
    (Platform::Bili, build_bili_comment),
];

pub fn post_builder(platform: Platform) -> Option<PostBuilder> {
    POST_BUILDERS.iter().find(|(p, _)| *p == platform).map(|(_, b)| *b)
}

pub fn comment_builder(platform: Platform) -> Option<CommentBuilder> {
    COMMENT_BUILDERS.iter().find(|(p, _)| *p == platform).map(|(_, b)| *b)
}

/// Build a canonical post. With `platform == None` the record is detected first.
/// Returns `None` for non-objects, undetectable or unsupported platforms, and
/// records the builder rejects.
pub fn parse_post(record: &Value, platform: Option<Platform>) -> Option<Post> {
    let fields = record.as_object()?;
    let platform = platform.or_else(|| detect_fields(fields))?;
    let build = post_builder(platform)?;
    match build(fields) {
        Ok(post) => Some(post),
        Err(e) => {
            tracing::debug!("{} post rejected: {}", platform, e);
            None
        }
    }
}

/// Build a canonical comment; same contract as [`parse_post`].
pub fn parse_comment(record: &Value, platform: Option<Platform>) -> Option<Comment> {
    let fields = record.as_object()?;
    let platform = platform.or_else(|| detect_fields(fields))?;
    let build = comment_builder(platform)?;
    match build(fields) {
        Ok(comment) => Some(comment),
        Err(e) => {
            tracing::debug!("{} comment rejected: {}", platform, e);
            None
        }
    }
}

// ----------------------------- Field access ------------------------------------

const USER_ID: &[&str] = &["user_id", "uid", "author_id"];
const NICKNAME: &[&str] = &["nickname", "user_name", "author_name"];
const AVATAR: &[&str] = &["avatar", "avatar_url", "user_avatar"];
const IP_LOCATION: &[&str] = &["ip_location", "ip_label", "location"];
const SOURCE_KEYWORD: &[&str] = &["source_keyword", "keyword"];

/// Typed view over one raw record.
struct Raw<'a>(&'a Map<String, Value>);

impl<'a> Raw<'a> {
    fn text(&self, names: &[&str]) -> Result<String, BuildError> {
        match first_present_named(self.0, names) {
            None => Ok(String::new()),
            Some((name, v)) => coerce_text(v).ok_or_else(|| BuildError::InvalidField(name.to_string())),
        }
    }

    fn id(&self, names: &[&str]) -> Result<String, BuildError> {
        let id = self.text(names)?.trim().to_string();
        if id.is_empty() {
            return Err(BuildError::MissingIdentifier(names.join("|")));
        }
        Ok(id)
    }

    fn count(&self, names: &[&str]) -> u64 {
        get_first_present(self.0, names).map(coerce_count).unwrap_or(0)
    }

    fn time(&self, names: &[&str]) -> Option<OffsetDateTime> {
        get_first_present(self.0, names).and_then(coerce_timestamp)
    }

    fn epoch(&self, names: &[&str]) -> Option<i64> {
        get_first_present(self.0, names).and_then(coerce_epoch)
    }

    fn urls(&self, names: &[&str]) -> Vec<String> {
        get_first_present(self.0, names).map(coerce_pictures).unwrap_or_default()
    }

    /// Primary media URL followed by the entries of a comma-separated list field.
    fn media(&self, primary: &str, list: &str) -> Result<Vec<String>, BuildError> {
        let mut out = Vec::new();
        let first = self.text(&[primary])?;
        if !first.trim().is_empty() {
            out.push(first.trim().to_string());
        }
        out.extend(self.urls(&[list]));
        Ok(out)
    }

    /// Author block; `user_id_aliases` are tried before the common user-id aliases.
    fn author(&self, user_id_aliases: &[&str]) -> Result<Author, BuildError> {
        let mut uid_names: Vec<&str> = user_id_aliases.to_vec();
        uid_names.extend_from_slice(USER_ID);
        Ok(Author {
            user_id: self.text(&uid_names)?,
            sec_uid: self.text(&["sec_uid"])?,
            short_user_id: self.text(&["short_user_id"])?,
            user_unique_id: self.text(&["user_unique_id"])?,
            nickname: self.text(NICKNAME)?,
            avatar: self.text(AVATAR)?,
            signature: self.text(&["user_signature"])?,
        })
    }

    /// Parent comment reference; null, empty, `0` and `"0"` all mean top-level.
    fn parent(&self) -> Option<String> {
        let raw = coerce_text(self.0.get("parent_comment_id")?)?;
        let raw = raw.trim();
        if raw.is_empty() || raw == "0" {
            None
        } else {
            Some(raw.to_string())
        }
    }
}

// ----------------------------- Posts ------------------------------------

fn build_dy_post(data: &Map<String, Value>) -> Result<Post, BuildError> {
    let r = Raw(data);
    let has_video = !r.text(&["video_download_url"])?.trim().is_empty();
    Ok(Post {
        content_id: r.id(&["aweme_id"])?,
        platform: Platform::Dy,
        content_kind: if has_video { ContentKind::Video } else { ContentKind::Note },
        title: r.text(&["title"])?,
        desc: r.text(&["desc"])?,
        content_url: r.text(&["aweme_url"])?,
        cover_url: r.text(&["cover_url"])?,
        media_urls: r.media("video_download_url", "note_download_url")?,
        create_time: r.time(&["create_time"]),
        last_modify_ts: r.epoch(&["last_modify_ts"]),
        author: r.author(&[])?,
        liked_count: r.count(&["liked_count"]),
        collected_count: r.count(&["collected_count"]),
        comment_count: r.count(&["comment_count"]),
        share_count: r.count(&["share_count"]),
        ip_location: r.text(IP_LOCATION)?,
        source_keyword: r.text(SOURCE_KEYWORD)?,
        capture_time: None,
        source_file: String::new(),
        raw_data: data.clone(),
    })
}

fn xhs_content_kind(raw: &str) -> ContentKind {
    match raw.trim().to_lowercase().as_str() {
        "video" => ContentKind::Video,
        "normal" | "note" => ContentKind::Note,
        "article" => ContentKind::Article,
        _ => ContentKind::Unknown,
    }
}

fn build_xhs_post(data: &Map<String, Value>) -> Result<Post, BuildError> {
    let r = Raw(data);
    Ok(Post {
        content_id: r.id(&["note_id"])?,
        platform: Platform::Xhs,
        content_kind: xhs_content_kind(&r.text(&["type"])?),
        title: r.text(&["title"])?,
        desc: r.text(&["desc"])?,
        content_url: r.text(&["note_url"])?,
        cover_url: String::new(),
        media_urls: r.media("video_url", "image_list")?,
        create_time: r.time(&["time"]),
        last_modify_ts: r.epoch(&["last_modify_ts"]),
        author: r.author(&[])?,
        liked_count: r.count(&["liked_count"]),
        collected_count: r.count(&["collected_count"]),
        comment_count: r.count(&["comment_count"]),
        share_count: r.count(&["share_count"]),
        ip_location: r.text(IP_LOCATION)?,
        source_keyword: r.text(SOURCE_KEYWORD)?,
        capture_time: None,
        source_file: String::new(),
        raw_data: data.clone(),
    })
}

fn build_bili_post(data: &Map<String, Value>) -> Result<Post, BuildError> {
    let r = Raw(data);
    let video_url = r.text(&["video_url"])?;
    let media_urls = if video_url.trim().is_empty() { Vec::new() } else { vec![video_url.trim().to_string()] };
    Ok(Post {
        content_id: r.id(&["bvid", "video_id"])?,
        platform: Platform::Bili,
        content_kind: ContentKind::Video,
        title: r.text(&["title"])?,
        desc: r.text(&["desc"])?,
        content_url: video_url,
        cover_url: r.text(&["cover"])?,
        media_urls,
        create_time: r.time(&["create_time"]),
        last_modify_ts: r.epoch(&["last_modify_ts"]),
        author: r.author(&["mid", "owner_mid"])?,
        liked_count: r.count(&["like_count"]),
        collected_count: r.count(&["favorite_count"]),
        comment_count: r.count(&["comment_count"]),
        share_count: r.count(&["share_count"]),
        ip_location: r.text(IP_LOCATION)?,
        source_keyword: r.text(SOURCE_KEYWORD)?,
        capture_time: None,
        source_file: String::new(),
        raw_data: data.clone(),
    })
}

// ----------------------------- Comments ------------------------------------

/// Shared comment layout; platforms differ in id aliases and counter names.
struct CommentShape<'s> {
    platform: Platform,
    comment_id: &'s [&'s str],
    content_id: &'s [&'s str],
    user_id: &'s [&'s str],
    sub_comment_count: &'s [&'s str],
}

fn build_comment(data: &Map<String, Value>, shape: CommentShape<'_>) -> Result<Comment, BuildError> {
    let r = Raw(data);
    let parent_comment_id = r.parent();
    Ok(Comment {
        comment_id: r.id(shape.comment_id)?,
        content_id: r.text(shape.content_id)?,
        platform: shape.platform,
        content: r.text(&["content"])?,
        pictures: r.urls(&["pictures"]),
        create_time: r.time(&["create_time"]),
        last_modify_ts: r.epoch(&["last_modify_ts"]),
        author: r.author(shape.user_id)?,
        like_count: r.count(&["like_count"]),
        sub_comment_count: r.count(shape.sub_comment_count),
        is_sub_comment: parent_comment_id.is_some(),
        parent_comment_id,
        ip_location: r.text(IP_LOCATION)?,
        capture_time: None,
        source_file: String::new(),
        raw_data: data.clone(),
    })
}

fn build_dy_comment(data: &Map<String, Value>) -> Result<Comment, BuildError> {
    build_comment(
        data,
        CommentShape {
            platform: Platform::Dy,
            comment_id: &["comment_id", "cid"],
            content_id: &["aweme_id"],
            user_id: &[],
            sub_comment_count: &["sub_comment_count"],
        },
    )
}

fn build_xhs_comment(data: &Map<String, Value>) -> Result<Comment, BuildError> {
    build_comment(
        data,
        CommentShape {
            platform: Platform::Xhs,
            comment_id: &["comment_id", "id"],
            content_id: &["note_id"],
            user_id: &[],
            sub_comment_count: &["sub_comment_count"],
        },
    )
}

fn build_bili_comment(data: &Map<String, Value>) -> Result<Comment, BuildError> {
    build_comment(
        data,
        CommentShape {
            platform: Platform::Bili,
            comment_id: &["comment_id", "rpid"],
            content_id: &["bvid", "video_id"],
            user_id: &["mid", "member_id"],
            sub_comment_count: &["reply_count"],
        },
    )
}
