//! Platform identities, the static signature registry, and record/filename detection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Content platforms the crawler captures from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Xhs,
    Dy,
    Ks,
    Bili,
    Wb,
    Tieba,
    Zhihu,
}

impl Platform {
    /// Short code used by the crawler on the command line and in file names.
    pub fn code(self) -> &'static str {
        match self {
            Platform::Xhs => "xhs",
            Platform::Dy => "dy",
            Platform::Ks => "ks",
            Platform::Bili => "bili",
            Platform::Wb => "wb",
            Platform::Tieba => "tieba",
            Platform::Zhihu => "zhihu",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        FILENAME_HINTS
            .iter()
            .find(|(name, _)| *name == needle)
            .map(|(_, p)| *p)
            .ok_or_else(|| format!("unknown platform: {s}"))
    }
}

/// Field names that identify records of one platform.
#[derive(Debug)]
pub struct PlatformSignature {
    pub platform: Platform,
    pub content_id_fields: &'static [&'static str],
    pub user_id_fields: &'static [&'static str],
}

/// Detection order matters: the first platform whose content-id fields intersect a
/// record's keys wins.
pub static SIGNATURES: [PlatformSignature; 7] = [
    PlatformSignature { platform: Platform::Dy, content_id_fields: &["aweme_id"], user_id_fields: &["sec_uid"] },
    PlatformSignature { platform: Platform::Xhs, content_id_fields: &["note_id"], user_id_fields: &["user_id"] },
    PlatformSignature { platform: Platform::Bili, content_id_fields: &["bvid", "video_id"], user_id_fields: &["mid", "owner_mid"] },
    PlatformSignature { platform: Platform::Ks, content_id_fields: &["photo_id", "work_id"], user_id_fields: &["user_id", "author_id"] },
    PlatformSignature { platform: Platform::Wb, content_id_fields: &["mid", "weibo_id"], user_id_fields: &["user_id", "uid"] },
    PlatformSignature { platform: Platform::Tieba, content_id_fields: &["thread_id", "post_id"], user_id_fields: &["user_id"] },
    PlatformSignature { platform: Platform::Zhihu, content_id_fields: &["question_id", "answer_id"], user_id_fields: &["id", "uid"] },
];

/// Content-reference keys that, next to `comment_id`, pin a comment to its platform.
const COMMENT_REFERENCES: [(&str, Platform); 2] = [("aweme_id", Platform::Dy), ("note_id", Platform::Xhs)];

/// Substrings searched in a lowercased file stem, in order.
const FILENAME_HINTS: [(&str, Platform); 12] = [
    ("douyin", Platform::Dy),
    ("dy", Platform::Dy),
    ("xiaohongshu", Platform::Xhs),
    ("xhs", Platform::Xhs),
    ("bilibili", Platform::Bili),
    ("bili", Platform::Bili),
    ("kuaishou", Platform::Ks),
    ("ks", Platform::Ks),
    ("weibo", Platform::Wb),
    ("wb", Platform::Wb),
    ("tieba", Platform::Tieba),
    ("zhihu", Platform::Zhihu),
];

/// Detect the platform of one raw record from its key set.
/// Returns `None` for non-objects and for records no signature matches.
pub fn detect(record: &Value) -> Option<Platform> {
    record.as_object().and_then(detect_fields)
}

/// Same as [`detect`] for an already-unwrapped JSON object.
pub fn detect_fields(record: &Map<String, Value>) -> Option<Platform> {
    // Comments share a generic `comment_id`; the content reference next to it
    // is the only reliable discriminator.
    if record.contains_key("comment_id") {
        if let Some((_, p)) = COMMENT_REFERENCES.iter().find(|(k, _)| record.contains_key(*k)) {
            return Some(*p);
        }
    }

    SIGNATURES
        .iter()
        .find(|sig| sig.content_id_fields.iter().any(|f| record.contains_key(*f)))
        .map(|sig| sig.platform)
}

/// Guess the platform from a file name (codes and vernacular names, case-insensitive).
pub fn detect_from_filename(name: impl AsRef<Path>) -> Option<Platform> {
    let stem = name
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())?;
    FILENAME_HINTS
        .iter()
        .find(|(needle, _)| stem.contains(needle))
        .map(|(_, p)| *p)
}
