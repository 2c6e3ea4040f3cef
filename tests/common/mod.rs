#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Fresh scratch directory that outlives the `TempDir` guard (tests are short-lived).
pub fn scratch_dir() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    dir.keep()
}

/// Write `value` as pretty JSON to `dir/name` and return the path.
pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

/// Write raw text (for malformed JSON cases).
pub fn write_text(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// A dy video post as the crawler writes it: string counters, Unix create_time.
pub fn dy_post() -> Value {
    json!({
        "aweme_id": "7605333789232876826",
        "aweme_type": "0",
        "title": "test title",
        "desc": "test desc #topic",
        "create_time": 1770770520,
        "user_id": "4323725741947923",
        "sec_uid": "MS4wLjABAAAAM1dmeDLgQJseNEne5Y4Wk9KMXFG2j2vYHJ56EfJyKYERo2Ss8DhJQw",
        "short_user_id": "83423785151",
        "user_unique_id": "TestUser",
        "user_signature": "hello there",
        "nickname": "poster",
        "avatar": "https://example.com/avatar.jpg",
        "liked_count": "15057",
        "collected_count": "11502",
        "comment_count": "373",
        "share_count": "578",
        "ip_location": "Beijing",
        "last_modify_ts": 1771725359615i64,
        "aweme_url": "https://www.douyin.com/video/7605333789232876826",
        "cover_url": "https://example.com/cover.jpg",
        "video_download_url": "https://example.com/video.mp4",
        "music_download_url": "https://example.com/music.mp3",
        "note_download_url": "",
        "source_keyword": "keyword"
    })
}

/// A top-level dy comment (`parent_comment_id == "0"`).
pub fn dy_comment() -> Value {
    json!({
        "comment_id": "7609314008492311337",
        "create_time": 1771681480,
        "ip_location": "Shandong",
        "aweme_id": "7605333789232876826",
        "content": "a comment",
        "user_id": "4265734384134286",
        "sec_uid": "MS4wLjABAAAAeSaODM7g4805b75As8cv5hyWsRnLD2X8T2FL4GkEB93onXRDrFaA7pQ",
        "short_user_id": "3862647330",
        "user_unique_id": "test_user",
        "user_signature": null,
        "nickname": "commenter",
        "avatar": "https://example.com/avatar.jpg",
        "sub_comment_count": "5",
        "like_count": 10,
        "last_modify_ts": 1771725361056i64,
        "parent_comment_id": "0",
        "pictures": "https://example.com/pic1.jpg,https://example.com/pic2.jpg"
    })
}

/// An xhs video note; counters are plain integers and time lives in `time`.
pub fn xhs_post() -> Value {
    json!({
        "note_id": "65a1b2c3d4e5f67890123456",
        "type": "video",
        "title": "xhs title",
        "desc": "xhs desc",
        "video_url": "https://example.com/xhs_video.mp4",
        "time": 1704067200,
        "last_update_time": 1704153600,
        "user_id": "5f1a2b3c4d5e6f7890123456",
        "nickname": "xhs user",
        "avatar": "https://example.com/xhs_avatar.jpg",
        "liked_count": 1000,
        "collected_count": 500,
        "comment_count": 200,
        "share_count": 50,
        "ip_location": "Shanghai",
        "image_list": "https://example.com/img1.jpg,https://example.com/img2.jpg",
        "tag_list": "a,b",
        "last_modify_ts": 1704153600000i64,
        "note_url": "https://www.xiaohongshu.com/explore/65a1b2c3d4e5f67890123456",
        "source_keyword": "xhs keyword",
        "xsec_token": "token123"
    })
}

/// A top-level xhs comment (`parent_comment_id == 0`).
pub fn xhs_comment() -> Value {
    json!({
        "comment_id": "comment123",
        "create_time": 1704067200,
        "ip_location": "Guangzhou",
        "note_id": "65a1b2c3d4e5f67890123456",
        "content": "xhs comment",
        "user_id": "user123",
        "nickname": "commenter",
        "avatar": "https://example.com/comment_avatar.jpg",
        "sub_comment_count": 3,
        "pictures": "https://example.com/comment_pic.jpg",
        "parent_comment_id": 0,
        "last_modify_ts": 1704153600000i64,
        "like_count": 20
    })
}

/// A bili video.
pub fn bili_post() -> Value {
    json!({
        "bvid": "BV1xx411c7mD",
        "title": "bili title",
        "desc": "bili desc",
        "video_url": "https://www.bilibili.com/video/BV1xx411c7mD",
        "cover": "https://example.com/bili_cover.jpg",
        "create_time": 1704067200,
        "mid": "424242",
        "nickname": "uploader",
        "like_count": "88",
        "favorite_count": "12",
        "comment_count": 7,
        "share_count": 3
    })
}

/// Minimal dy post with a given id and like count.
pub fn dy_post_with(id: &str, liked: u64) -> Value {
    json!({ "aweme_id": id, "nickname": "u", "liked_count": liked.to_string() })
}
