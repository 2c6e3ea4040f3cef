//! File ingestion: one JSON capture file into a `ParsedBatch`, and many files into
//! one merged (optionally deduplicated) batch.

use crate::builders::{parse_comment, parse_post};
use crate::capture::capture_time_for_path;
use crate::dedupe::deduplicate;
use crate::error::IngestError;
use crate::models::{Comment, ParsedBatch, Post};
use crate::platform::{detect_fields, detect_from_filename, Platform};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Structural post/comment split. A post that happens to carry both `content` and
/// `parent_comment_id` is read as a comment; captures offer no stronger signal.
pub fn is_comment_record(record: &Map<String, Value>) -> bool {
    record.contains_key("comment_id")
        || (record.contains_key("content") && record.contains_key("parent_comment_id"))
}

/// Parse one capture file. See [`parse_file_hinted`].
pub fn parse_file(path: impl AsRef<Path>, dedupe: bool) -> Result<ParsedBatch, IngestError> {
    parse_file_hinted(path, None, dedupe)
}

/// Parse one capture file (a JSON object or an array of objects).
///
/// Platform priority per record: `hint`, then the file name, then the record's
/// own fields. Fails only when the file cannot be read or its top level is not
/// an object/array; record-level problems are collected in `errors`.
pub fn parse_file_hinted(
    path: impl AsRef<Path>,
    hint: Option<Platform>,
    dedupe: bool,
) -> Result<ParsedBatch, IngestError> {
    let path = path.as_ref();
    let records = read_records(path)?;

    let file_hint = hint.or_else(|| detect_from_filename(path));
    let capture_time = capture_time_for_path(path);
    let source_file = path.display().to_string();

    let mut posts: Vec<Post> = Vec::new();
    let mut comments: Vec<Comment> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut platform: Option<Platform> = None;

    for (idx, record) in records.iter().enumerate() {
        let n = idx + 1;
        let Some(fields) = record.as_object() else {
            errors.push(format!("record {n}: not a JSON object"));
            continue;
        };

        let detected = file_hint.or_else(|| detect_fields(fields));
        if is_comment_record(fields) {
            if let Some(c) = parse_comment(record, detected) {
                platform.get_or_insert(c.platform);
                comments.push(c.with_capture(capture_time, source_file.as_str()));
                continue;
            }
        } else if let Some(p) = parse_post(record, detected) {
            platform.get_or_insert(p.platform);
            posts.push(p.with_capture(capture_time, source_file.as_str()));
            continue;
        }

        errors.push(match detected {
            Some(p) => format!("record {n}: could not build a {p} record"),
            None => format!("record {n}: unrecognized platform or format"),
        });
    }

    tracing::info!(
        "Parsed {}: {} posts, {} comments, {} errors.",
        path.display(),
        posts.len(),
        comments.len(),
        errors.len()
    );

    let batch = ParsedBatch {
        success_count: posts.len() + comments.len(),
        error_count: errors.len(),
        total_records: records.len(),
        posts,
        comments,
        platform,
        errors,
    };

    if dedupe && !batch.is_empty() {
        return Ok(deduplicate(&batch));
    }
    Ok(batch)
}

/// Parse several capture files in order and merge them. See [`merge_file_results`].
pub fn parse_files<P: AsRef<Path>>(paths: &[P], dedupe: bool) -> ParsedBatch {
    parse_files_hinted(paths, None, dedupe)
}

pub fn parse_files_hinted<P: AsRef<Path>>(paths: &[P], hint: Option<Platform>, dedupe: bool) -> ParsedBatch {
    let results: Vec<_> = paths
        .iter()
        .map(|p| parse_file_hinted(p, hint, false))
        .collect();
    merge_file_results(paths, results, dedupe)
}

/// Concatenate per-file results in input order. A file that failed outright
/// becomes one `"<path>: <error>"` line instead of aborting the merge.
/// The merged platform is the first file's non-empty platform.
pub fn merge_file_results<P: AsRef<Path>>(
    paths: &[P],
    results: Vec<Result<ParsedBatch, IngestError>>,
    dedupe: bool,
) -> ParsedBatch {
    let mut merged = ParsedBatch::default();

    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(batch) => {
                merged.posts.extend(batch.posts);
                merged.comments.extend(batch.comments);
                merged.errors.extend(batch.errors);
                merged.total_records += batch.total_records;
                if merged.platform.is_none() {
                    merged.platform = batch.platform;
                }
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.as_ref().display(), e);
                merged.errors.push(format!("{}: {}", path.as_ref().display(), e));
            }
        }
    }

    merged.success_count = merged.posts.len() + merged.comments.len();
    merged.error_count = merged.errors.len();

    tracing::info!(
        "Merged {} files: {} posts, {} comments, {} errors.",
        paths.len(),
        merged.posts.len(),
        merged.comments.len(),
        merged.error_count
    );

    if dedupe && !merged.is_empty() {
        return deduplicate(&merged);
    }
    merged
}

fn read_records(path: &Path) -> Result<Vec<Value>, IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?;
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    let value: Value =
        serde_json::from_slice(body).map_err(|source| IngestError::Json { path: path.to_path_buf(), source })?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => Ok(vec![Value::Object(map)]),
        other => Err(IngestError::UnsupportedTopLevel { path: path.to_path_buf(), kind: json_kind(&other) }),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
