mod config;
mod error;
mod paths;
mod pipeline;
mod progress;
mod concurrency;
mod util;

mod platform;
mod fields;
mod models;
mod builders;
mod capture;
mod ingest;
mod dedupe;
mod export;

pub use crate::config::IngestOptions;
pub use crate::error::{BuildError, IngestError};
pub use crate::pipeline::{IngestReport, Ingestor};

// Canonical record model.
pub use crate::models::{Author, Comment, ContentKind, DedupStats, Interactions, ParsedBatch, Post};

// Platform registry and detection.
pub use crate::platform::{detect, detect_fields, detect_from_filename, Platform, PlatformSignature, SIGNATURES};

// Field extractors, usable on their own for ad-hoc records.
pub use crate::fields::{coerce_count, coerce_epoch, coerce_pictures, coerce_text, coerce_timestamp, get_first_present, split_url_list};

// Builders and the single-record entry points.
pub use crate::builders::{comment_builder, parse_comment, parse_post, post_builder, CommentBuilder, PostBuilder};

// Capture-time inference from file names.
pub use crate::capture::{capture_time_for_path, capture_time_from_name};

// File ingestion, merging and deduplication.
pub use crate::ingest::{is_comment_record, merge_file_results, parse_file, parse_file_hinted, parse_files, parse_files_hinted};
pub use crate::concurrency::parse_files_parallel;
pub use crate::dedupe::{deduplicate, duplicate_stats};

// Directory discovery.
pub use crate::paths::{discover_json_files, expand_inputs};

// Tabular export.
pub use crate::export::{comment_rows, post_rows, time_text, write_batch_json, write_comments_tsv, write_jsonl, write_posts_tsv, CommentRow, PostRow};

// Tracing setup for binaries and tests.
pub use crate::util::init_tracing_once;
