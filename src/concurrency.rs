//! Parallel per-file ingestion.
//!
//! Files are parsed on a rayon pool, but results are collected in input order so
//! the merge and the deduplicator see the same sequence as a sequential run. The
//! "later record wins" tiebreak depends on that order.

use crate::error::IngestError;
use crate::ingest::{merge_file_results, parse_file_hinted};
use crate::models::ParsedBatch;
use crate::platform::Platform;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::Path;

/// Parse files with up to `threads` workers (`<= 1` runs sequentially), then merge.
pub fn parse_files_parallel<P: AsRef<Path> + Sync>(
    paths: &[P],
    hint: Option<Platform>,
    dedupe: bool,
    threads: usize,
    progress: Option<&ProgressBar>,
) -> ParsedBatch {
    let parse_one = |p: &P| -> Result<ParsedBatch, IngestError> {
        let r = parse_file_hinted(p, hint, false);
        if let Some(pb) = progress {
            pb.inc(1);
        }
        r
    };

    let results: Vec<Result<ParsedBatch, IngestError>> = if threads <= 1 {
        paths.iter().map(parse_one).collect()
    } else {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| paths.par_iter().map(parse_one).collect()),
            Err(e) => {
                tracing::warn!("Could not start {} worker threads ({}); parsing sequentially.", threads, e);
                paths.iter().map(parse_one).collect()
            }
        }
    };

    merge_file_results(paths, results, dedupe)
}
