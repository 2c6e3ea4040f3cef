use crate::concurrency::parse_files_parallel;
use crate::config::IngestOptions;
use crate::models::{DedupStats, ParsedBatch};
use crate::paths::expand_inputs;
use crate::platform::Platform;
use crate::progress::make_file_progress;
use crate::util::init_tracing_once;
use std::path::{Path, PathBuf};

/// Outcome of one run: the final batch plus what deduplication removed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestReport {
    pub batch: ParsedBatch,
    /// Records parsed before deduplication.
    pub raw_success_count: usize,
    /// Duplicates found in the raw merge (collapsed when dedup is on).
    pub duplicates: DedupStats,
}

/// Builder-style front door: configure once, then ingest files and directories.
#[derive(Clone, Debug, Default)]
pub struct Ingestor {
    pub(crate) opts: IngestOptions,
}

impl Ingestor {
    pub fn new() -> Self {
        Self { opts: IngestOptions::default() }
    }

    pub fn with_options(opts: IngestOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn deduplicate(mut self, yes: bool) -> Self { self.opts = self.opts.with_deduplicate(yes); self }
    pub fn platform_hint(mut self, platform: Option<Platform>) -> Self { self.opts = self.opts.with_platform_hint(platform); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn max_display_errors(mut self, n: usize) -> Self { self.opts = self.opts.with_max_display_errors(n); self }

    /// Ingest files and/or directories (searched recursively for `*.json`).
    /// Per-file failures end up in the batch's errors; this never fails as a whole.
    pub fn run<P: AsRef<Path>>(&self, inputs: &[P]) -> ParsedBatch {
        self.run_report(inputs).batch
    }

    /// Like [`Ingestor::run`], also reporting duplicates found before they were collapsed.
    pub fn run_report<P: AsRef<Path>>(&self, inputs: &[P]) -> IngestReport {
        init_tracing_once();
        let files: Vec<PathBuf> = expand_inputs(inputs);
        if files.is_empty() {
            tracing::warn!("No capture files found. Check the input paths.");
        } else {
            tracing::info!("Planned {} files for parsing.", files.len());
        }

        let pb = if self.opts.progress {
            Some(make_file_progress(files.len() as u64, "Parsing captures"))
        } else {
            None
        };

        let raw = parse_files_parallel(&files, self.opts.platform_hint, false, self.opts.parallelism, pb.as_ref());
        let duplicates = raw.deduplication_stats();
        let raw_success_count = raw.success_count;
        let batch = if self.opts.deduplicate && duplicates.total_duplicates > 0 {
            raw.deduplicate()
        } else {
            raw
        };

        if let Some(pb) = pb {
            pb.finish_with_message(format!("{} posts, {} comments", batch.posts.len(), batch.comments.len()));
        }
        IngestReport { batch, raw_success_count, duplicates }
    }
}
