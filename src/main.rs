use anyhow::{anyhow, Result};
use clap::Parser;
use media_ingest::{
    init_tracing_once, write_batch_json, write_comments_tsv, write_jsonl, write_posts_tsv, IngestOptions, Ingestor,
    Platform,
};
use std::path::PathBuf;

/// Normalize crawler JSON captures into posts and comments, deduplicated by capture time.
#[derive(Debug, Parser)]
#[command(name = "media-ingest", version)]
struct Cli {
    /// Capture files or directories (searched recursively for *.json).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Force a platform (code such as `dy`, or a name such as `douyin`).
    #[arg(long)]
    platform: Option<String>,

    /// Keep every observation instead of the latest capture per key.
    #[arg(long)]
    no_dedup: bool,

    /// Files parsed concurrently.
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    #[arg(long)]
    posts_tsv: Option<PathBuf>,

    #[arg(long)]
    comments_tsv: Option<PathBuf>,

    /// Post and comment rows, one JSON object per line.
    #[arg(long)]
    jsonl: Option<PathBuf>,

    /// Full batch as pretty JSON (raw fields included).
    #[arg(long)]
    json: Option<PathBuf>,

    /// Number of error lines to print.
    #[arg(long)]
    show_errors: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing_once();
    let cli = Cli::parse();

    let mut opts = IngestOptions::from_env().with_progress(cli.progress);
    if let Some(p) = &cli.platform {
        let platform: Platform = p.parse().map_err(|e: String| anyhow!(e))?;
        opts = opts.with_platform_hint(Some(platform));
    }
    if cli.no_dedup {
        opts = opts.with_deduplicate(false);
    }
    if let Some(j) = cli.jobs {
        opts = opts.with_parallelism(j);
    }
    if let Some(n) = cli.show_errors {
        opts = opts.with_max_display_errors(n);
    }

    let ingestor = Ingestor::with_options(opts);
    let report = ingestor.run_report(&cli.inputs);
    let batch = &report.batch;

    let stats = report.duplicates;
    let totals = batch.total_interactions();
    println!(
        "platform: {}",
        batch.platform.map(|p| p.to_string()).unwrap_or_else(|| "unknown".to_string())
    );
    println!("records:  {} total, {} parsed, {} errors", batch.total_records, batch.success_count, batch.error_count);
    println!("posts:    {}", batch.posts.len());
    println!("comments: {}", batch.comments.len());
    println!("users:    {}", batch.user_count());
    println!(
        "totals:   {} likes, {} collects, {} comments, {} shares",
        totals.likes, totals.collects, totals.comments, totals.shares
    );
    if stats.total_duplicates > 0 {
        if ingestor.options().deduplicate {
            println!(
                "filtered {} duplicates ({} posts, {} comments; raw: {} parsed)",
                stats.total_duplicates, stats.duplicate_posts, stats.duplicate_comments, report.raw_success_count
            );
        } else {
            println!("duplicates found (kept): {}", stats.total_duplicates);
        }
    }
    for line in batch.display_errors(ingestor.options().max_display_errors) {
        eprintln!("  ! {}", line);
    }

    if let Some(out) = &cli.posts_tsv {
        let n = write_posts_tsv(&batch.posts, out)?;
        println!("Wrote {} posts to {}", n, out.display());
    }
    if let Some(out) = &cli.comments_tsv {
        let n = write_comments_tsv(&batch.comments, out)?;
        println!("Wrote {} comments to {}", n, out.display());
    }
    if let Some(out) = &cli.jsonl {
        let n = write_jsonl(batch, out)?;
        println!("Wrote {} rows to {}", n, out.display());
    }
    if let Some(out) = &cli.json {
        write_batch_json(batch, out, true)?;
        println!("Wrote batch to {}", out.display());
    }

    Ok(())
}
