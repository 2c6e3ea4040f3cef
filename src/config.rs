use crate::platform::Platform;

/// User-facing ingestion options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct IngestOptions {
    pub deduplicate: bool,               // collapse repeated captures of the same key
    pub platform_hint: Option<Platform>, // overrides file-name and field detection
    pub parallelism: usize,              // files parsed concurrently; 0/1 = sequential
    pub progress: bool,                  // show a progress bar over files
    pub max_display_errors: usize,       // errors shown in summaries (all are counted)
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            deduplicate: true,
            platform_hint: None,
            parallelism: 1,
            progress: false,
            max_display_errors: 20,
        }
    }
}

impl IngestOptions {
    /// Defaults overlaid with `MEDIA_INGEST_PLATFORM`, `MEDIA_INGEST_DEDUP`
    /// (`0`/`false`/`no`/`off` disables) and `MEDIA_INGEST_PARALLELISM`.
    /// Unusable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut opts = Self::default();

        if let Ok(s) = std::env::var("MEDIA_INGEST_PLATFORM") {
            if !s.trim().is_empty() {
                match s.parse::<Platform>() {
                    Ok(p) => opts.platform_hint = Some(p),
                    Err(e) => tracing::warn!("MEDIA_INGEST_PLATFORM ignored: {}", e),
                }
            }
        }
        if let Ok(s) = std::env::var("MEDIA_INGEST_DEDUP") {
            opts.deduplicate = !matches!(s.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        if let Ok(s) = std::env::var("MEDIA_INGEST_PARALLELISM") {
            match s.trim().parse::<usize>() {
                Ok(n) => opts.parallelism = n,
                Err(_) => tracing::warn!("MEDIA_INGEST_PARALLELISM is not a number: {}", s),
            }
        }
        opts
    }

    pub fn with_deduplicate(mut self, yes: bool) -> Self {
        self.deduplicate = yes;
        self
    }
    pub fn with_platform_hint(mut self, platform: Option<Platform>) -> Self {
        self.platform_hint = platform;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = threads;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_max_display_errors(mut self, n: usize) -> Self {
        self.max_display_errors = n;
        self
    }
}
