use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .try_init();
    });
}

// -------- robust file access (crawler output often sits on synced/AV-scanned folders) --------

/// Transient I/O errors worth retrying: Windows sharing/lock violations and
/// AV interference, which crawlers writing into the same folder trigger often.
#[cfg(windows)]
fn is_retriable_io_error(e: &io::Error) -> bool {
    // 5 = access denied, 32 = sharing violation, 33 = lock violation,
    // 225 = blocked by AV, 1224 = user-mapped section open
    matches!(e.raw_os_error(), Some(5) | Some(32) | Some(33) | Some(225) | Some(1224))
}

/// Elsewhere the same raw codes mean EIO, EPIPE, ...; nothing is retried.
#[cfg(not(windows))]
fn is_retriable_io_error(_e: &io::Error) -> bool {
    false
}

fn with_backoff<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let tries = tries.max(1);
    let mut attempt = 0;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) && attempt + 1 < tries => {
                attempt += 1;
                sleep(Duration::from_millis(delay_ms.saturating_mul(attempt as u64)));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Create (truncate) a file, retrying transient failures.
pub fn create_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    with_backoff(tries, delay_ms, || File::create(path))
}

/// Move a finished temp file over `dest`; falls back to copy+remove when rename
/// is refused (e.g. across volumes).
pub fn promote_file(tmp: &Path, dest: &Path) -> io::Result<()> {
    if with_backoff(20, 50, || fs::rename(tmp, dest)).is_ok() {
        return Ok(());
    }
    with_backoff(20, 50, || fs::copy(tmp, dest))?;
    with_backoff(20, 50, || match fs::remove_file(tmp) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    })
}
