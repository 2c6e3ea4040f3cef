use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// Recursively collect `*.json` capture files under `dir`, newest first.
/// Hidden files and anything under a hidden directory are skipped. A missing
/// directory yields an empty list.
pub fn discover_json_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut found: Vec<(SystemTime, PathBuf)> = WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !e.file_name().to_str().map(is_hidden).unwrap_or(false))
        .filter_map(|e| match e {
            Ok(ent) => Some(ent),
            Err(err) => {
                tracing::warn!("Cannot read entry under {}: {}", dir.display(), err);
                None
            }
        })
        .filter(|ent| ent.file_type().is_file())
        .filter(|ent| {
            ent.path()
                .extension()
                .and_then(|x| x.to_str())
                .map(|x| x.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .map(|ent| {
            let mtime = fs::metadata(ent.path())
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (mtime, ent.into_path())
        })
        .collect();

    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    found.into_iter().map(|(_, p)| p).collect()
}

/// Expand a mix of files and directories into capture files. Directories are
/// discovered recursively; plain paths are kept as given (missing ones included,
/// so ingestion can report them).
pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for input in inputs {
        let p = input.as_ref();
        if p.is_dir() {
            let files = discover_json_files(p);
            tracing::info!("Discovered {} JSON files under {}.", files.len(), p.display());
            out.extend(files);
        } else {
            out.push(p.to_path_buf());
        }
    }
    out
}
