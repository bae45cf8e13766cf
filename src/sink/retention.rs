//! Shared retention pruning for the rotating file sinks.
//!
//! Follows a `prune_old_files`-style policy: list the directory, keep the
//! `keep` most recently modified matches, delete the rest.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub(crate) fn prune(dir: &Path, keep: usize, is_rotated: impl Fn(&Path) -> bool) -> std::io::Result<()> {
    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !is_rotated(&path) {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push((modified, path));
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in candidates.into_iter().skip(keep) {
        let _ = std::fs::remove_file(path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_most_recent_n_and_removes_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            let path = dir.path().join(format!("app.{i}.log"));
            std::fs::write(&path, b"x").unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        prune(dir.path(), 2, |p| {
            p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with("app."))
        })
        .unwrap();
        let remaining: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(remaining.len(), 2);
    }
}
