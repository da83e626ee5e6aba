//! Reading and replacing target files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Whether stages write their results or only report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace files whose content changed.
    #[default]
    Write,
    /// Compute changes without touching any file.
    Check,
}

/// Result of a stage that ran against an optional target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    /// The file was processed.
    Done {
        stats: T,
        /// Content differs from what was on disk (written unless checking).
        changed: bool,
    },
    /// The target file does not exist.
    Skipped { path: PathBuf },
}

impl<T> StageOutcome<T> {
    pub fn stats(&self) -> Option<&T> {
        match self {
            StageOutcome::Done { stats, .. } => Some(stats),
            StageOutcome::Skipped { .. } => None,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self, StageOutcome::Done { changed: true, .. })
    }
}

/// Read `path`, returning `None` if it does not exist.
pub(crate) fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Store `updated` at `path` if it differs from `original`.
///
/// Returns whether the content changed. The new content is written to a
/// uniquely named temporary file in the same directory, given the target's
/// permissions, and renamed over the target.
pub(crate) fn store(path: &Path, original: &str, updated: &str, mode: WriteMode) -> io::Result<bool> {
    if original == updated {
        debug!("{} unchanged", path.display());
        return Ok(false);
    }
    if mode == WriteMode::Check {
        debug!("{} would change (check mode)", path.display());
        return Ok(true);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.write_all(updated.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_optional_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_optional(&dir.path().join("absent.cpp")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_store_writes_changed_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.cpp");
        fs::write(&path, "old").unwrap();

        assert!(store(&path, "old", "new", WriteMode::Write).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_store_leaves_unrelated_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.cpp");
        let neighbour = dir.path().join("gen.cpp.opsync.tmp");
        fs::write(&path, "old").unwrap();
        fs::write(&neighbour, "keep").unwrap();

        assert!(store(&path, "old", "new", WriteMode::Write).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_to_string(&neighbour).unwrap(), "keep");
    }

    #[cfg(unix)]
    #[test]
    fn test_store_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.sh");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(store(&path, "old", "new", WriteMode::Write).unwrap());
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_store_skips_unchanged_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.cpp");
        fs::write(&path, "same").unwrap();

        assert!(!store(&path, "same", "same", WriteMode::Write).unwrap());
    }

    #[test]
    fn test_check_mode_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.cpp");
        fs::write(&path, "old").unwrap();

        assert!(store(&path, "old", "new", WriteMode::Check).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }
}
