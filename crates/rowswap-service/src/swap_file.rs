//! The row-swap engine: crash-safe exchange of two lines of a text file.
//!
//! The rewrite never touches the original file in place. Every swap writes
//! the full new content to a freshly created temporary sibling file and then
//! renames it over the original, so an external reader observes either the
//! old content or the new content, never a half-written file. The temporary
//! name is unique per invocation (process id + monotonic counter) and the
//! temporary file is removed on every failure path after its creation.
//!
//! The line count is established once, when the file is opened, and never
//! recomputed: a swap changes content, not line count, and the service is
//! the sole writer of the file for the duration of its run.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// Sequence for unique temporary file names across concurrent swaps.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Why a swap (or the startup validation) failed.
///
/// The `Display` text of a variant is the descriptive outcome sent back to
/// the remote peer; none of these crash the service.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("file {path} does not exist")]
    Missing { path: PathBuf },

    #[error("file {path} is not readable and writable: {source}")]
    Inaccessible {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("file {path} is not operational after an earlier I/O failure")]
    NotOperational { path: PathBuf },

    #[error("line {index} is out of range for a {line_count}-line file")]
    OutOfRange { index: u64, line_count: u64 },

    #[error("file {path} no longer contains line {index}")]
    MissingLine { path: PathBuf, index: u64 },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write temporary file {path}: {source}")]
    TempWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to replace {path} with rewritten content: {source}")]
    Replace {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A validated target file and its startup line count.
#[derive(Debug)]
pub struct SwapFile {
    path: PathBuf,
    line_count: u64,
    valid: bool,
}

impl SwapFile {
    /// Opens and validates the target file.
    ///
    /// The file must exist and be openable for both reading and writing;
    /// the full line scan that establishes the count happens here. A
    /// validation failure prevents the service from becoming operational
    /// at all, which is the caller's deployment-time concern.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SwapError> {
        let path = path.into();

        match fs::metadata(&path).await {
            Ok(_) => {}
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(SwapError::Missing { path });
            }
            Err(source) => return Err(SwapError::Inaccessible { path, source }),
        }

        // Opening read+write probes both permissions in one step.
        fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .await
            .map_err(|source| SwapError::Inaccessible {
                path: path.clone(),
                source,
            })?;

        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| SwapError::Read {
                path: path.clone(),
                source,
            })?;
        let line_count = content.lines().count() as u64;

        debug!("Opened {} with {} lines", path.display(), line_count);
        Ok(Self {
            path,
            line_count,
            valid: true,
        })
    }

    /// Returns the target file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the line count established at startup.
    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    /// Returns false once a read failure has made the file non-operational.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Exchanges lines `line1` and `line2` (zero-based).
    ///
    /// Out-of-range indices are a reported outcome, not a fault: the file
    /// is left untouched. `line1 == line2` succeeds without a rewrite.
    pub async fn swap(&mut self, line1: u64, line2: u64) -> Result<(), SwapError> {
        if !self.valid {
            return Err(SwapError::NotOperational {
                path: self.path.clone(),
            });
        }

        for index in [line1, line2] {
            if index >= self.line_count {
                return Err(SwapError::OutOfRange {
                    index,
                    line_count: self.line_count,
                });
            }
        }

        if line1 == line2 {
            return Ok(());
        }

        // Single scan captures every line, the two to exchange included.
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(source) => {
                self.valid = false;
                return Err(SwapError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut lines: Vec<&str> = content.lines().collect();
        for index in [line1, line2] {
            if index as usize >= lines.len() {
                return Err(SwapError::MissingLine {
                    path: self.path.clone(),
                    index,
                });
            }
        }
        lines.swap(line1 as usize, line2 as usize);

        let mut rewritten = String::with_capacity(content.len() + 1);
        for line in &lines {
            rewritten.push_str(line);
            rewritten.push('\n');
        }

        let temp = self.temp_path();
        if let Err(source) = fs::write(&temp, rewritten).await {
            self.cleanup_temp(&temp).await;
            return Err(SwapError::TempWrite { path: temp, source });
        }

        // Rename-with-overwrite is the atomic replace; until it succeeds
        // the original content is fully retained.
        if let Err(source) = fs::rename(&temp, &self.path).await {
            self.cleanup_temp(&temp).await;
            return Err(SwapError::Replace {
                path: self.path.clone(),
                source,
            });
        }

        debug!(
            "Swapped lines {} and {} of {}",
            line1,
            line2,
            self.path.display()
        );
        Ok(())
    }

    /// Builds a unique temporary sibling path for one swap invocation.
    fn temp_path(&self) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let stem = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("swap");
        let name = format!(".{}.{}-{}.tmp", stem, std::process::id(), seq);
        match self.path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }

    async fn cleanup_temp(&self, temp: &Path) {
        if let Err(e) = fs::remove_file(temp).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temporary file {}: {}", temp.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn fixture(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("target.txt");
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).await.unwrap();
        path
    }

    async fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .await
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_open_counts_lines() {
        let dir = tempdir().unwrap();
        let path = fixture(dir.path(), &["a", "b", "c"]).await;

        let file = SwapFile::open(&path).await.unwrap();
        assert_eq!(file.line_count(), 3);
        assert!(file.is_valid());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = SwapFile::open(dir.path().join("absent.txt")).await.unwrap_err();
        assert!(matches!(err, SwapError::Missing { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_open_unwritable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = fixture(dir.path(), &["a"]).await;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();

        // Privileged test runners bypass file modes entirely; without the
        // permission failure there is nothing to observe here.
        if std::fs::OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }

        let err = SwapFile::open(&path).await.unwrap_err();
        assert!(matches!(err, SwapError::Inaccessible { .. }));
    }

    #[tokio::test]
    async fn test_swap_exchanges_lines() {
        let dir = tempdir().unwrap();
        let path = fixture(dir.path(), &["a", "b", "c"]).await;
        let mut file = SwapFile::open(&path).await.unwrap();

        file.swap(0, 2).await.unwrap();
        assert_eq!(read_lines(&path).await, ["c", "b", "a"]);

        // Line count never changes, only content.
        assert_eq!(file.line_count(), 3);
    }

    #[tokio::test]
    async fn test_swap_is_an_involution() {
        let dir = tempdir().unwrap();
        let path = fixture(dir.path(), &["one", "two", "three", "four"]).await;
        let original = fs::read_to_string(&path).await.unwrap();
        let mut file = SwapFile::open(&path).await.unwrap();

        for (i, j) in [(0, 3), (1, 2), (2, 0)] {
            file.swap(i, j).await.unwrap();
            file.swap(i, j).await.unwrap();
            assert_eq!(fs::read_to_string(&path).await.unwrap(), original);
        }
    }

    #[tokio::test]
    async fn test_swap_same_line_is_a_noop() {
        let dir = tempdir().unwrap();
        let path = fixture(dir.path(), &["a", "b"]).await;
        let original = fs::read_to_string(&path).await.unwrap();
        let mut file = SwapFile::open(&path).await.unwrap();

        file.swap(1, 1).await.unwrap();
        assert_eq!(fs::read_to_string(&path).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_out_of_range_rejected_and_file_unchanged() {
        let dir = tempdir().unwrap();
        let path = fixture(dir.path(), &["a", "b", "c"]).await;
        let original = fs::read_to_string(&path).await.unwrap();
        let mut file = SwapFile::open(&path).await.unwrap();

        // The line count itself is already out of range.
        let err = file.swap(3, 0).await.unwrap_err();
        assert!(matches!(
            err,
            SwapError::OutOfRange {
                index: 3,
                line_count: 3
            }
        ));
        assert_eq!(fs::read_to_string(&path).await.unwrap(), original);

        let err = file.swap(0, 100).await.unwrap_err();
        assert!(matches!(err, SwapError::OutOfRange { index: 100, .. }));
        assert_eq!(fs::read_to_string(&path).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_swap_normalizes_missing_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("target.txt");
        fs::write(&path, "a\nb\nc").await.unwrap();
        let mut file = SwapFile::open(&path).await.unwrap();

        file.swap(0, 1).await.unwrap();
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "b\na\nc\n");
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind_on_success() {
        let dir = tempdir().unwrap();
        let path = fixture(dir.path(), &["a", "b"]).await;
        let mut file = SwapFile::open(&path).await.unwrap();

        file.swap(0, 1).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["target.txt"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_rewrite_leaves_original_untouched() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = fixture(dir.path(), &["a", "b", "c"]).await;
        let original = fs::read_to_string(&path).await.unwrap();
        let mut file = SwapFile::open(&path).await.unwrap();

        // A read-only parent directory makes the temporary file creation
        // fail; the original must remain byte-for-byte intact.
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged test runners bypass directory modes entirely; without
        // the injected failure there is nothing to observe here.
        let probe = dir.path().join("probe");
        if std::fs::write(&probe, "x").is_ok() {
            let _ = std::fs::remove_file(&probe);
            std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let err = file.swap(0, 2).await.unwrap_err();
        assert!(matches!(err, SwapError::TempWrite { .. }));

        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(fs::read_to_string(&path).await.unwrap(), original);

        // No stray temporary files either.
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["target.txt"]);

        // A temp-stage failure does not mark the file invalid.
        assert!(file.is_valid());
        file.swap(0, 2).await.unwrap();
        assert_eq!(read_lines(&path).await, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_temp_paths_are_unique() {
        let dir = tempdir().unwrap();
        let path = fixture(dir.path(), &["a"]).await;
        let file = SwapFile::open(&path).await.unwrap();

        let first = file.temp_path();
        let second = file.temp_path();
        assert_ne!(first, second);
        assert_eq!(first.parent(), path.parent());
    }
}
