//! Filesystem listing service.
//!
//! The planner never touches a filesystem directly. It goes through the
//! [`FileSystem`] trait so the same sizing logic can run against the local disk
//! ([`LocalFs`]) or any distributed store that can list a directory, report
//! consumed space, and tell the configured block size of a path.
//!
//! All calls are synchronous and may block on network latency in remote
//! implementations. Timeouts and retries belong to the implementation.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::common::FileEntry;
use crate::error::{CompactionError, Result};

/// HDFS default `dfs.blocksize`.
pub const DEFAULT_BLOCK_SIZE: u64 = 128 * 1024 * 1024;

pub trait FileSystem {
    /// Entries the location resolves to. A plain path yields itself (a file or a
    /// directory entry); a wildcard path yields every match. Wildcards may
    /// appear in any path component.
    fn status(&self, path: &Path) -> Result<Vec<FileEntry>>;

    /// Children of a directory, ordered by name.
    fn list(&self, path: &Path) -> Result<Vec<FileEntry>>;

    /// Bytes consumed on disk by the path, recursively for directories.
    fn content_summary(&self, path: &Path) -> Result<u64>;

    /// Block size new files under `path` would be written with.
    fn default_block_size(&self, path: &Path) -> Result<u64>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn status(&self, path: &Path) -> Result<Vec<FileEntry>> {
        (**self).status(path)
    }

    fn list(&self, path: &Path) -> Result<Vec<FileEntry>> {
        (**self).list(path)
    }

    fn content_summary(&self, path: &Path) -> Result<u64> {
        (**self).content_summary(path)
    }

    fn default_block_size(&self, path: &Path) -> Result<u64> {
        (**self).default_block_size(path)
    }
}

/// Local-disk listing service.
#[derive(Debug, Clone)]
pub struct LocalFs {
    block_size: u64,
}

impl LocalFs {
    pub fn new(block_size: u64) -> Self {
        Self { block_size }
    }

    fn entry(path: PathBuf) -> Result<FileEntry> {
        let meta = fs::metadata(&path).map_err(|e| CompactionError::fs(&path, e))?;
        Ok(FileEntry {
            size_on_disk: if meta.is_dir() { 0 } else { meta.len() },
            is_dir: meta.is_dir(),
            path,
        })
    }

    /// Expands a path one component at a time. Literal components are
    /// appended to every candidate; wildcard components fan out over the
    /// matching children of each candidate directory.
    fn glob(&self, path: &Path) -> Result<Vec<FileEntry>> {
        let mut candidates = vec![PathBuf::new()];
        for component in path.components() {
            let part = component.as_os_str();
            let Some(pattern) = part.to_str().filter(|p| has_wildcard(p)) else {
                for candidate in &mut candidates {
                    candidate.push(part);
                }
                continue;
            };
            let matcher = wildcard_regex(pattern).map_err(|e| {
                CompactionError::Config(format!("invalid wildcard pattern '{}': {}", pattern, e))
            })?;
            let mut next = Vec::new();
            for dir in &candidates {
                let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir.as_path() };
                if !dir.is_dir() {
                    continue;
                }
                next.extend(
                    self.list(dir)?
                        .into_iter()
                        .filter(|entry| matcher.is_match(entry.name()))
                        .map(|entry| entry.path),
                );
            }
            candidates = next;
        }

        let mut matches = candidates
            .into_iter()
            .filter(|candidate| candidate.exists())
            .map(Self::entry)
            .collect::<Result<Vec<_>>>()?;
        matches.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(matches)
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl FileSystem for LocalFs {
    fn status(&self, path: &Path) -> Result<Vec<FileEntry>> {
        if path.to_str().is_some_and(has_wildcard) {
            self.glob(path)
        } else {
            Ok(vec![Self::entry(path.to_path_buf())?])
        }
    }

    fn list(&self, path: &Path) -> Result<Vec<FileEntry>> {
        let read_dir = fs::read_dir(path).map_err(|e| CompactionError::fs(path, e))?;
        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| CompactionError::fs(path, e))?;
            entries.push(Self::entry(dir_entry.path())?);
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn content_summary(&self, path: &Path) -> Result<u64> {
        let mut total = 0u64;
        for entry in WalkDir::new(path) {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(path).to_path_buf();
                CompactionError::fs(at, e.into())
            })?;
            if entry.file_type().is_file() {
                let meta = entry.metadata().map_err(|e| CompactionError::fs(entry.path(), e.into()))?;
                total += meta.len();
            }
        }
        Ok(total)
    }

    fn default_block_size(&self, _path: &Path) -> Result<u64> {
        Ok(self.block_size)
    }
}

fn has_wildcard(s: &str) -> bool {
    s.contains(|c: char| c == '*' || c == '?')
}

/// Translates a `*`/`?` wildcard into an anchored regex.
fn wildcard_regex(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re)
}
