//! Test file discovery.

use crate::config::{ScanConfig, DEFAULT_EXCLUDES};
use crate::types::ScanWarning;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that stop a scan before any file is read.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root path does not exist.
    #[error("path not found: {}", path.display())]
    RootNotFound {
        /// The missing root.
        path: PathBuf,
    },

    /// The root exists but cannot be listed.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The unreadable path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// An exclude pattern is not a valid glob.
    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Glob compiler error.
        source: glob::PatternError,
    },
}

/// A discovered test file with its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as discovered (root joined with the relative path).
    pub path: PathBuf,
    /// File contents.
    pub text: String,
}

/// One item produced by [`Scanner::entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    /// A readable test file.
    File(SourceFile),
    /// A matching file that could not be read.
    Skipped(ScanWarning),
}

/// Walks a root path and yields the test files under it.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    suffixes: Vec<String>,
    exclude: Vec<glob::Pattern>,
    respect_gitignore: bool,
}

impl Scanner {
    /// Creates a scanner for `root` with the given settings.
    ///
    /// The `root` field of `config` is ignored in favour of `root`. The
    /// configured excludes are added to [`DEFAULT_EXCLUDES`].
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidPattern`] if an exclude glob does not compile.
    pub fn new(root: impl Into<PathBuf>, config: &ScanConfig) -> Result<Self, ScanError> {
        let exclude = DEFAULT_EXCLUDES
            .iter()
            .copied()
            .chain(config.exclude.iter().map(String::as_str))
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| ScanError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.into(),
            suffixes: config.suffixes.clone(),
            exclude,
            respect_gitignore: config.respect_gitignore,
        })
    }

    /// Returns the scan root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists matching test files in sorted order.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or cannot be listed.
    pub fn discover(&self) -> Result<Vec<PathBuf>, ScanError> {
        let metadata = std::fs::metadata(&self.root).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ScanError::RootNotFound {
                    path: self.root.clone(),
                }
            } else {
                ScanError::Io {
                    path: self.root.clone(),
                    source,
                }
            }
        })?;

        if metadata.is_file() {
            return Ok(if self.matches_suffix(&self.root) {
                vec![self.root.clone()]
            } else {
                debug!("Root {} is not a test file", self.root.display());
                Vec::new()
            });
        }

        std::fs::read_dir(&self.root).map_err(|source| ScanError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .require_git(false)
            .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git");

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) || !self.matches_suffix(path) {
                continue;
            }
            if self.is_excluded(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Reads one discovered file.
    #[must_use]
    pub fn read(&self, path: &Path) -> ScanEntry {
        match std::fs::read_to_string(path) {
            Ok(text) => ScanEntry::File(SourceFile {
                path: path.to_path_buf(),
                text,
            }),
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                ScanEntry::Skipped(ScanWarning {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Discovers and lazily reads every test file.
    ///
    /// Each call walks the tree again.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing or cannot be listed.
    pub fn entries(&self) -> Result<impl Iterator<Item = ScanEntry> + '_, ScanError> {
        let paths = self.discover()?;
        Ok(paths.into_iter().map(move |path| self.read(&path)))
    }

    fn matches_suffix(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.suffixes.iter().any(|s| name.ends_with(s.as_str())))
    }

    /// A path is excluded when a pattern matches it or one of its parent
    /// directories, relative to the root.
    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.ancestors().any(|candidate| {
            !candidate.as_os_str().is_empty()
                && self.exclude.iter().any(|p| p.matches_path(candidate))
        })
    }
}
