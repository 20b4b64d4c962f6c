//! Context types for rule execution.

use crate::block::Block;
use crate::types::Location;
use std::path::{Path, PathBuf};

/// Context provided to rules for the file being checked.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path to the file as discovered.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Path relative to the scan root; used in every reported location.
    pub relative_path: PathBuf,
    lines: Vec<&'a str>,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            relative_path,
            lines: content.lines().collect(),
        }
    }

    /// Location of a line and column in this file.
    #[must_use]
    pub fn location(&self, line: usize, column: usize) -> Location {
        Location::new(self.relative_path.clone(), line, column)
    }

    /// Location of a block header.
    #[must_use]
    pub fn block_location(&self, block: &Block) -> Location {
        let span = block.span();
        self.location(span.start_line, span.column)
    }

    /// Lines of the file, split once when the context is created.
    #[must_use]
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Returns the text of a 1-indexed line, if present.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index).copied())
    }
}
