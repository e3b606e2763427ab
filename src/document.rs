use std::path::{Path, PathBuf};

use crate::page::Page;

/// An ordered set of pages plus the file it belongs to.
///
/// Pages are only mutated through [`crate::command::Command`]s so that every
/// change can be undone.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub pages: Vec<Page>,
    modified: bool,
    path: Option<PathBuf>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with exactly one blank page.
    pub fn new() -> Self {
        Self::with_page(Page::default())
    }

    pub fn with_page(page: Page) -> Self {
        Self {
            pages: vec![page],
            modified: false,
            path: None,
        }
    }

    pub(crate) fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            modified: false,
            path: None,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Clamps a possibly stale page index into the valid range.
    pub fn clamp_page(&self, index: usize) -> usize {
        index.min(self.pages.len().saturating_sub(1))
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// File stem of the associated path, e.g. `notes` for `/tmp/notes.xoj`.
    pub fn name(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
    }
}
