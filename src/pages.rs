//! Multi-page image buffers and page selection.
//!
//! A [`PageBuffer`] owns the decoded pages of one image — animation frames,
//! icon resolution variants, or multi-page document pages — plus a cursor
//! marking the *active* page, the one read operations apply to. The two
//! selection routines here are the only real logic in the crate:
//!
//! - [`PageBuffer::largest_page`] — scan for the widest page (icon files
//!   ship several resolutions; the viewer wants the biggest one).
//! - [`PageBuffer::select_page`] — resolve a [`PageSelection`] to a concrete
//!   index, with wrap-around bounds so "next page" past the end lands on the
//!   first page and "previous page" before the start lands on the last.
//!
//! Both take `&mut self`: the scan moves the cursor, and exclusive access
//! means no reader can observe a half-finished scan.

use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("page buffer holds no pages")]
    Empty,
    #[error("page index {index} out of range ({count} pages)")]
    OutOfRange { index: usize, count: usize },
}

/// A page-selection request.
///
/// `Default` asks for the format-dependent default page (largest page for
/// `.ico` sources, page 0 for everything else). `At` is an explicit index,
/// allowed to be out of range — see [`PageBuffer::select_page`] for the
/// wrap-around rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSelection {
    #[default]
    Default,
    At(isize),
}

/// Result of a [`PageBuffer::largest_page`] scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LargestPage {
    pub index: usize,
    pub width: u32,
}

/// Owned, possibly multi-page decoded image buffer.
///
/// Dimensions are observable only through the active-page cursor
/// ([`select`](Self::select) + [`active_dimensions`](Self::active_dimensions));
/// the selection routines are written against that access model.
pub struct PageBuffer {
    pages: Vec<DynamicImage>,
    active: usize,
}

impl PageBuffer {
    pub fn new(pages: Vec<DynamicImage>) -> Self {
        Self { pages, active: 0 }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Index of the currently active page.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Move the cursor to `index`.
    pub fn select(&mut self, index: usize) -> Result<(), PageError> {
        if index >= self.pages.len() {
            return Err(PageError::OutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    /// The currently active page, if the buffer has any pages.
    pub fn active_page(&self) -> Option<&DynamicImage> {
        self.pages.get(self.active)
    }

    /// Width and height of the active page.
    pub fn active_dimensions(&self) -> Option<(u32, u32)> {
        self.active_page().map(|p| (p.width(), p.height()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DynamicImage> {
        self.pages.iter()
    }

    pub fn into_pages(self) -> Vec<DynamicImage> {
        self.pages
    }

    /// Scan all pages for the one with the greatest width.
    ///
    /// Ties resolve to the first occurrence. The scan walks the cursor
    /// across every page and parks it on page 0 afterwards — callers rely
    /// on ending up at the first page regardless of where the cursor was.
    pub fn largest_page(&mut self) -> Result<LargestPage, PageError> {
        if self.pages.is_empty() {
            return Err(PageError::Empty);
        }

        let mut best = LargestPage { index: 0, width: 0 };
        for index in 0..self.pages.len() {
            self.active = index;
            let (width, _) = self.active_dimensions().unwrap_or((0, 0));
            if width > best.width {
                best = LargestPage { index, width };
            }
        }

        self.active = 0;
        Ok(best)
    }

    /// Resolve a selection request and move the cursor to it.
    ///
    /// An empty buffer is a no-op returning 0. `source` is used only to
    /// detect `.ico` files for the default policy. Out-of-range explicit
    /// indices wrap rather than clamp: past the end goes to page 0, before
    /// the start goes to the last page.
    pub fn select_page(&mut self, request: PageSelection, source: &Path) -> usize {
        if self.pages.is_empty() {
            return 0;
        }

        let count = self.pages.len();
        let requested = match request {
            PageSelection::At(index) => index,
            PageSelection::Default => self.default_page(source) as isize,
        };

        let resolved = if requested >= count as isize {
            0
        } else if requested < 0 {
            count - 1
        } else {
            requested as usize
        };

        self.active = resolved;
        resolved
    }

    fn default_page(&mut self, source: &Path) -> usize {
        if is_icon_path(source) {
            // Non-empty is already established by the caller.
            self.largest_page().map_or(0, |p| p.index)
        } else {
            0
        }
    }
}

impl std::fmt::Debug for PageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBuffer")
            .field("pages", &self.pages.len())
            .field("active", &self.active)
            .finish()
    }
}

/// Case-insensitive `.ico` extension check.
fn is_icon_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ico"))
}
