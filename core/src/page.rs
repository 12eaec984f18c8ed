//! Pagination of member lists
//!
//! Every paginated view shows at most `page_limit` rows at a time, however
//! long the underlying container is. [`PageHandler`] tracks which slice is
//! current; [`DisplayedRows`] tracks which row slots are in use.

use crate::config::PageLimit;

/// Direction of a relative page turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// Emitted when the current page actually changes.
///
/// Each one drives exactly one redisplay pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTurned {
    pub from: usize,
    pub to: usize,
}

/// Page position within a list of known length.
#[derive(Debug, Clone)]
pub struct PageHandler {
    /// Rows per page, fixed at construction
    limit: PageLimit,
    /// Total number of entries in the list
    list_count: usize,
    /// Zero-based current page
    current_page: usize,
}

impl PageHandler {
    pub fn new(limit: PageLimit) -> Self {
        Self {
            limit,
            list_count: 0,
            current_page: 0,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    pub fn list_count(&self) -> usize {
        self.list_count
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Number of pages; an empty list still has one (empty) page.
    pub fn page_count(&self) -> usize {
        self.list_count.div_ceil(self.limit()).max(1)
    }

    /// Index of the first entry on the current page.
    pub fn start_index(&self) -> usize {
        self.current_page * self.limit()
    }

    /// Number of entries on the current page.
    pub fn page_len(&self) -> usize {
        self.list_count
            .saturating_sub(self.start_index())
            .min(self.limit())
    }

    /// Update the list length, resetting to the first page if the current
    /// one no longer exists.
    pub fn set_list_count(&mut self, count: usize) {
        self.list_count = count;
        let start_past_end = count > 0 && self.start_index() >= count;
        if start_past_end || self.current_page >= self.page_count() {
            self.current_page = 0;
        }
    }

    /// Indices of the entries on the current page.
    pub fn indices(&self) -> PageIndices {
        let start = self.start_index().min(self.list_count);
        PageIndices {
            next: start,
            end: start + self.page_len(),
        }
    }

    /// Turn one page left or right. Turning past either end does nothing.
    pub fn turn(&mut self, turn: Turn) -> Option<PageTurned> {
        let target = match turn {
            Turn::Left => self.current_page.checked_sub(1)?,
            Turn::Right => self.current_page + 1,
        };
        self.turn_to(target)
    }

    /// Turn to `page` if it exists and differs from the current page.
    pub fn turn_to(&mut self, page: usize) -> Option<PageTurned> {
        if page >= self.page_count() || page == self.current_page {
            return None;
        }
        let from = self.current_page;
        self.current_page = page;
        Some(PageTurned { from, to: page })
    }

    /// Move to `page`, clamped into the valid range.
    pub fn jump_to(&mut self, page: usize) -> Option<PageTurned> {
        let clamped = page.min(self.page_count() - 1);
        self.turn_to(clamped)
    }

    /// Whether page controls should be shown at all.
    pub fn needs_controls(&self) -> bool {
        self.page_count() > 1
    }

    /// Pager label, e.g. `"Page 2 / 3"`.
    pub fn label(&self) -> String {
        format!("Page {} / {}", self.current_page + 1, self.page_count())
    }
}

/// Lazy iterator over the entry indices of one page.
///
/// Cloning restarts from the clone point; calling [`PageHandler::indices`]
/// again restarts from the page start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIndices {
    next: usize,
    end: usize,
}

impl Iterator for PageIndices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PageIndices {}

/// Fixed buffer of row slots for one paginated view.
///
/// Slot `k` holds the entry index shown in the `k`th row, or `None`. The
/// buffer is always an occupied prefix followed by an empty suffix, which
/// lets [`DisplayedRows::clear`] stop at the first empty slot.
#[derive(Debug, Clone)]
pub struct DisplayedRows {
    slots: Vec<Option<usize>>,
}

impl DisplayedRows {
    pub fn new(limit: PageLimit) -> Self {
        Self {
            slots: vec![None; limit.get()],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().take_while(|s| s.is_some()).count()
    }

    /// Occupied entry indices in slot order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().map_while(|s| *s)
    }

    /// Empty the buffer from slot 0, calling `hide` for each cleared entry and
    /// stopping at the first slot that is already empty.
    pub fn clear(&mut self, mut hide: impl FnMut(usize)) {
        for slot in self.slots.iter_mut() {
            match slot.take() {
                Some(index) => hide(index),
                None => break,
            }
        }
        self.check_prefix();
    }

    /// Clear the buffer, then occupy one slot per index, in order.
    pub fn fill(&mut self, indices: impl IntoIterator<Item = usize>, hide: impl FnMut(usize)) {
        self.clear(hide);
        for (slot, index) in self.slots.iter_mut().zip(indices) {
            *slot = Some(index);
        }
        self.check_prefix();
    }

    /// Forget every slot without hiding anything; used when the rows
    /// themselves have already been destroyed.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    fn check_prefix(&self) {
        debug_assert!(
            self.slots
                .iter()
                .skip_while(|s| s.is_some())
                .all(|s| s.is_none()),
            "displayed rows must be a contiguous prefix"
        );
    }
}
