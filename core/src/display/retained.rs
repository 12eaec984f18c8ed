//! Retained row tree
//!
//! Headless [`DisplaySurface`] that keeps every row in memory. Immediate-mode
//! renderers (the egui panel) and the text export read from it each frame.

use slotmap::SlotMap;

use super::{DisplaySurface, RowId, RowKind};

/// One row of the retained tree.
#[derive(Debug, Clone)]
pub struct RowNode {
    pub parent: Option<RowId>,
    pub kind: RowKind,
    pub text: String,
    pub visible: bool,
    pub children: Vec<RowId>,
}

/// Call counters, useful to check that refreshes stay bounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub created: u64,
    pub destroyed: u64,
    pub text_updates: u64,
    pub visibility_updates: u64,
}

/// Headless retained display surface.
#[derive(Debug, Default)]
pub struct RetainedSurface {
    rows: SlotMap<RowId, RowNode>,
    roots: Vec<RowId>,
    stats: SurfaceStats,
}

impl RetainedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level rows in creation order.
    pub fn roots(&self) -> &[RowId] {
        &self.roots
    }

    pub fn row(&self, row: RowId) -> Option<&RowNode> {
        self.rows.get(row)
    }

    /// Text of a row, if it exists.
    pub fn text(&self, row: RowId) -> Option<&str> {
        self.rows.get(row).map(|node| node.text.as_str())
    }

    /// Number of rows currently alive, visible or not.
    pub fn live_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    /// Whether a row and all of its ancestors are visible.
    pub fn is_shown(&self, row: RowId) -> bool {
        let mut current = Some(row);
        while let Some(id) = current {
            match self.rows.get(id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// An expandable row is open while it has content sub-rows; collapsing
    /// destroys them.
    pub fn is_open(&self, row: RowId) -> bool {
        self.rows.get(row).is_some_and(|node| {
            node.kind == RowKind::Expandable
                && node
                    .children
                    .iter()
                    .filter_map(|&c| self.rows.get(c))
                    .any(|c| c.kind != RowKind::Scrollbar)
        })
    }

    /// Visit every shown row depth-first, in child order.
    pub fn visit_shown(&self, mut visit: impl FnMut(usize, RowId, &RowNode)) {
        for &root in &self.roots {
            self.visit_from(root, 0, &mut visit);
        }
    }

    fn visit_from(&self, row: RowId, depth: usize, visit: &mut impl FnMut(usize, RowId, &RowNode)) {
        let Some(node) = self.rows.get(row) else {
            return;
        };
        if !node.visible {
            return;
        }
        visit(depth, row, node);
        for &child in &node.children {
            self.visit_from(child, depth + 1, visit);
        }
    }

    /// Texts of the shown children of `row`, in order.
    pub fn shown_child_texts(&self, row: RowId) -> Vec<&str> {
        self.rows
            .get(row)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&c| self.rows.get(c))
                    .filter(|c| c.visible)
                    .map(|c| c.text.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn count_visible(&self, row: RowId) -> usize {
        let Some(node) = self.rows.get(row) else {
            return 0;
        };
        node.children
            .iter()
            .filter_map(|&c| self.rows.get(c).map(|n| (c, n)))
            .filter(|(_, n)| n.visible && n.kind != RowKind::Scrollbar)
            .map(|(c, _)| 1 + self.count_visible(c))
            .sum()
    }
}

impl DisplaySurface for RetainedSurface {
    fn create_row(&mut self, parent: Option<RowId>, kind: RowKind) -> RowId {
        let parent = parent.filter(|p| self.rows.contains_key(*p));
        let id = self.rows.insert(RowNode {
            parent,
            kind,
            text: String::new(),
            visible: true,
            children: Vec::new(),
        });
        match parent.and_then(|p| self.rows.get_mut(p)) {
            Some(node) => node.children.push(id),
            None => self.roots.push(id),
        }
        self.stats.created += 1;
        id
    }

    fn set_text(&mut self, row: RowId, text: &str) {
        if let Some(node) = self.rows.get_mut(row)
            && node.text != text
        {
            node.text.clear();
            node.text.push_str(text);
            self.stats.text_updates += 1;
        }
    }

    fn set_visible(&mut self, row: RowId, visible: bool) {
        if let Some(node) = self.rows.get_mut(row)
            && node.visible != visible
        {
            node.visible = visible;
            self.stats.visibility_updates += 1;
        }
    }

    fn set_kind(&mut self, row: RowId, kind: RowKind) {
        if let Some(node) = self.rows.get_mut(row) {
            node.kind = kind;
        }
    }

    fn destroy_row(&mut self, row: RowId) {
        let Some(node) = self.rows.remove(row) else {
            return;
        };
        self.stats.destroyed += 1;

        match node.parent.and_then(|p| self.rows.get_mut(p)) {
            Some(parent) => parent.children.retain(|&c| c != row),
            None => self.roots.retain(|&r| r != row),
        }

        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(node) = self.rows.remove(child) {
                self.stats.destroyed += 1;
                pending.extend(node.children);
            }
        }
    }

    fn row_exists(&self, row: RowId) -> bool {
        self.rows.contains_key(row)
    }

    fn visible_rows(&self, row: RowId) -> usize {
        self.count_visible(row)
    }
}
