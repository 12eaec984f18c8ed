//! Display surface abstraction
//!
//! The engine only ever creates rows, sets their text and visibility, and
//! destroys them. Whatever draws those rows (the egui panel, a terminal dump,
//! a test recorder) sits behind [`DisplaySurface`].

mod retained;

pub use retained::{RetainedSurface, RowNode, SurfaceStats};

slotmap::new_key_type! {
    /// Stable handle to a row on a display surface.
    pub struct RowId;
}

/// What a row stands for, so a renderer can pick the right affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Leaf value (primitive, enum, function, error cell).
    Value,
    /// Value with sub-content that can be toggled open.
    Expandable,
    /// Page controls of an expanded container.
    Pager,
    /// Scroll handle owned by a view's scroll indicator.
    Scrollbar,
}

/// Receiver of row construction and visibility calls.
pub trait DisplaySurface {
    /// Create a visible, empty row under `parent` (or at top level).
    fn create_row(&mut self, parent: Option<RowId>, kind: RowKind) -> RowId;

    fn set_text(&mut self, row: RowId, text: &str);

    fn set_visible(&mut self, row: RowId, visible: bool);

    /// Change what a row stands for, keeping its place and children.
    fn set_kind(&mut self, row: RowId, kind: RowKind);

    /// Destroy a row and all rows beneath it.
    fn destroy_row(&mut self, row: RowId);

    fn row_exists(&self, row: RowId) -> bool;

    /// Number of visible content rows beneath `row`, recursively.
    /// Scroll handles are not counted.
    fn visible_rows(&self, row: RowId) -> usize;
}
