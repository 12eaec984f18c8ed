//! Per-tick widget updates
//!
//! Widgets that need attention every tick (scroll indicators today) live in a
//! [`WidgetRegistry`]. Each tick visits every live widget once; a widget that
//! reports itself destroyed is dropped during the same pass without
//! disturbing the handles of the others.

use slotmap::SlotMap;

use crate::display::{DisplaySurface, RowId, RowKind};

slotmap::new_key_type! {
    /// Stable handle to a registered widget.
    pub struct WidgetKey;
}

/// Result of one widget update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetStatus {
    Alive,
    /// The widget's content is gone; deregister it.
    Destroyed,
}

/// Something updated once per host tick.
pub trait Widget {
    fn update(&mut self, surface: &mut dyn DisplaySurface) -> WidgetStatus;
}

/// Arena of active widgets.
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: SlotMap<WidgetKey, Box<dyn Widget>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, widget: Box<dyn Widget>) -> WidgetKey {
        self.widgets.insert(widget)
    }

    /// Deregister a widget. Returns false if it was already gone.
    pub fn remove(&mut self, key: WidgetKey) -> bool {
        self.widgets.remove(key).is_some()
    }

    pub fn contains(&self, key: WidgetKey) -> bool {
        self.widgets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Update every widget once, dropping those that report destroyed.
    ///
    /// Returns the number of widgets updated.
    pub fn update_all(&mut self, surface: &mut dyn DisplaySurface) -> usize {
        let mut updated = 0;
        self.widgets.retain(|_, widget| {
            updated += 1;
            widget.update(surface) == WidgetStatus::Alive
        });
        updated
    }
}

/// Scroll handle for one view.
///
/// Shown only while the view has more visible rows than fit in the viewport.
/// Visibility is only touched on transitions.
#[derive(Debug)]
pub struct ScrollIndicator {
    /// Row whose visible descendants are measured
    content: RowId,
    /// Handle row, created on first update
    handle: Option<RowId>,
    viewport_rows: usize,
    shown: bool,
    /// Row count last written to the handle
    last_total: Option<usize>,
}

impl ScrollIndicator {
    pub fn new(content: RowId, viewport_rows: usize) -> Self {
        Self {
            content,
            handle: None,
            viewport_rows,
            shown: false,
            last_total: None,
        }
    }

    pub fn handle(&self) -> Option<RowId> {
        self.handle
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }
}

impl Widget for ScrollIndicator {
    fn update(&mut self, surface: &mut dyn DisplaySurface) -> WidgetStatus {
        if !surface.row_exists(self.content) {
            if let Some(handle) = self.handle.take()
                && surface.row_exists(handle)
            {
                surface.destroy_row(handle);
            }
            return WidgetStatus::Destroyed;
        }

        let handle = match self.handle {
            Some(handle) => handle,
            None => {
                let handle = surface.create_row(Some(self.content), RowKind::Scrollbar);
                surface.set_visible(handle, false);
                self.handle = Some(handle);
                handle
            }
        };

        let total = surface.visible_rows(self.content);
        let overflow = total > self.viewport_rows;
        if overflow != self.shown {
            surface.set_visible(handle, overflow);
            self.shown = overflow;
        }
        if overflow && self.last_total != Some(total) {
            surface.set_text(handle, &format!("{} / {} rows", self.viewport_rows, total));
            self.last_total = Some(total);
        }
        WidgetStatus::Alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::RetainedSurface;

    struct Countdown {
        remaining: u32,
        updates: std::rc::Rc<std::cell::Cell<u32>>,
    }

    impl Widget for Countdown {
        fn update(&mut self, _surface: &mut dyn DisplaySurface) -> WidgetStatus {
            self.updates.set(self.updates.get() + 1);
            if self.remaining == 0 {
                return WidgetStatus::Destroyed;
            }
            self.remaining -= 1;
            WidgetStatus::Alive
        }
    }

    #[test]
    fn test_destroyed_widgets_removed_in_same_pass() {
        let mut surface = RetainedSurface::new();
        let mut registry = WidgetRegistry::new();
        let updates = std::rc::Rc::new(std::cell::Cell::new(0));

        let keys: Vec<WidgetKey> = [0, 1, 0, 2]
            .into_iter()
            .map(|remaining| {
                registry.register(Box::new(Countdown {
                    remaining,
                    updates: updates.clone(),
                }))
            })
            .collect();

        // Every widget is visited, even those after a removal
        assert_eq!(registry.update_all(&mut surface), 4);
        assert_eq!(updates.get(), 4);
        assert_eq!(registry.len(), 2);
        assert!(!registry.contains(keys[0]));
        assert!(registry.contains(keys[1]));
        assert!(!registry.contains(keys[2]));
        assert!(registry.contains(keys[3]));

        assert_eq!(registry.update_all(&mut surface), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(keys[3]));
    }

    #[test]
    fn test_scroll_indicator_tracks_overflow() {
        let mut surface = RetainedSurface::new();
        let content = surface.create_row(None, RowKind::Expandable);
        let mut indicator = ScrollIndicator::new(content, 3);

        assert_eq!(indicator.update(&mut surface), WidgetStatus::Alive);
        let handle = indicator.handle().unwrap();
        assert!(!indicator.is_shown());
        assert!(!surface.row(handle).unwrap().visible);

        let rows: Vec<RowId> = (0..4)
            .map(|_| surface.create_row(Some(content), RowKind::Value))
            .collect();
        indicator.update(&mut surface);
        assert!(indicator.is_shown());
        assert_eq!(surface.text(handle), Some("3 / 4 rows"));

        let toggles = surface.stats().visibility_updates;
        indicator.update(&mut surface);
        assert_eq!(surface.stats().visibility_updates, toggles);

        surface.set_visible(rows[0], false);
        indicator.update(&mut surface);
        assert!(!indicator.is_shown());
    }

    #[test]
    fn test_scroll_indicator_deregisters_with_content() {
        let mut surface = RetainedSurface::new();
        let mut registry = WidgetRegistry::new();
        let content = surface.create_row(None, RowKind::Expandable);
        let key = registry.register(Box::new(ScrollIndicator::new(content, 3)));

        registry.update_all(&mut surface);
        assert_eq!(surface.live_rows(), 2);

        surface.destroy_row(content);
        registry.update_all(&mut surface);
        assert!(!registry.contains(key));
        assert_eq!(surface.live_rows(), 0);
    }
}
