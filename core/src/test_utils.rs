//! Shared test utilities for unit tests

use crate::cache::{InspectedValue, MemberKey};
use crate::config::{InspectorConfig, PageLimit};
use crate::display::RetainedSurface;
use crate::provider::{HeapProvider, LiveValue, TypeRef};

// ============================================================================
// Fixtures
// ============================================================================

/// Config with a given page limit and defaults otherwise.
pub fn config_with_limit(limit: usize) -> InspectorConfig {
    InspectorConfig {
        page_limit: PageLimit::new(limit).unwrap(),
        ..InspectorConfig::default()
    }
}

/// `Int` values for every number in `range`.
pub fn ints(range: std::ops::Range<i64>) -> Vec<LiveValue> {
    range.map(LiveValue::Int).collect()
}

/// Heap, retained surface and config wired together.
pub struct Harness {
    pub heap: HeapProvider,
    pub surface: RetainedSurface,
    pub config: InspectorConfig,
}

impl Harness {
    pub fn new(limit: usize) -> Self {
        Self {
            heap: HeapProvider::new(),
            surface: RetainedSurface::new(),
            config: config_with_limit(limit),
        }
    }

    /// Build a top-level value and attach its row.
    pub fn root(&mut self, name: &str, value: LiveValue) -> InspectedValue {
        let mut root = InspectedValue::build(
            &self.heap,
            &self.config,
            MemberKey::from(name),
            Ok(value),
            TypeRef::object(),
        );
        root.attach(&mut self.surface, None);
        root
    }

    pub fn toggle(&mut self, value: &mut InspectedValue, open: bool) -> bool {
        value.toggle(&self.heap, &mut self.surface, &self.config, open)
    }

    pub fn poll(&mut self, value: &mut InspectedValue) {
        value.poll(&self.heap, &mut self.surface, &self.config);
    }

    /// Text of a value's row as currently shown.
    pub fn row_text(&self, value: &InspectedValue) -> String {
        value
            .row()
            .and_then(|row| self.surface.text(row))
            .unwrap_or_default()
            .to_string()
    }

    /// Texts of the shown entry rows under a value, pager excluded.
    pub fn shown_entries(&self, value: &InspectedValue) -> Vec<String> {
        let pager = value.expansion().and_then(|e| e.pager_row());
        let Some(node) = value.row().and_then(|row| self.surface.row(row)) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter(|&&c| Some(c) != pager)
            .filter_map(|&c| self.surface.row(c))
            .filter(|c| c.visible)
            .map(|c| c.text.clone())
            .collect()
    }
}

/// Values of a value's materialized entries; failed entries map to `None`.
pub fn entry_values(value: &InspectedValue) -> Vec<Option<LiveValue>> {
    value
        .expansion()
        .map(|exp| {
            exp.entries()
                .iter()
                .map(|e| (!e.is_failed()).then(|| e.value().value().clone()))
                .collect()
        })
        .unwrap_or_default()
}
