//! Objscope Core - Live object inspection engine
//!
//! This crate inspects values owned by a running host through a provider
//! abstraction, caches a display representation per value, expands
//! structures and containers lazily and pages long containers.
//!
//! # Architecture
//!
//! - [`LiveObjectProvider`] - Host backend: reads, writes, invokes and iterates members
//! - [`DisplaySurface`] - Row sink the engine draws into ([`RetainedSurface`] keeps rows in memory)
//! - [`InspectedValue`] - Cached representation of one value and its row
//! - [`Expansion`] - Lazily walked members or elements of an expandable value
//! - [`PageHandler`] - Page arithmetic for long containers
//! - [`Inspector`] - Facade owning roots, the surface and per-tick widgets

pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod expand;
pub mod export;
pub mod inspector;
pub mod page;
#[cfg(feature = "panel")]
pub mod panel;
pub mod provider;
pub mod schedule;
#[cfg(test)]
mod test_utils;

// Re-export the engine types
pub use cache::{
    EntryKind, InspectedValue, MemberEntry, MemberKey, Representation, RepresentationKind,
    select_kind,
};
pub use config::{InspectorConfig, PageLimit};
pub use display::{DisplaySurface, RetainedSurface, RowId, RowKind};
pub use error::{ConfigError, IntrospectError, MemberError, PathError, WriteError};
pub use expand::{Expansion, ExpansionSource, ExpansionState};
pub use export::{export_as_json, export_as_text};
pub use inspector::{Inspector, NodePath, PanelAction};
pub use page::{PageHandler, PageTurned, Turn};
pub use provider::{
    HeapProvider, IterationCapability, LiveObjectProvider, LiveValue, MemberDesc, TypeIntrospector,
    TypeRef,
};
pub use schedule::{ScrollIndicator, Widget, WidgetRegistry, WidgetStatus};

#[cfg(feature = "panel")]
pub use panel::InspectorPanel;
