//! Value cache
//!
//! Every inspected value is held as an [`InspectedValue`]: the last value read
//! from the host, the representation chosen for it, and its display string.
//! Building one never walks members and never touches the display; rows are
//! attached separately, and sub-content is materialized lazily by
//! [`Expansion`].

mod builder;
pub mod format;
mod tests;

use std::fmt;

use tracing::debug;

pub use builder::{RepresentationKind, select_kind};

use builder::{Classified, classify};

use crate::config::InspectorConfig;
use crate::display::{DisplaySurface, RowId, RowKind};
use crate::error::{IntrospectError, MemberError};
use crate::expand::{Expansion, ExpansionSource};
use crate::provider::{
    Access, EvaluationResult, IterationCapability, LiveObjectProvider, LiveValue, MemberDesc,
    MemberKind, TypeRef,
};

/// Key of a value within its parent: a member name or an element index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberKey {
    Name(String),
    Index(usize),
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Name(name) => f.write_str(name),
            MemberKey::Index(index) => write!(f, "[{}]", index),
        }
    }
}

impl From<&str> for MemberKey {
    fn from(name: &str) -> Self {
        MemberKey::Name(name.to_string())
    }
}

impl From<usize> for MemberKey {
    fn from(index: usize) -> Self {
        MemberKey::Index(index)
    }
}

/// Cached representation of a value, with any per-kind state.
#[derive(Debug)]
pub enum Representation {
    Primitive,
    Enum,
    FunctionRef,
    Struct(Expansion),
    Container(Expansion),
    /// Type information could not be obtained.
    Unreadable(IntrospectError),
    /// Reading the value failed; shown as an inline error cell.
    Failed(MemberError),
    /// Method that has not been invoked yet.
    Unevaluated,
}

impl Representation {
    fn from_classified(
        classified: Result<Classified, IntrospectError>,
        config: &InspectorConfig,
    ) -> Self {
        let classified = match classified {
            Ok(c) => c,
            Err(e) => return Representation::Unreadable(e),
        };
        match classified.kind {
            RepresentationKind::Primitive => Representation::Primitive,
            RepresentationKind::Enum => Representation::Enum,
            RepresentationKind::FunctionRef => Representation::FunctionRef,
            RepresentationKind::Struct => {
                Representation::Struct(Expansion::new(ExpansionSource::Members, config))
            }
            RepresentationKind::Container => Representation::Container(Expansion::new(
                ExpansionSource::Elements {
                    element: classified.element,
                    capability: classified
                        .capability
                        .unwrap_or(IterationCapability::Unknown),
                },
                config,
            )),
            RepresentationKind::Unreadable => {
                Representation::Unreadable(IntrospectError::UnknownType(classified.ty.to_string()))
            }
        }
    }

    /// Selected kind, or `None` for failed and unevaluated cells.
    pub fn kind(&self) -> Option<RepresentationKind> {
        match self {
            Representation::Primitive => Some(RepresentationKind::Primitive),
            Representation::Enum => Some(RepresentationKind::Enum),
            Representation::FunctionRef => Some(RepresentationKind::FunctionRef),
            Representation::Struct(_) => Some(RepresentationKind::Struct),
            Representation::Container(_) => Some(RepresentationKind::Container),
            Representation::Unreadable(_) => Some(RepresentationKind::Unreadable),
            Representation::Failed(_) | Representation::Unevaluated => None,
        }
    }

    pub fn expansion(&self) -> Option<&Expansion> {
        match self {
            Representation::Struct(exp) | Representation::Container(exp) => Some(exp),
            _ => None,
        }
    }

    pub fn expansion_mut(&mut self) -> Option<&mut Expansion> {
        match self {
            Representation::Struct(exp) | Representation::Container(exp) => Some(exp),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Representation::Failed(_))
    }

    fn row_kind(&self) -> RowKind {
        if self.expansion().is_some() {
            RowKind::Expandable
        } else {
            RowKind::Value
        }
    }
}

/// A live value as last read, with its representation and display state.
#[derive(Debug)]
pub struct InspectedValue {
    /// Name or index within the parent
    key: MemberKey,
    /// Type hint from the parent's declaration
    declared: TypeRef,
    /// Type the representation was chosen on, if introspection succeeded
    runtime: Option<TypeRef>,
    /// Last value read (`Null` for failed and unevaluated cells)
    value: LiveValue,
    rep: Representation,
    /// Current display string, without the key
    display: String,
    /// Display changed since the row text was last synced
    dirty: bool,
    /// Host object behind the value no longer exists
    gone: bool,
    /// Display row, once attached
    row: Option<RowId>,
}

impl InspectedValue {
    /// Build the cached representation of `result`.
    ///
    /// Allocates only; no members are walked and no row is created.
    pub fn build(
        provider: &dyn LiveObjectProvider,
        config: &InspectorConfig,
        key: MemberKey,
        result: EvaluationResult,
        declared: TypeRef,
    ) -> Self {
        let mut cached = Self {
            key,
            declared,
            runtime: None,
            value: LiveValue::Null,
            rep: Representation::Unevaluated,
            display: String::new(),
            dirty: false,
            gone: false,
            row: None,
        };
        cached.assign(provider, config, result);
        cached.refresh_display(provider, config);
        cached
    }

    /// A method result that has not been computed yet.
    pub fn unevaluated(key: MemberKey, declared: TypeRef) -> Self {
        Self {
            key,
            declared,
            runtime: None,
            value: LiveValue::Null,
            rep: Representation::Unevaluated,
            display: format::NOT_EVALUATED.to_string(),
            dirty: true,
            gone: false,
            row: None,
        }
    }

    pub fn key(&self) -> &MemberKey {
        &self.key
    }

    pub fn declared_type(&self) -> &TypeRef {
        &self.declared
    }

    /// Type used for display: the runtime type if known, else the declared one.
    pub fn ty(&self) -> &TypeRef {
        self.runtime.as_ref().unwrap_or(&self.declared)
    }

    pub fn value(&self) -> &LiveValue {
        &self.value
    }

    pub fn representation(&self) -> &Representation {
        &self.rep
    }

    pub fn expansion(&self) -> Option<&Expansion> {
        self.rep.expansion()
    }

    pub(crate) fn expansion_mut(&mut self) -> Option<&mut Expansion> {
        self.rep.expansion_mut()
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Full row text, `key: display`.
    pub fn row_text(&self) -> String {
        format!("{}: {}", self.key, self.display)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_gone(&self) -> bool {
        self.gone
    }

    pub fn row(&self) -> Option<RowId> {
        self.row
    }

    /// Sub-entry by key, if this value is expanded.
    pub fn child(&self, key: &MemberKey) -> Option<&MemberEntry> {
        self.rep.expansion()?.entry(key)
    }

    pub fn child_mut(&mut self, key: &MemberKey) -> Option<&mut MemberEntry> {
        self.rep.expansion_mut()?.entry_mut(key)
    }

    // =========================================================================
    // Display wiring
    // =========================================================================

    /// Create this value's row under `parent` (or at top level).
    pub fn attach(&mut self, surface: &mut dyn DisplaySurface, parent: Option<RowId>) -> RowId {
        if let Some(row) = self.row {
            return row;
        }
        let row = surface.create_row(parent, self.rep.row_kind());
        surface.set_text(row, &self.row_text());
        self.dirty = false;
        self.row = Some(row);
        if let Some(exp) = self.rep.expansion_mut() {
            exp.attach_rows(surface, row);
        }
        row
    }

    /// Make the row visible under `parent`, creating it on first display.
    pub(crate) fn show(&mut self, surface: &mut dyn DisplaySurface, parent: RowId) {
        match self.row {
            Some(row) => {
                surface.set_visible(row, true);
                self.sync_row(surface);
            }
            None => {
                self.attach(surface, Some(parent));
            }
        }
    }

    pub(crate) fn hide(&self, surface: &mut dyn DisplaySurface) {
        if let Some(row) = self.row {
            surface.set_visible(row, false);
        }
    }

    /// Push a changed display string to the row.
    pub fn sync_row(&mut self, surface: &mut dyn DisplaySurface) {
        if !self.dirty {
            return;
        }
        if let Some(row) = self.row {
            surface.set_text(row, &self.row_text());
            self.dirty = false;
        }
    }

    /// Destroy the row and everything beneath it.
    pub fn destroy(self, surface: &mut dyn DisplaySurface) {
        if let Some(row) = self.row {
            surface.destroy_row(row);
        }
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Replace the cached value with a fresh read.
    ///
    /// Keeps the row. If the representation kind is unchanged the update is
    /// forwarded to the expansion; otherwise the old representation and its
    /// sub-rows are torn down.
    pub fn set_value(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
        config: &InspectorConfig,
        result: EvaluationResult,
    ) {
        let same_shape = match &result {
            Ok(value) => {
                let classified = classify(provider, value, &self.declared).ok();
                classified.is_some_and(|c| {
                    self.rep.kind() == Some(c.kind) && self.runtime.as_ref() == Some(&c.ty)
                })
            }
            Err(_) => false,
        };

        match result {
            Ok(value) if same_shape => {
                self.value = value;
                if let Some(exp) = self.rep.expansion_mut() {
                    exp.on_value_updated(provider, surface, config, &self.value, self.row);
                }
            }
            result => {
                if let Some(exp) = self.rep.expansion_mut() {
                    exp.collapse(surface);
                }
                self.assign(provider, config, result);
                if let Some(row) = self.row {
                    surface.set_kind(row, self.rep.row_kind());
                }
            }
        }

        self.gone = false;
        self.refresh_display(provider, config);
    }

    fn assign(
        &mut self,
        provider: &dyn LiveObjectProvider,
        config: &InspectorConfig,
        result: EvaluationResult,
    ) {
        match result {
            Ok(value) => {
                let classified = classify(provider, &value, &self.declared);
                self.runtime = classified.as_ref().ok().map(|c| c.ty.clone());
                self.rep = Representation::from_classified(classified, config);
                self.value = value;
            }
            Err(e) => {
                self.runtime = None;
                self.rep = Representation::Failed(e);
                self.value = LiveValue::Null;
            }
        }
    }

    /// Open or close this value's sub-content.
    ///
    /// Returns false if the value has nothing to expand.
    pub fn toggle(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
        config: &InspectorConfig,
        open: bool,
    ) -> bool {
        if self.gone {
            return false;
        }
        let Some(exp) = self.rep.expansion_mut() else {
            return false;
        };
        if open {
            exp.expand(provider, surface, config, &self.value, self.row);
        } else {
            exp.collapse(surface);
        }
        self.refresh_display(provider, config);
        self.sync_row(surface);
        true
    }

    /// Per-tick refresh of a visible value.
    ///
    /// Checks the host object still exists, lets an open expansion run its
    /// identity check, and syncs the row text.
    pub fn poll(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
        config: &InspectorConfig,
    ) {
        if self.check_alive(provider, surface)
            && let Some(exp) = self.rep.expansion_mut()
            && exp.is_expanded()
        {
            exp.poll(provider, surface, config, &self.value, self.row);
        }
        self.refresh_display(provider, config);
        self.sync_row(surface);
    }

    /// Finish an update: refresh the display string and sync the row.
    pub(crate) fn settle(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
        config: &InspectorConfig,
    ) {
        self.check_alive(provider, surface);
        self.refresh_display(provider, config);
        self.sync_row(surface);
    }

    /// Collapse and mark the value gone if its host object was destroyed.
    fn check_alive(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
    ) -> bool {
        let alive = provider.is_alive(&self.value);
        if !alive && !self.gone {
            if let Some(exp) = self.rep.expansion_mut() {
                exp.collapse(surface);
            }
            debug!(key = %self.key, "host object gone, collapsed");
        }
        self.gone = !alive;
        alive
    }

    fn refresh_display(&mut self, provider: &dyn LiveObjectProvider, config: &InspectorConfig) {
        let text = if self.gone {
            format::DESTROYED.to_string()
        } else {
            match &self.rep {
                Representation::Failed(e) => format!("<error: {}>", e),
                Representation::Unreadable(e) => format!("<unreadable: {}>", e),
                Representation::Unevaluated => format::NOT_EVALUATED.to_string(),
                _ if self.value.is_null() => format::NULL.to_string(),
                Representation::Container(exp) => format::container(
                    exp.count(provider, &self.value),
                    exp.truncated(),
                    self.ty(),
                ),
                Representation::Struct(_) => self.ty().to_string(),
                Representation::Primitive | Representation::Enum | Representation::FunctionRef => {
                    format::scalar(&self.value, self.ty(), config.max_string_len)
                }
            }
        };
        if text != self.display {
            self.display = text;
            self.dirty = true;
        }
    }
}

/// Kind of a materialized entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Field,
    Property,
    Method,
    /// Element of a container, keyed by index.
    Element,
}

impl From<MemberKind> for EntryKind {
    fn from(kind: MemberKind) -> Self {
        match kind {
            MemberKind::Field => EntryKind::Field,
            MemberKind::Property => EntryKind::Property,
            MemberKind::Method => EntryKind::Method,
        }
    }
}

/// One materialized child of an expanded value.
#[derive(Debug)]
pub struct MemberEntry {
    kind: EntryKind,
    access: Access,
    /// Declaration the entry was read through; `None` for elements
    desc: Option<MemberDesc>,
    value: InspectedValue,
}

impl MemberEntry {
    /// Wrap the element at `index` of a container walk.
    ///
    /// Only elements of indexed containers can be written back.
    pub fn element(
        provider: &dyn LiveObjectProvider,
        config: &InspectorConfig,
        index: usize,
        result: EvaluationResult,
        element: TypeRef,
        capability: IterationCapability,
    ) -> Self {
        let access = match capability {
            IterationCapability::Indexed => Access::READ_WRITE,
            IterationCapability::Sequence | IterationCapability::Unknown => Access::READ_ONLY,
        };
        Self {
            kind: EntryKind::Element,
            access,
            desc: None,
            value: InspectedValue::build(provider, config, MemberKey::Index(index), result, element),
        }
    }

    /// Read a declared member of `target`. Methods are left unevaluated.
    pub fn member(
        provider: &dyn LiveObjectProvider,
        config: &InspectorConfig,
        target: &LiveValue,
        desc: MemberDesc,
    ) -> Self {
        let key = MemberKey::Name(desc.name.clone());
        let value = if desc.kind == MemberKind::Method {
            InspectedValue::unevaluated(key, desc.ty.clone())
        } else {
            let result = provider.read_member(target, &desc);
            InspectedValue::build(provider, config, key, result, desc.ty.clone())
        };
        Self {
            kind: desc.kind.into(),
            access: desc.access,
            desc: Some(desc),
            value,
        }
    }

    pub fn key(&self) -> &MemberKey {
        self.value.key()
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn desc(&self) -> Option<&MemberDesc> {
        self.desc.as_ref()
    }

    pub fn value(&self) -> &InspectedValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut InspectedValue {
        &mut self.value
    }

    pub fn into_value(self) -> InspectedValue {
        self.value
    }

    pub fn is_failed(&self) -> bool {
        self.value.representation().is_failed()
    }

    /// Re-read the entry from `parent` and refresh it.
    ///
    /// Indexed elements and readable members are re-read; methods and
    /// elements of forward-only containers keep their last value.
    pub(crate) fn refresh(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
        config: &InspectorConfig,
        parent: &LiveValue,
    ) {
        let fresh = match (self.kind, &self.desc, self.value.key()) {
            (EntryKind::Element, _, MemberKey::Index(index)) => provider.element_at(parent, *index),
            (EntryKind::Method, _, _) => None,
            (_, Some(desc), _) => Some(provider.read_member(parent, desc)),
            _ => None,
        };
        match fresh {
            Some(result) => {
                self.value.set_value(provider, surface, config, result);
                self.value.settle(provider, surface, config);
            }
            None => self.value.poll(provider, surface, config),
        }
    }
}
