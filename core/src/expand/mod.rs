//! Lazy member expansion
//!
//! Struct and container values materialize their members only when opened.
//! A full walk runs at most once per expansion; while open, each tick runs a
//! cheap identity check and only rebuilds when the container was swapped or
//! gained or lost elements. Otherwise just the current page is re-read.


use tracing::{debug, warn};

use crate::cache::{MemberEntry, MemberKey};
use crate::config::InspectorConfig;
use crate::display::{DisplaySurface, RowId, RowKind};
use crate::error::MemberError;
use crate::page::{DisplayedRows, PageHandler, PageTurned, Turn};
use crate::provider::{ElementIter, IterationCapability, LiveObjectProvider, LiveValue, TypeRef};

/// Where an expansion's entries come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionSource {
    /// Declared members of the value's runtime type.
    Members,
    /// Elements yielded by iterating the value.
    Elements {
        element: TypeRef,
        capability: IterationCapability,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    Collapsed,
    Expanded,
}

/// Work counters for one expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Full member walks performed
    pub walks: u64,
    /// Redisplay passes performed
    pub redisplays: u64,
}

/// What the last walk saw: the value handle, its cheap length and its
/// container version, where the provider reports them.
#[derive(Debug, Clone, PartialEq)]
struct Identity {
    value: LiveValue,
    len: Option<usize>,
    version: Option<u64>,
}

impl Identity {
    fn of(provider: &dyn LiveObjectProvider, source: &ExpansionSource, value: &LiveValue) -> Self {
        let (len, version) = match source {
            ExpansionSource::Elements { .. } => (
                provider.element_count(value),
                provider.container_version(value),
            ),
            ExpansionSource::Members => (None, None),
        };
        Self {
            value: value.clone(),
            len,
            version,
        }
    }

    /// A container with neither a length nor a version can change without
    /// the handle changing; it has to be walked again to find out.
    fn is_blind(&self, source: &ExpansionSource) -> bool {
        matches!(source, ExpansionSource::Elements { .. })
            && self.len.is_none()
            && self.version.is_none()
    }
}

/// Expansion state of one struct or container value.
#[derive(Debug)]
pub struct Expansion {
    source: ExpansionSource,
    state: ExpansionState,
    /// Set when the value changed while collapsed
    refresh_needed: bool,
    /// Materialized entries, in traversal order
    entries: Vec<MemberEntry>,
    /// Identity at the last walk; `None` when nothing is materialized
    snapshot: Option<Identity>,
    pages: PageHandler,
    displayed: DisplayedRows,
    /// Page controls row, present while expanded
    pager_row: Option<RowId>,
    /// Last walk stopped at the walk limit
    truncated: bool,
    /// Last walk could not iterate the value at all
    walk_error: Option<MemberError>,
    stats: ExpansionStats,
}

impl Expansion {
    /// Create a collapsed expansion. The page limit is fixed here.
    pub fn new(source: ExpansionSource, config: &InspectorConfig) -> Self {
        Self {
            source,
            state: ExpansionState::Collapsed,
            refresh_needed: true,
            entries: Vec::new(),
            snapshot: None,
            pages: PageHandler::new(config.page_limit),
            displayed: DisplayedRows::new(config.page_limit),
            pager_row: None,
            truncated: false,
            walk_error: None,
            stats: ExpansionStats::default(),
        }
    }

    pub fn source(&self) -> &ExpansionSource {
        &self.source
    }

    pub fn state(&self) -> ExpansionState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == ExpansionState::Expanded
    }

    pub fn refresh_needed(&self) -> bool {
        self.refresh_needed
    }

    /// Whether the next expansion will run a full walk.
    pub fn rebuild_pending(&self) -> bool {
        self.refresh_needed || self.snapshot.is_none()
    }

    pub fn entries(&self) -> &[MemberEntry] {
        &self.entries
    }

    pub fn entry(&self, key: &MemberKey) -> Option<&MemberEntry> {
        match key {
            MemberKey::Index(index) => self.entries.get(*index).filter(|e| e.key() == key),
            MemberKey::Name(_) => self.entries.iter().find(|e| e.key() == key),
        }
    }

    pub fn entry_mut(&mut self, key: &MemberKey) -> Option<&mut MemberEntry> {
        match key {
            MemberKey::Index(index) => self.entries.get_mut(*index).filter(|e| e.key() == key),
            MemberKey::Name(_) => self.entries.iter_mut().find(|e| e.key() == key),
        }
    }

    pub fn pages(&self) -> &PageHandler {
        &self.pages
    }

    pub fn pager_row(&self) -> Option<RowId> {
        self.pager_row
    }

    /// Entry indices currently occupying display rows.
    pub fn displayed(&self) -> impl Iterator<Item = usize> + '_ {
        self.displayed.iter()
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn walk_error(&self) -> Option<&MemberError> {
        self.walk_error.as_ref()
    }

    pub fn stats(&self) -> ExpansionStats {
        self.stats
    }

    /// Element count for the `[count] Type` label.
    ///
    /// While a rebuild is pending only the provider's cheap length can be
    /// trusted; after a walk the materialized count is authoritative.
    pub fn count(&self, provider: &dyn LiveObjectProvider, value: &LiveValue) -> Option<usize> {
        if self.rebuild_pending() {
            provider.element_count(value)
        } else {
            Some(self.entries.len())
        }
    }

    // =========================================================================
    // State transitions
    // =========================================================================

    /// Notify that the owning value was re-read.
    pub(crate) fn on_value_updated(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
        config: &InspectorConfig,
        value: &LiveValue,
        row: Option<RowId>,
    ) {
        match self.state {
            ExpansionState::Collapsed => self.refresh_needed = true,
            ExpansionState::Expanded => self.poll(provider, surface, config, value, row),
        }
    }

    /// Open the expansion, walking first if anything changed since the last
    /// walk or nothing is materialized.
    pub(crate) fn expand(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
        config: &InspectorConfig,
        value: &LiveValue,
        row: Option<RowId>,
    ) {
        if self.is_expanded() {
            return;
        }
        if let Some(parent) = row
            && self.pager_row.is_none()
        {
            self.pager_row = Some(surface.create_row(Some(parent), RowKind::Pager));
        }
        if self.rebuild_pending() {
            self.walk(provider, surface, config, value);
        }
        self.refresh_needed = false;
        self.state = ExpansionState::Expanded;
        self.redisplay(surface, row);
    }

    /// Wire display rows for an expansion opened before its owner had a row.
    pub(crate) fn attach_rows(&mut self, surface: &mut dyn DisplaySurface, row: RowId) {
        if !self.is_expanded() || self.pager_row.is_some() {
            return;
        }
        self.pager_row = Some(surface.create_row(Some(row), RowKind::Pager));
        self.redisplay(surface, Some(row));
    }

    /// Close the expansion, destroying every entry and its rows.
    ///
    /// The next expansion rebuilds from scratch.
    pub(crate) fn collapse(&mut self, surface: &mut dyn DisplaySurface) {
        self.destroy_entries(surface);
        if let Some(pager) = self.pager_row.take() {
            surface.destroy_row(pager);
        }
        self.snapshot = None;
        self.refresh_needed = false;
        self.truncated = false;
        self.walk_error = None;
        self.state = ExpansionState::Collapsed;
    }

    /// Per-tick identity check of an open expansion.
    ///
    /// Rebuilds when the handle, length or container version changed, and on
    /// every call for containers that report neither a length nor a version.
    pub(crate) fn poll(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
        config: &InspectorConfig,
        value: &LiveValue,
        row: Option<RowId>,
    ) {
        if !self.is_expanded() {
            return;
        }
        let current = Identity::of(provider, &self.source, value);
        if self.snapshot.as_ref() != Some(&current) || current.is_blind(&self.source) {
            debug!(
                len = ?current.len,
                version = ?current.version,
                "identity changed, rebuilding"
            );
            self.walk(provider, surface, config, value);
            self.redisplay(surface, row);
            return;
        }
        for index in self.displayed.iter() {
            if let Some(entry) = self.entries.get_mut(index) {
                entry.refresh(provider, surface, config, value);
            }
        }
    }

    /// Turn one page; redisplays once if the page changed.
    pub(crate) fn turn_page(
        &mut self,
        surface: &mut dyn DisplaySurface,
        row: Option<RowId>,
        turn: Turn,
    ) -> Option<PageTurned> {
        if !self.is_expanded() {
            return None;
        }
        let turned = self.pages.turn(turn)?;
        self.redisplay(surface, row);
        Some(turned)
    }

    /// Jump to a page, clamped into range; redisplays once if it changed.
    pub(crate) fn jump_to_page(
        &mut self,
        surface: &mut dyn DisplaySurface,
        row: Option<RowId>,
        page: usize,
    ) -> Option<PageTurned> {
        if !self.is_expanded() {
            return None;
        }
        let turned = self.pages.jump_to(page)?;
        self.redisplay(surface, row);
        Some(turned)
    }

    // =========================================================================
    // Walk and redisplay
    // =========================================================================

    /// Rebuild every entry from the live value.
    fn walk(
        &mut self,
        provider: &dyn LiveObjectProvider,
        surface: &mut dyn DisplaySurface,
        config: &InspectorConfig,
        value: &LiveValue,
    ) {
        self.destroy_entries(surface);
        self.truncated = false;
        self.walk_error = None;

        if !value.is_null() {
            match &self.source {
                ExpansionSource::Elements {
                    element,
                    capability,
                } => match acquire(provider, value, *capability) {
                    Ok(iter) => {
                        for (index, item) in iter.enumerate() {
                            if index >= config.walk_limit {
                                self.truncated = true;
                                break;
                            }
                            self.entries.push(MemberEntry::element(
                                provider,
                                config,
                                index,
                                item,
                                element.clone(),
                                *capability,
                            ));
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "could not iterate container");
                        self.walk_error = Some(e);
                    }
                },
                ExpansionSource::Members => {
                    let members = provider
                        .runtime_type(value)
                        .and_then(|ty| provider.members(&ty));
                    match members {
                        Ok(members) => {
                            self.truncated = members.len() > config.walk_limit;
                            self.entries.extend(
                                members
                                    .into_iter()
                                    .take(config.walk_limit)
                                    .map(|desc| MemberEntry::member(provider, config, value, desc)),
                            );
                        }
                        Err(e) => {
                            warn!(error = %e, "could not list members");
                            self.walk_error = Some(MemberError::Read(e.to_string()));
                        }
                    }
                }
            }
        }

        if self.truncated {
            warn!(
                limit = config.walk_limit,
                "member walk truncated at the walk limit"
            );
        }

        self.snapshot = Some(Identity::of(provider, &self.source, value));
        self.pages.set_list_count(self.entries.len());
        self.stats.walks += 1;
        debug!(entries = self.entries.len(), "member walk complete");
    }

    /// Show the current page: hide the rows left over from the previous one,
    /// then show one row per entry on this page.
    fn redisplay(&mut self, surface: &mut dyn DisplaySurface, row: Option<RowId>) {
        let Some(parent) = row else {
            return;
        };
        let entries = &self.entries;
        self.displayed.fill(self.pages.indices(), |index| {
            if let Some(entry) = entries.get(index) {
                entry.value().hide(surface);
            }
        });
        for index in self.displayed.iter() {
            if let Some(entry) = self.entries.get_mut(index) {
                entry.value_mut().show(surface, parent);
            }
        }
        self.sync_pager(surface);
        self.stats.redisplays += 1;
    }

    fn sync_pager(&self, surface: &mut dyn DisplaySurface) {
        let Some(pager) = self.pager_row else {
            return;
        };
        let notice = match (&self.walk_error, self.truncated) {
            (Some(e), _) => Some(format!("<error: {}>", e)),
            (None, true) => Some(format!("showing first {}", self.entries.len())),
            (None, false) => None,
        };
        let text = match &notice {
            Some(notice) if self.pages.needs_controls() => {
                format!("{} ({})", self.pages.label(), notice)
            }
            Some(notice) => notice.clone(),
            None => self.pages.label(),
        };
        surface.set_text(pager, &text);
        surface.set_visible(pager, self.pages.needs_controls() || notice.is_some());
    }

    fn destroy_entries(&mut self, surface: &mut dyn DisplaySurface) {
        for entry in self.entries.drain(..) {
            entry.into_value().destroy(surface);
        }
        self.displayed.reset();
        self.snapshot = None;
    }
}

/// Acquire a forward iterator, falling back to the generic enumeration shim
/// when the container's own protocol cannot be bound.
fn acquire<'a>(
    provider: &'a dyn LiveObjectProvider,
    container: &LiveValue,
    capability: IterationCapability,
) -> Result<ElementIter<'a>, MemberError> {
    if capability == IterationCapability::Unknown {
        return provider.enumerate_unknown(container);
    }
    provider.iterate(container).or_else(|e| {
        debug!(error = %e, "iteration protocol unavailable, using enumeration shim");
        provider.enumerate_unknown(container)
    })
}
