//! Inspector facade
//!
//! Owns the provider, the display surface, the inspected roots and the
//! per-tick widgets, and exposes the operations a host or panel drives:
//! inspecting values, toggling, paging, editing and invoking.
//!
//! Nothing here fails the host's tick. User-initiated operations return
//! errors; [`Inspector::apply`] logs them instead.

mod path;

pub use path::NodePath;

use tracing::{debug, info, warn};

use crate::cache::{EntryKind, InspectedValue, MemberKey};
use crate::config::InspectorConfig;
use crate::display::{DisplaySurface, RowId};
use crate::error::{MemberError, WriteError};
use crate::page::{PageTurned, Turn};
use crate::provider::{LiveObjectProvider, LiveValue, TypeRef};
use crate::schedule::{ScrollIndicator, WidgetKey, WidgetRegistry};

/// User input reported by a renderer, addressed by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Open or close the value on this row.
    Toggle(RowId),
    /// Turn the page of the value owning this row (or its pager).
    TurnPage(RowId, Turn),
    /// Evaluate the method on this row.
    Invoke(RowId),
}

/// One inspected top-level value.
struct RootView {
    value: InspectedValue,
    /// Scroll indicator registered for the root's row
    indicator: WidgetKey,
}

impl RootView {
    fn name(&self) -> &str {
        match self.value.key() {
            MemberKey::Name(name) => name,
            MemberKey::Index(_) => "",
        }
    }
}

/// Live object inspector.
pub struct Inspector<P, S> {
    provider: P,
    surface: S,
    config: InspectorConfig,
    roots: Vec<RootView>,
    widgets: WidgetRegistry,
    /// Whether root rows are shown and ticks do work
    menu_visible: bool,
}

impl<P: LiveObjectProvider, S: DisplaySurface> Inspector<P, S> {
    pub fn new(provider: P, surface: S, config: InspectorConfig) -> Self {
        let menu_visible = !config.hide_on_startup;
        Self {
            provider,
            surface,
            config,
            roots: Vec::new(),
            widgets: WidgetRegistry::new(),
            menu_visible,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Mutable access to the host side, for changes between ticks.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    pub fn is_menu_visible(&self) -> bool {
        self.menu_visible
    }

    /// Inspected top-level values, in the order they were added.
    pub fn roots(&self) -> impl Iterator<Item = &InspectedValue> {
        self.roots.iter().map(|r| &r.value)
    }

    // =========================================================================
    // Roots
    // =========================================================================

    /// Start inspecting `value` under `name`, replacing any root of that name.
    pub fn inspect(&mut self, name: &str, value: LiveValue, declared: TypeRef) -> NodePath {
        self.close(name);

        let mut cached = InspectedValue::build(
            &self.provider,
            &self.config,
            MemberKey::from(name),
            Ok(value),
            declared,
        );
        let row = cached.attach(&mut self.surface, None);
        if !self.menu_visible {
            self.surface.set_visible(row, false);
        }
        let indicator = self.widgets.register(Box::new(ScrollIndicator::new(
            row,
            self.config.viewport_rows,
        )));
        info!(name, ty = %cached.ty(), "inspecting");

        self.roots.push(RootView {
            value: cached,
            indicator,
        });
        NodePath::root(name)
    }

    /// Stop inspecting a root. Returns false if there was none.
    ///
    /// Deregisters the root's scroll indicator right away; its handle row
    /// goes with the root's subtree.
    pub fn close(&mut self, name: &str) -> bool {
        let Some(index) = self.roots.iter().position(|r| r.name() == name) else {
            return false;
        };
        let root = self.roots.remove(index);
        self.widgets.remove(root.indicator);
        debug!(name, "closing root");
        root.value.destroy(&mut self.surface);
        true
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn node(&self, path: &NodePath) -> Option<&InspectedValue> {
        find(&self.roots, path)
    }

    /// Path of the value shown on `row`. A pager row maps to its owner.
    pub fn path_of(&self, row: RowId) -> Option<NodePath> {
        self.roots.iter().find_map(|root| {
            let mut path = NodePath::root(root.name());
            search(&root.value, row, &mut path).then_some(path)
        })
    }

    // =========================================================================
    // User operations
    // =========================================================================

    /// Open or close a node. Returns false if the node cannot expand.
    pub fn toggle(&mut self, path: &NodePath, open: bool) -> Result<bool, WriteError> {
        let node = find_mut(&mut self.roots, path).ok_or_else(|| no_such_node(path))?;
        Ok(node.toggle(&self.provider, &mut self.surface, &self.config, open))
    }

    pub fn turn_page(
        &mut self,
        path: &NodePath,
        turn: Turn,
    ) -> Result<Option<PageTurned>, WriteError> {
        let node = find_mut(&mut self.roots, path).ok_or_else(|| no_such_node(path))?;
        let row = node.row();
        Ok(node
            .expansion_mut()
            .and_then(|exp| exp.turn_page(&mut self.surface, row, turn)))
    }

    /// Jump to a page, clamped into the valid range.
    pub fn jump_to_page(
        &mut self,
        path: &NodePath,
        page: usize,
    ) -> Result<Option<PageTurned>, WriteError> {
        let node = find_mut(&mut self.roots, path).ok_or_else(|| no_such_node(path))?;
        let row = node.row();
        Ok(node
            .expansion_mut()
            .and_then(|exp| exp.jump_to_page(&mut self.surface, row, page)))
    }

    /// Write a new value through the provider, then re-read it.
    ///
    /// Roots are not members of anything, so they are replaced locally.
    pub fn set_value(&mut self, path: &NodePath, value: LiveValue) -> Result<(), WriteError> {
        let Some((parent_path, key)) = path.split_last() else {
            let root = find_mut(&mut self.roots, path).ok_or_else(|| no_such_node(path))?;
            root.set_value(&self.provider, &mut self.surface, &self.config, Ok(value));
            root.settle(&self.provider, &mut self.surface, &self.config);
            return Ok(());
        };

        let parent = find(&self.roots, &parent_path).ok_or_else(|| no_such_node(path))?;
        let target = parent.value().clone();
        let entry = parent.child(key).ok_or_else(|| no_such_node(path))?;
        if !entry.access().write {
            return Err(WriteError::ReadOnly(path.to_string()));
        }

        let fresh = match (entry.kind(), entry.desc().cloned(), key) {
            (EntryKind::Method, _, _) => return Err(WriteError::ReadOnly(path.to_string())),
            (EntryKind::Element, _, MemberKey::Index(index)) => {
                self.provider.write_element(&target, *index, value.clone())?;
                self.provider
                    .element_at(&target, *index)
                    .unwrap_or(Ok(value))
            }
            (_, Some(desc), _) => {
                self.provider.write_member(&target, &desc, value)?;
                self.provider.read_member(&target, &desc)
            }
            _ => return Err(no_such_node(path)),
        };

        let entry = find_mut(&mut self.roots, &parent_path)
            .and_then(|parent| parent.child_mut(key))
            .ok_or_else(|| no_such_node(path))?;
        let node = entry.value_mut();
        node.set_value(&self.provider, &mut self.surface, &self.config, fresh);
        node.settle(&self.provider, &mut self.surface, &self.config);
        debug!(path = %path, "value written");
        Ok(())
    }

    /// Evaluate a parameterless method and show its result.
    ///
    /// A failing call is shown inline on the method's row and also returned.
    pub fn invoke(&mut self, path: &NodePath) -> Result<(), WriteError> {
        let (parent_path, key) = path.split_last().ok_or_else(|| no_such_node(path))?;
        let parent = find(&self.roots, &parent_path).ok_or_else(|| no_such_node(path))?;
        let target = parent.value().clone();
        let entry = parent.child(key).ok_or_else(|| no_such_node(path))?;
        let desc = match (entry.kind(), entry.desc()) {
            (EntryKind::Method, Some(desc)) => desc.clone(),
            _ => return Err(WriteError::Provider(MemberError::NotInvocable)),
        };

        let result = self.provider.invoke(&target, &desc);
        let failure = result.as_ref().err().cloned();

        let entry = find_mut(&mut self.roots, &parent_path)
            .and_then(|parent| parent.child_mut(key))
            .ok_or_else(|| no_such_node(path))?;
        let node = entry.value_mut();
        node.set_value(&self.provider, &mut self.surface, &self.config, result);
        node.settle(&self.provider, &mut self.surface, &self.config);

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Apply renderer input. Failures are logged, never returned.
    pub fn apply(&mut self, action: PanelAction) {
        let row = match action {
            PanelAction::Toggle(row) | PanelAction::TurnPage(row, _) | PanelAction::Invoke(row) => {
                row
            }
        };
        let Some(path) = self.path_of(row) else {
            warn!(?action, "action for a row that is no longer inspected");
            return;
        };

        let result = match action {
            PanelAction::Toggle(_) => {
                let open = self
                    .node(&path)
                    .and_then(|node| node.expansion())
                    .is_some_and(|exp| !exp.is_expanded());
                self.toggle(&path, open).map(|_| ())
            }
            PanelAction::TurnPage(_, turn) => self.turn_page(&path, turn).map(|_| ()),
            PanelAction::Invoke(_) => self.invoke(&path),
        };
        if let Err(e) = result {
            warn!(path = %path, error = %e, "panel action failed");
        }
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Per-frame entry point.
    ///
    /// Refreshes the visible values of every root and updates the widgets.
    /// Does nothing while the menu is hidden.
    pub fn tick(&mut self) {
        if !self.menu_visible {
            return;
        }
        for root in &mut self.roots {
            root.value
                .poll(&self.provider, &mut self.surface, &self.config);
        }
        self.widgets.update_all(&mut self.surface);
    }

    pub fn set_menu_visible(&mut self, visible: bool) {
        if self.menu_visible == visible {
            return;
        }
        self.menu_visible = visible;
        for root in &self.roots {
            if let Some(row) = root.value.row() {
                self.surface.set_visible(row, visible);
            }
        }
        debug!(visible, "menu visibility changed");
    }

    pub fn toggle_menu(&mut self) {
        self.set_menu_visible(!self.menu_visible);
    }
}

fn no_such_node(path: &NodePath) -> WriteError {
    WriteError::NoSuchNode(path.to_string())
}

fn find<'a>(roots: &'a [RootView], path: &NodePath) -> Option<&'a InspectedValue> {
    let (first, rest) = path.keys().split_first()?;
    let mut node = &roots.iter().find(|r| r.value.key() == first)?.value;
    for key in rest {
        node = node.child(key)?.value();
    }
    Some(node)
}

fn find_mut<'a>(roots: &'a mut [RootView], path: &NodePath) -> Option<&'a mut InspectedValue> {
    let (first, rest) = path.keys().split_first()?;
    let mut node = &mut roots.iter_mut().find(|r| r.value.key() == first)?.value;
    for key in rest {
        node = node.child_mut(key)?.value_mut();
    }
    Some(node)
}

/// Depth-first search for the value showing `row`, extending `path` as it goes.
fn search(value: &InspectedValue, row: RowId, path: &mut NodePath) -> bool {
    if value.row() == Some(row) {
        return true;
    }
    let Some(exp) = value.expansion() else {
        return false;
    };
    if exp.pager_row() == Some(row) {
        return true;
    }
    for entry in exp.entries() {
        path.push(entry.key().clone());
        if search(entry.value(), row, path) {
            return true;
        }
        path.pop();
    }
    false
}
