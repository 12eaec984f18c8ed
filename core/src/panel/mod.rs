//! Inspector panel UI
//!
//! Draws the retained row tree in an egui window and reports clicks as
//! [`PanelAction`]s. The panel never touches the inspector directly; the host
//! feeds the returned actions to [`Inspector::apply`].

use hashbrown::HashSet;

use crate::cache::{EntryKind, InspectedValue};
use crate::display::{RetainedSurface, RowId};
use crate::export::export_as_text;
use crate::inspector::{Inspector, PanelAction};
use crate::provider::LiveObjectProvider;

mod rows;

use rows::RowRenderer;

/// Inspector panel state
pub struct InspectorPanel {
    /// Whether the panel is visible
    pub visible: bool,
    /// Horizontal indent per tree level, in points
    indent: f32,
    row_renderer: RowRenderer,
}

impl Default for InspectorPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectorPanel {
    pub fn new() -> Self {
        Self {
            visible: true,
            indent: 14.0,
            row_renderer: RowRenderer,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Render the panel for an inspector drawing onto a retained surface.
    ///
    /// Returns the actions clicked this frame, in click order.
    pub fn render<P: LiveObjectProvider>(
        &mut self,
        ctx: &egui::Context,
        inspector: &Inspector<P, RetainedSurface>,
    ) -> Vec<PanelAction> {
        if !self.visible {
            return Vec::new();
        }

        let surface = inspector.surface();
        let invocable = invocable_rows(inspector.roots());
        let mut actions = Vec::new();

        egui::Window::new("Object Inspector")
            .id(egui::Id::new("object_inspector_window"))
            .default_pos([10.0, 10.0])
            .default_size([360.0, 480.0])
            .resizable(true)
            .collapsible(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        surface.visit_shown(|depth, row, node| {
                            ui.horizontal(|ui| {
                                ui.add_space(depth as f32 * self.indent);
                                let action = self.row_renderer.render_row(
                                    ui,
                                    surface,
                                    row,
                                    node,
                                    invocable.contains(&row),
                                );
                                actions.extend(action);
                            });
                        });
                    });

                ui.separator();

                ui.horizontal(|ui| {
                    if ui.button("📋 Copy as text").clicked() {
                        ui.ctx().copy_text(export_as_text(surface));
                    }
                });
            });

        actions
    }
}

/// Rows of method entries whose parent is currently expanded.
fn invocable_rows<'a>(roots: impl Iterator<Item = &'a InspectedValue>) -> HashSet<RowId> {
    let mut rows = HashSet::new();
    let mut pending: Vec<&InspectedValue> = roots.collect();
    while let Some(value) = pending.pop() {
        let Some(exp) = value.expansion() else {
            continue;
        };
        for entry in exp.entries() {
            if entry.kind() == EntryKind::Method
                && let Some(row) = entry.value().row()
            {
                rows.insert(row);
            }
            pending.push(entry.value());
        }
    }
    rows
}
