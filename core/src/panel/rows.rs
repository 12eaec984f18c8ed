//! Widget rendering for single rows

use crate::display::{RetainedSurface, RowId, RowKind, RowNode};
use crate::inspector::PanelAction;
use crate::page::Turn;

/// Handles rendering of one row and its affordances
pub(super) struct RowRenderer;

impl RowRenderer {
    /// Render a row's widgets into a horizontal layout.
    ///
    /// Returns Some(action) if one of the row's buttons was clicked.
    pub fn render_row(
        &self,
        ui: &mut egui::Ui,
        surface: &RetainedSurface,
        row: RowId,
        node: &RowNode,
        invocable: bool,
    ) -> Option<PanelAction> {
        match node.kind {
            RowKind::Expandable => {
                let arrow = if surface.is_open(row) { "⏷" } else { "⏵" };
                let clicked = ui.small_button(arrow).clicked();
                self.render_text(ui, &node.text);
                clicked.then_some(PanelAction::Toggle(row))
            }
            RowKind::Pager => {
                let mut action = None;
                if ui.small_button("◀").clicked() {
                    action = Some(PanelAction::TurnPage(row, Turn::Left));
                }
                ui.label(&node.text);
                if ui.small_button("▶").clicked() {
                    action = Some(PanelAction::TurnPage(row, Turn::Right));
                }
                action
            }
            RowKind::Scrollbar => {
                ui.weak(&node.text);
                None
            }
            RowKind::Value => {
                self.render_text(ui, &node.text);
                (invocable && ui.small_button("Call").clicked()).then_some(PanelAction::Invoke(row))
            }
        }
    }

    /// Value text, highlighted when it carries an inline error
    fn render_text(&self, ui: &mut egui::Ui, text: &str) {
        if text.contains("<error") || text.contains("<destroyed>") {
            let color = ui.visuals().error_fg_color;
            ui.label(egui::RichText::new(text).color(color));
        } else {
            ui.label(text);
        }
    }
}
