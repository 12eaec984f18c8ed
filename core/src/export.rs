//! Export of the shown inspector tree
//!
//! Renders the visible rows of a [`RetainedSurface`] as indented text (for
//! terminals and logs) or as JSON (for tooling).

use serde_json::{Value as Json, json};

use crate::display::{RetainedSurface, RowId, RowKind};

/// Export every shown row as an indented outline.
///
/// Output format:
/// ```text
/// - player: Player
///   - hp: 10
///   + items: [3] List<int>
/// ```
/// `-` marks open or leaf rows, `+` marks closed expandable rows. Scroll
/// handles are omitted.
pub fn export_as_text(surface: &RetainedSurface) -> String {
    let mut output = String::new();
    surface.visit_shown(|depth, row, node| {
        if node.kind == RowKind::Scrollbar {
            return;
        }
        let indent = "  ".repeat(depth);
        let line = match node.kind {
            RowKind::Pager => format!("{}({})", indent, node.text),
            RowKind::Expandable if !surface.is_open(row) => format!("{}+ {}", indent, node.text),
            _ => format!("{}- {}", indent, node.text),
        };
        output.push_str(&line);
        output.push('\n');
    });
    output
}

/// Export every shown row as nested JSON objects.
pub fn export_as_json(surface: &RetainedSurface) -> Json {
    let roots: Vec<Json> = surface
        .roots()
        .iter()
        .filter_map(|&row| row_to_json(surface, row))
        .collect();
    Json::Array(roots)
}

fn row_to_json(surface: &RetainedSurface, row: RowId) -> Option<Json> {
    let node = surface.row(row)?;
    if !node.visible || node.kind == RowKind::Scrollbar {
        return None;
    }
    let children: Vec<Json> = node
        .children
        .iter()
        .filter_map(|&child| row_to_json(surface, child))
        .collect();
    let kind = match node.kind {
        RowKind::Value => "value",
        RowKind::Expandable => "expandable",
        RowKind::Pager => "pager",
        RowKind::Scrollbar => "scrollbar",
    };
    Some(json!({
        "kind": kind,
        "text": node.text,
        "children": children,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LiveValue;
    use crate::test_utils::{Harness, ints};

    #[test]
    fn test_export_text_outline() {
        let mut h = Harness::new(2);
        let items = h.heap.alloc_list("List<int>", "int", ints(0..3));
        let player = h
            .heap
            .alloc_struct("Player", vec![("hp", LiveValue::Int(10)), ("items", items)]);
        let mut player = h.root("player", player);
        h.toggle(&mut player, true);

        let text = export_as_text(&h.surface);
        assert_eq!(
            text,
            "- player: Player\n  - hp: 10\n  + items: [3] List<int>\n"
        );
    }

    #[test]
    fn test_export_shows_pager_and_current_page() {
        let mut h = Harness::new(2);
        let list = h.heap.alloc_list("List<int>", "int", ints(0..3));
        let mut list = h.root("list", list);
        h.toggle(&mut list, true);

        let text = export_as_text(&h.surface);
        assert_eq!(
            text,
            "- list: [3] List<int>\n  (Page 1 / 2)\n  - [0]: 0\n  - [1]: 1\n"
        );
    }

    #[test]
    fn test_export_json() {
        let mut h = Harness::new(10);
        let list = h.heap.alloc_list("List<int>", "int", ints(0..1));
        let mut list = h.root("list", list);
        h.toggle(&mut list, true);

        let doc = export_as_json(&h.surface);
        assert_eq!(doc[0]["text"], "list: [1] List<int>");
        assert_eq!(doc[0]["kind"], "expandable");
        // Single-page pager is hidden
        assert_eq!(doc[0]["children"].as_array().unwrap().len(), 1);
        assert_eq!(doc[0]["children"][0]["text"], "[0]: 0");
    }
}
