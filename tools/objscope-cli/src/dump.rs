//! Dump command - load a JSON heap and print the shown inspector tree
//!
//! Every top-level key of the document becomes an inspected root. Paths are
//! expanded in the order given; `--page` options apply right after their
//! path is expanded, so a nested path can be reached on a later page:
//!
//! ```bash
//! objscope dump heap.json --expand list --page list=2 --expand 'list[30]'
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use objscope_core::config::{self, InspectorConfig};
use objscope_core::{
    HeapProvider, Inspector, NodePath, PageLimit, RetainedSurface, TypeRef, export_as_json,
    export_as_text,
};
use tracing::{debug, info};

/// Arguments for the dump command
#[derive(Args)]
pub struct DumpArgs {
    /// JSON heap description
    pub heap: PathBuf,

    /// Open a node (e.g. `player.items[2]`), repeatable
    #[arg(long = "expand", value_name = "PATH")]
    pub expand: Vec<NodePath>,

    /// Show a page of an expanded node, 1-based (e.g. `player.items=3`)
    #[arg(long = "page", value_name = "PATH=N", value_parser = parse_page)]
    pub pages: Vec<(NodePath, usize)>,

    /// Rows per page (overrides the config file)
    #[arg(long)]
    pub page_limit: Option<usize>,

    /// Print JSON instead of an outline
    #[arg(long)]
    pub json: bool,
}

/// Execute the dump command
pub fn execute(args: DumpArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.heap)
        .with_context(|| format!("Failed to read {}", args.heap.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", args.heap.display()))?;

    let config = with_overrides(config::load(), args.page_limit)?;
    let (heap, roots) = HeapProvider::from_json(&doc);
    info!(roots = roots.len(), "heap loaded");

    let mut inspector = Inspector::new(heap, RetainedSurface::new(), config);
    for (name, value) in roots {
        inspector.inspect(&name, value, TypeRef::object());
    }

    for path in &args.expand {
        if !inspector.toggle(path, true)? {
            bail!("{} cannot be expanded", path);
        }
        for (_, page) in args.pages.iter().filter(|(p, _)| p == path) {
            let turned = inspector.jump_to_page(path, page.saturating_sub(1))?;
            debug!(path = %path, ?turned, "page selected");
        }
    }
    if let Some((path, _)) = args
        .pages
        .iter()
        .find(|(p, _)| !args.expand.contains(p))
    {
        bail!("--page {} needs a matching --expand", path);
    }

    inspector.tick();

    if args.json {
        let doc = export_as_json(inspector.surface());
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print!("{}", export_as_text(inspector.surface()));
    }

    Ok(())
}

/// `base` with the menu forced visible and CLI overrides applied.
fn with_overrides(
    mut config: InspectorConfig,
    page_limit: Option<usize>,
) -> Result<InspectorConfig> {
    config.hide_on_startup = false;
    if let Some(limit) = page_limit {
        config.page_limit = PageLimit::new(limit)?;
    }
    Ok(config)
}

fn parse_page(s: &str) -> Result<(NodePath, usize), String> {
    let (path, page) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PATH=N, got `{}`", s))?;
    let path = path.parse::<NodePath>().map_err(|e| e.to_string())?;
    let page = page
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid page number `{}`", page))?;
    Ok((path, page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        let (path, page) = parse_page("player.items=3").unwrap();
        assert_eq!(path.to_string(), "player.items");
        assert_eq!(page, 3);

        assert!(parse_page("player.items").is_err());
        assert!(parse_page("player.items=x").is_err());
        assert!(parse_page("=2").is_err());
    }

    #[test]
    fn test_overrides_apply_to_base_config() {
        let base = InspectorConfig {
            hide_on_startup: true,
            viewport_rows: 7,
            ..InspectorConfig::default()
        };

        let config = with_overrides(base.clone(), Some(10)).unwrap();
        assert_eq!(config.page_limit.get(), 10);
        assert!(!config.hide_on_startup);
        assert_eq!(config.viewport_rows, 7);

        let config = with_overrides(base.clone(), None).unwrap();
        assert_eq!(config.page_limit, base.page_limit);

        assert!(with_overrides(base, Some(0)).is_err());
    }
}
