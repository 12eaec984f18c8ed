//! Pages command - print how a list of a given length splits into pages

use anyhow::Result;
use clap::Args;
use objscope_core::{PageHandler, PageLimit, config};

/// Arguments for the pages command
#[derive(Args)]
pub struct PagesArgs {
    /// Number of elements in the list
    #[arg(long)]
    pub count: usize,

    /// Rows per page (defaults to the configured limit)
    #[arg(long)]
    pub page_limit: Option<usize>,
}

/// Execute the pages command
pub fn execute(args: PagesArgs) -> Result<()> {
    let limit = match args.page_limit {
        Some(limit) => PageLimit::new(limit)?,
        None => config::load().page_limit,
    };
    for line in layout(args.count, limit) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per page: label followed by the index range it shows.
fn layout(count: usize, limit: PageLimit) -> Vec<String> {
    let mut pages = PageHandler::new(limit);
    pages.set_list_count(count);

    (0..pages.page_count())
        .map(|page| {
            pages.jump_to(page);
            let mut indices = pages.indices();
            match (indices.next(), indices.last()) {
                (Some(first), Some(last)) => format!("{}: [{}..={}]", pages.label(), first, last),
                (Some(first), None) => format!("{}: [{}]", pages.label(), first),
                _ => format!("{}: empty", pages.label()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_25_by_10() {
        let limit = PageLimit::new(10).unwrap();
        assert_eq!(
            layout(25, limit),
            [
                "Page 1 / 3: [0..=9]",
                "Page 2 / 3: [10..=19]",
                "Page 3 / 3: [20..=24]",
            ]
        );
    }

    #[test]
    fn test_layout_edges() {
        let limit = PageLimit::new(10).unwrap();
        assert_eq!(layout(0, limit), ["Page 1 / 1: empty"]);
        assert_eq!(layout(11, limit)[1], "Page 2 / 2: [10]");
    }
}
