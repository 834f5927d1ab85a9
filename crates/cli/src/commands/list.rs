//! List command implementation.

use console::style;
use miette::Result;
use rapgen_core::PluginCategory;

use crate::commands::open_session;
use crate::config::LoadedConfig;
use crate::output;

/// Lists installed plugins, or the catalog with `available`.
pub fn execute(
    loaded: &LoadedConfig,
    category: Option<PluginCategory>,
    available: bool,
    detailed: bool,
) -> Result<()> {
    let mut session = open_session(loaded)?;
    let market = session.marketplace();

    if available {
        println!("{}", style("Available plugins:").bold());
        let listings = market.available(category);
        for cat in PluginCategory::ALL {
            let group: Vec<_> = listings.iter().filter(|l| l.manifest.category == cat).collect();
            if group.is_empty() {
                continue;
            }
            output::section_header(cat.as_str());
            for listing in group {
                output::manifest(listing.manifest, detailed, Some(listing.installed));
            }
        }
        return Ok(());
    }

    println!("{}", style("Installed plugins:").bold());
    let groups = market.grouped();
    let mut shown = 0;
    for group in groups
        .iter()
        .filter(|g| category.is_none_or(|c| g.category == c))
    {
        output::section_header(group.category.as_str());
        for manifest in &group.plugins {
            output::manifest(manifest, detailed, None);
        }
        shown += group.plugins.len();
    }

    if shown == 0 {
        output::info("No plugins installed. Run 'rapgen list --available' to browse the catalog");
    }

    Ok(())
}
