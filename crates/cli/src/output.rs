//! Terminal output formatting.

use console::style;
use rapgen_core::PluginManifest;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), message);
}

/// Prints a header for a section.
pub fn section_header(title: &str) {
    println!("\n{}", style(format!("── {} ──", title)).bold());
}

/// Prints a manifest as one line, or as a short block when `detailed`.
pub fn manifest(manifest: &PluginManifest, detailed: bool, installed: Option<bool>) {
    let marker = match installed {
        Some(true) => format!(" {}", style("(installed)").green()),
        _ => String::new(),
    };

    if detailed {
        println!(
            "  {} {}{}",
            style(&manifest.id).cyan().bold(),
            style(format!("v{}", manifest.version)).dim(),
            marker
        );
        println!("    {}", manifest.name);
        if !manifest.author.is_empty() {
            println!("    Author: {}", style(&manifest.author).dim());
        }
        if !manifest.description.is_empty() {
            println!("    {}", style(&manifest.description).dim());
        }
        println!();
    } else if manifest.description.is_empty() {
        println!("  {}{}", manifest.id, marker);
    } else {
        println!(
            "  {}{} - {}",
            manifest.id,
            marker,
            style(&manifest.description).dim()
        );
    }
}
