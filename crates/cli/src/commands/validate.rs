//! Validate command implementation.

use std::path::PathBuf;

use miette::{Result, miette};
use rapgen_core::PluginManifest;

use crate::output;

/// Validates plugin manifest files, reporting every failure.
pub fn execute(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;

    for path in files {
        match PluginManifest::from_file(path) {
            Ok(manifest) => output::success(&format!(
                "{}: {} v{} ({})",
                path.display(),
                manifest.id,
                manifest.version,
                manifest.category
            )),
            Err(e) => {
                output::error(&format!("{}: {}", path.display(), e));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(miette!(
            "Validation failed: {} of {} manifests invalid",
            failed,
            files.len()
        ));
    }
    Ok(())
}
