//! Transform command implementation.

use std::io::Read;
use std::path::Path;

use miette::{Result, miette};

use crate::commands::open_session;
use crate::config::LoadedConfig;

/// Runs lyrics from a file, the argument or stdin through `flows`.
pub fn execute(
    loaded: &LoadedConfig,
    flows: &[String],
    file: Option<&Path>,
    text: Option<&str>,
) -> Result<()> {
    let lyrics = read_lyrics(file, text)?;
    let session = open_session(loaded)?;

    let output = session
        .transform_lyrics(&lyrics, flows)
        .map_err(|e| miette!("Failed to transform lyrics: {}", e))?;

    if output.ends_with('\n') {
        print!("{}", output);
    } else {
        println!("{}", output);
    }
    Ok(())
}

fn read_lyrics(file: Option<&Path>, text: Option<&str>) -> Result<String> {
    match (file, text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .map_err(|e| miette!("Failed to read {}: {}", path.display(), e)),
        (None, Some(text)) => Ok(text.to_string()),
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| miette!("Failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}
