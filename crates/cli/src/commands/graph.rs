//! Graph command implementation.

use console::style;
use miette::{Result, miette};
use rapgen_engine::{AudioGraphSpec, GraphHandle};

use crate::commands::open_session;
use crate::config::LoadedConfig;

/// Builds the graph for a beat and effect chain and prints it.
pub fn execute(loaded: &LoadedConfig, beat: &str, effects: &[String], format: &str) -> Result<()> {
    if !matches!(format, "ascii" | "dot") {
        return Err(miette!("Unknown format: {}. Use 'ascii' or 'dot'", format));
    }

    let session = open_session(loaded)?;
    let spec = AudioGraphSpec::new(beat, loaded.config.audio.default_bpm)
        .with_effects(effects.iter().cloned());
    let handle = session
        .build_audio_graph(&spec)
        .map_err(|e| miette!("Failed to build audio graph: {}", e))?;

    match format {
        "dot" => print!("{}", handle.to_dot()),
        _ => println!("{}", render_ascii(&handle)),
    }

    Ok(())
}

/// One line per node along the signal path, grouped under its plugin.
fn render_ascii(handle: &GraphHandle) -> String {
    let graph = handle.graph();
    let mut lines = vec![style("Signal chain:").bold().to_string()];
    let mut current: Option<&str> = None;

    for id in graph.longest_path() {
        let Some(node) = graph.node(id) else {
            continue;
        };

        match node.owner() {
            Some(owner) if current != Some(owner) => {
                lines.push(format!("● {}", style(owner).cyan().bold()));
                lines.push(format!("  ├─ {}", node));
                current = Some(owner);
            }
            Some(_) => lines.push(format!("  ├─ {}", node)),
            None => {
                lines.push(format!("└─ {}", node));
                current = None;
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_groups_nodes_by_plugin() {
        let session = open_session(&LoadedConfig::default()).unwrap();
        let spec = AudioGraphSpec::new("boom-bap", 90.0).with_effects(["gain"]);
        let handle = session.build_audio_graph(&spec).unwrap();

        let text = console::strip_ansi_codes(&render_ascii(&handle)).to_string();
        let headers: Vec<_> = text.lines().filter(|l| l.starts_with('●')).collect();
        assert_eq!(headers, vec!["● boom-bap", "● gain"]);
        assert!(text.ends_with("└─ destination"));
    }

    #[test]
    fn test_unknown_format() {
        assert!(execute(&LoadedConfig::default(), "boom-bap", &[], "svg").is_err());
    }
}
