//! RapGen CLI - Command-line front end for the RapGen plugin engine.

mod commands;
mod config;
mod discovery;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use miette::Result;
use rapgen_core::PluginCategory;
use tracing_subscriber::EnvFilter;

use crate::config::LoadedConfig;

#[derive(Parser)]
#[command(name = "rapgen")]
#[command(author, version, about = "Beats, flows and effects for the RapGen lyric studio")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to rapgen.toml (auto-detected if not specified)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed or available plugins
    List {
        /// Only show one category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        /// Show the whole catalog instead of installed plugins
        #[arg(short, long)]
        available: bool,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Render a beat through an effect chain to a WAV file
    Render {
        /// Beat plugin id
        #[arg(short, long)]
        beat: String,

        /// Tempo (defaults to audio.default_bpm)
        #[arg(long)]
        bpm: Option<f64>,

        /// Effect plugin id, applied in the order given
        #[arg(short, long = "effect")]
        effects: Vec<String>,

        /// Number of bars to render
        #[arg(short, long, default_value = "4")]
        loops: usize,

        /// Output WAV file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Show the audio graph for a beat and effect chain
    Graph {
        /// Beat plugin id
        #[arg(short, long)]
        beat: String,

        /// Effect plugin id, applied in the order given
        #[arg(short, long = "effect")]
        effects: Vec<String>,

        /// Output format (ascii, dot)
        #[arg(short, long, default_value = "ascii")]
        format: String,
    },

    /// Run lyrics through flow plugins
    Transform {
        /// Flow plugin id, applied in the order given
        #[arg(long = "flow")]
        flows: Vec<String>,

        /// Lyrics file (reads TEXT or stdin otherwise)
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Lyrics text
        text: Option<String>,
    },

    /// Install plugins from the catalog
    Install {
        /// Catalog ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Add the ids to rapgen.toml so future sessions install them
        #[arg(long)]
        save: bool,
    },

    /// Validate plugin manifest files
    Validate {
        /// Manifest JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Initialize a new rapgen.toml
    Init {
        /// Force overwrite existing rapgen.toml
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Beat,
    Flow,
    Effect,
    Visual,
}

impl From<CategoryArg> for PluginCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Beat => PluginCategory::Beat,
            CategoryArg::Flow => PluginCategory::Flow,
            CategoryArg::Effect => PluginCategory::Effect,
            CategoryArg::Visual => PluginCategory::Visual,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Init must work even when an existing config is broken.
    if let Commands::Init { force } = cli.command {
        init_logging("warn", cli.verbose);
        return commands::init::execute(force);
    }

    let loaded = LoadedConfig::resolve(cli.config.as_deref())?;
    init_logging(&loaded.config.log.filter, cli.verbose);

    match cli.command {
        Commands::List {
            category,
            available,
            detailed,
        } => commands::list::execute(&loaded, category.map(Into::into), available, detailed),

        Commands::Render {
            beat,
            bpm,
            effects,
            loops,
            out,
        } => {
            let bpm = bpm.unwrap_or(loaded.config.audio.default_bpm);
            commands::render::execute(&loaded, &beat, bpm, &effects, loops, &out)
        }

        Commands::Graph {
            beat,
            effects,
            format,
        } => commands::graph::execute(&loaded, &beat, &effects, &format),

        Commands::Transform { flows, file, text } => {
            commands::transform::execute(&loaded, &flows, file.as_deref(), text.as_deref())
        }

        Commands::Install { ids, save } => commands::install::execute(&loaded, &ids, save),

        Commands::Validate { files } => commands::validate::execute(&files),

        Commands::Init { .. } => unreachable!("Init is handled earlier"),
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the config.
fn init_logging(config_filter: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
