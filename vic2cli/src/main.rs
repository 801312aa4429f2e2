use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vic2data::MapMode;

mod ops;

#[derive(Parser)]
#[command(name = "vic2")]
#[command(version, about = "Load, lint and inspect Victoria 2 data files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a whole install and print what was found
    Load {
        /// Game or mod root (default: detected Steam install)
        #[arg(value_name = "ROOT")]
        root: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Skip the units folder
        #[arg(long)]
        no_units: bool,
    },

    /// Check brace balance and token placement of a file or folder
    Check {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Parse a file and print its tree
    Dump {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the tree as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Load the trade goods and write them back out
    Goods {
        #[arg(value_name = "ROOT")]
        root: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a map mode of the province map to an image
    Render {
        #[arg(value_name = "ROOT")]
        root: Option<PathBuf>,

        /// One of: owner, rgo, state
        #[arg(short, long, default_value = "owner", value_parser = parse_mode)]
        mode: MapMode,

        /// Output image; the format follows the extension
        #[arg(short, long, default_value = "map.png")]
        output: PathBuf,
    },
}

fn parse_mode(text: &str) -> Result<MapMode, String> {
    MapMode::from_keyword(text).ok_or_else(|| {
        let known: Vec<String> = MapMode::ALL.iter().map(ToString::to_string).collect();
        format!("unknown map mode '{}', expected one of: {}", text, known.join(", "))
    })
}

/// The given root, or the detected install when none was given.
fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = root {
        return Ok(root);
    }
    match vic2data::path::detect_game_path() {
        Some(path) => {
            log::info!("Auto-detected Victoria 2 path: {}", path.display());
            Ok(path)
        }
        None => bail!("Could not detect a Victoria 2 installation. Please pass ROOT."),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            root,
            json,
            no_units,
        } => ops::load(&resolve_root(root)?, json, !no_units),
        Commands::Check { path } => ops::check(&path),
        Commands::Dump { file, json } => ops::dump(&file, json),
        Commands::Goods { root, output } => ops::goods(&resolve_root(root)?, output.as_deref()),
        Commands::Render { root, mode, output } => ops::render(&resolve_root(root)?, mode, &output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("rgo"), Ok(MapMode::Rgo));
        let err = parse_mode("terrain").unwrap_err();
        assert!(err.contains("owner, rgo, state"));
    }

    #[test]
    fn test_render_defaults() {
        let cli = Cli::try_parse_from(["vic2", "render", "/games/v2"]).unwrap();
        match cli.command {
            Commands::Render { root, mode, output } => {
                assert_eq!(root, Some(PathBuf::from("/games/v2")));
                assert_eq!(mode, MapMode::Owner);
                assert_eq!(output, PathBuf::from("map.png"));
            }
            _ => panic!("Expected render"),
        }
    }
}
