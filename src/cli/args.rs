//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

/// Export a medical-imaging scene graph to a standalone XTK/WebGL page
#[derive(Parser, Debug)]
#[command(name = "webgl-export")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory with a local .webgl-export.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the scene as an HTML page
    Export {
        /// Scene description (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        scene: PathBuf,
        /// Output document (default from config: scene.html)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// 3D viewport supplying camera and background
        #[arg(long)]
        viewport: Option<usize>,
        /// Fail on nodes that are their own parent instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Show the imported hierarchy
    Tree {
        /// Scene description (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        scene: PathBuf,
        /// Flat listing in the given visiting order instead of a tree
        #[arg(long, value_enum)]
        order: Option<Order>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show,
    /// Print config file locations
    Path,
}

/// Visiting order for flat tree listings.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Depth,
    Breadth,
}
