//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::RenderStyle;

/// Dependency tree with leaf tracking: push requirements, see what can be satisfied next
#[derive(Parser, Debug)]
#[command(name = "deptree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Smaller values depend on greater ones
    #[arg(long, global = true)]
    pub descending: bool,

    /// Tree output style (overrides config)
    #[arg(long, value_enum, global = true)]
    pub style: Option<RenderStyle>,

    /// Config file (default: ./.deptree.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push values in order, pop the given leaves, print the tree
    Build {
        /// Values to push
        #[arg(required = true)]
        values: Vec<String>,
        /// Leaf values to pop afterwards (repeatable)
        #[arg(short, long = "pop")]
        pop: Vec<String>,
    },

    /// Push values in order and list the leaf values
    Leaves {
        /// Values to push
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Run a script of push/pop/show/leaves/reset lines
    Run {
        /// Script file
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
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
    /// Show effective settings
    Show,
    /// Print a commented template
    Template,
    /// Print the global config file location
    Path,
}
