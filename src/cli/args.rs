//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::NodeId;

/// Hierarchical cost-structure engine: budget forests, composition breakdowns and tree navigation
#[derive(Parser, Debug)]
#[command(name = "costtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Snapshot directory (default: configured data_dir, else cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Paint the cost forest (budget roots start expanded)
    Tree {
        /// Toggle a node open/closed; budget roots are written `budget:<ID>`
        #[arg(short, long = "expand", value_name = "ID")]
        expand: Vec<NodeId>,

        /// Expand every node
        #[arg(short, long, conflicts_with = "expand")]
        all: bool,

        /// Only paint this budget
        #[arg(short, long, value_name = "BUDGET_ID")]
        budget: Option<String>,

        /// Select a node: reveal it and list its compositions below the tree
        #[arg(short, long, value_name = "ID")]
        select: Option<NodeId>,
    },

    /// Show a cost node and its composition lines
    Show {
        /// Cost record id
        cost_id: String,

        /// Order lines by unit category instead of subtotal order
        #[arg(long, conflicts_with = "grouped")]
        by_category: bool,

        /// Print one block per subtotal group
        #[arg(long)]
        grouped: bool,
    },

    /// Print summary numbers of the snapshot
    Stats,

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
    /// Print the effective configuration
    Show,
    /// Print a commented configuration template
    Template,
    /// Print config file locations
    Path,
}
