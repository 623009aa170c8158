pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paneltree")]
#[command(about = "paneltree - inspect and reorder admin menu and folder trees from fixture files")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Render a tree annotated for a location")]
    Render {
        #[arg(help = "Flat records file (.json, .yaml, .yml)")]
        input: PathBuf,
        #[arg(long, help = "Current location, e.g. /files/42")]
        location: Option<String>,
        #[arg(long, help = "Directory holding persisted expansion state")]
        state_dir: Option<PathBuf>,
        #[arg(long = "grant", help = "Granted permission name (repeatable)")]
        grants: Vec<String>,
        #[arg(long, help = "Skip the permission pre-pass")]
        all: bool,
    },

    #[command(about = "Move a node and print the order patch")]
    Reorder {
        #[arg(help = "Flat records file")]
        input: PathBuf,
        #[arg(help = "Node to move")]
        node: i64,
        #[arg(help = "0-based target position")]
        index: usize,
        #[arg(long, conflicts_with = "root", help = "New parent id")]
        parent: Option<i64>,
        #[arg(long, help = "Move to the root level")]
        root: bool,
        #[arg(long, help = "Write the updated records back to the input file")]
        write: bool,
    },

    #[command(about = "Renumber every sibling list and print the patch")]
    Normalize {
        #[arg(help = "Flat records file")]
        input: PathBuf,
        #[arg(long, help = "Write the updated records back to the input file")]
        write: bool,
    },

    #[command(about = "List valid parents for a node")]
    Parents {
        #[arg(help = "Flat records file")]
        input: PathBuf,
        #[arg(long, help = "Node being edited (omit for a new node)")]
        node: Option<i64>,
    },

    #[command(about = "Toggle a group's persisted expanded flag")]
    Toggle {
        #[arg(help = "Group node id")]
        id: i64,
        #[arg(long, help = "Directory holding persisted expansion state")]
        state_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Render { input, location, state_dir, grants, all } => {
            commands::render::handle(&input, location.as_deref(), state_dir.as_deref(), grants, all, output_format)
        }
        Commands::Reorder { input, node, index, parent, root, write } => {
            commands::reorder::handle_move(&input, node, index, parent, root, write, output_format)
        }
        Commands::Normalize { input, write } => commands::reorder::handle_normalize(&input, write, output_format),
        Commands::Parents { input, node } => commands::reorder::handle_parents(&input, node, output_format),
        Commands::Toggle { id, state_dir } => commands::render::handle_toggle(id, &state_dir, output_format),
    }
}
