//! CLI argument definitions.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Person CLI - Manage person records in a document store
#[derive(Parser, Debug)]
#[command(name = "person-cli")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use a throwaway in-memory store instead of MongoDB
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert a new person
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        age: i32,
    },

    /// Show a person by id
    Get { id: Uuid },

    /// Change the age of an existing person
    UpdateAge { id: Uuid, age: i32 },

    /// List every adult person
    Adults,

    /// List persons page by page
    List {
        #[arg(long)]
        skip: Option<u64>,
        #[arg(long)]
        limit: Option<i64>,
        /// Order by age, oldest first
        #[arg(long)]
        sort_by_age: bool,
    },
}
