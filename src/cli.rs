use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exile-trade")]
#[command(about = "Search the PoE2 trade site for a character's equipped items", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one modifier line to canonical stat ids
    Resolve {
        /// The modifier text, e.g. "+17% to Chaos Resistance"
        mod_text: String,
        /// Path to the matcher dataset JSON
        #[arg(short, long)]
        dataset: PathBuf,
        /// Modifier kind: enchant, implicit, fractured, explicit or crafted
        #[arg(short, long, default_value = "explicit")]
        kind: String,
        /// Try item-intrinsic (local) variants first
        #[arg(long)]
        equipment: bool,
    },
    /// Print the synthesized trade query for one item of a snapshot
    Query {
        #[arg(short, long)]
        dataset: PathBuf,
        /// Path to the equipment snapshot JSON
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Search mode: similar, exact or base
        #[arg(short, long, default_value = "similar")]
        mode: String,
        /// Index of the item within the snapshot (category order)
        #[arg(short, long, default_value_t = 0)]
        item: usize,
        /// Optional settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Search every equipped item sequentially under the endpoint rate limit
    Batch {
        #[arg(short, long)]
        dataset: PathBuf,
        #[arg(short, long)]
        snapshot: PathBuf,
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Override the league from settings
        #[arg(short, long)]
        league: Option<String>,
    },
}
