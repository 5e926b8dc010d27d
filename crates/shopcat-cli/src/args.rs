use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "shopcat")]
#[command(about = "Keyword-based category classifier for storefront products")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.shopcat)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the category of a single product name
    Detect {
        /// Product name (e.g., "Corsair Vengeance 16GB DDR4 RAM")
        name: String,

        /// Product brand, used by record checks
        #[arg(short, long)]
        brand: Option<String>,

        /// Show every qualifying rule and its score
        #[arg(short, long)]
        explain: bool,
    },

    /// Print the slug of a category name
    Slug {
        /// Category name (e.g., "Graphics Cards")
        name: String,
    },

    /// Validate stored categories of a product export
    Validate {
        /// JSON array, {"items": [...]} envelope, or .jsonl file ("-" for stdin)
        input: PathBuf,

        /// Treat the input as JSON Lines regardless of extension
        #[arg(long)]
        jsonl: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Maximum mismatches to list
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List the effective rule set
    Rules {
        /// Only show rules for this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., classifier.duplicates)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., product.name_fields)
        key: String,

        /// Value to set (e.g., "name,title" or "[name, title]")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}
