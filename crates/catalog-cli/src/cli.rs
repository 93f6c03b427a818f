//! Clap derive structures for the `catalog` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// catalog -- browse and edit a product catalog from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "catalog",
    version,
    about = "Manage catalog products from the command line",
    long_about = "List, search, create, update and delete products held by a \
        remote product service.\n\n\
        Reads are served from one fetch of the collection; writes go to the \
        service and are reflected locally once it confirms them.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Service profile to use
    #[arg(long, short = 'p', env = "CATALOG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Product collection URL (overrides profile)
    #[arg(long, env = "CATALOG_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CATALOG_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CATALOG_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CATALOG_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List products, optionally filtered and paged
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one product
    Get {
        /// Product identifier
        id: String,
    },

    /// Create a product
    #[command(alias = "add")]
    Create(CreateArgs),

    /// Update an existing product
    #[command(alias = "edit")]
    Update(UpdateArgs),

    /// Delete a product
    #[command(alias = "rm")]
    Delete {
        /// Product identifier
        id: String,
    },

    /// Check whether an identifier is already taken
    Verify {
        /// Product identifier
        id: String,
    },

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Products ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive search over name, description and id
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page to show (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Products per page
    #[arg(long, default_value = "5")]
    pub per_page: usize,

    /// Show every matching product on one page
    #[arg(long, short = 'a', conflicts_with_all = ["page", "per_page"])]
    pub all: bool,
}

/// Field values shared by create and update.
#[derive(Debug, Args)]
pub struct ProductFields {
    /// Display name (5-100 characters)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Description (10-200 characters)
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Logo URL
    #[arg(long, short = 'l')]
    pub logo: Option<String>,

    /// Release date (YYYY-MM-DD, today or later). The revision date is set
    /// one year later.
    #[arg(long, short = 'r')]
    pub release: Option<String>,

    /// Read field values from a JSON file (flags override file values)
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Product identifier (3-10 characters, must be unused)
    #[arg(long, short = 'i')]
    pub id: Option<String>,

    #[command(flatten)]
    pub fields: ProductFields,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Identifier of the product to update
    pub id: String,

    #[command(flatten)]
    pub fields: ProductFields,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
