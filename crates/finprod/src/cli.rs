//! Clap derive structures for the `finprod` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// finprod -- manage a financial products catalog
#[derive(Debug, Parser)]
#[command(
    name = "finprod",
    version,
    about = "Manage financial products from the command line",
    long_about = "Administer the financial products catalog exposed by a products REST API.\n\n\
        List, search, create, update, and delete products with the same validation\n\
        rules the terminal UI applies.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "FINPROD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Products API base URL (overrides profile)
    #[arg(long, short = 'u', env = "FINPROD_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "FINPROD_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, env = "FINPROD_COLOR", global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', env = "FINPROD_QUIET", global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', env = "FINPROD_YES", global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "FINPROD_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "FINPROD_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    pub fn output(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
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
    /// List, create, update, and delete products
    #[command(alias = "p")]
    Products(ProductsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PRODUCTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List products, optionally filtered and paginated
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one product
    Get {
        /// Product ID
        id: String,
    },

    /// Create a product
    #[command(alias = "add")]
    Create(CreateArgs),

    /// Update a product; unspecified fields keep their current values
    #[command(alias = "edit")]
    Update(UpdateArgs),

    /// Delete a product
    #[command(alias = "rm")]
    Delete {
        /// Product ID
        id: String,
    },

    /// Check whether a product ID is already taken
    Verify {
        /// Product ID
        id: String,
    },
}

/// Client-side search and pagination over the fetched list.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive match on ID, name, or description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page to show (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Products per page: 5, 10, or 20
    #[arg(long, short = 'l', value_parser = parse_page_size)]
    pub page_size: Option<usize>,

    /// Show every matching product on one page
    #[arg(long, short = 'a', conflicts_with_all = ["page", "page_size"])]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Product ID (3-10 characters)
    #[arg(long)]
    pub id: String,

    /// Product name (5-100 characters)
    #[arg(long)]
    pub name: String,

    /// Description (10-200 characters)
    #[arg(long)]
    pub description: String,

    /// Logo URL
    #[arg(long)]
    pub logo: String,

    /// Release date, YYYY-MM-DD, today or later
    #[arg(long)]
    pub release: String,

    /// Revision date, YYYY-MM-DD; derived from the release date when omitted
    #[arg(long)]
    pub revision: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Product ID
    pub id: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New logo URL
    #[arg(long)]
    pub logo: Option<String>,

    /// New release date, YYYY-MM-DD; the revision date follows it
    #[arg(long)]
    pub release: Option<String>,
}

fn parse_page_size(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n @ (5 | 10 | 20)) => Ok(n),
        _ => Err(format!("expected 5, 10, or 20, got '{raw}'")),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile
    Set {
        /// Key: base_url, timeout, insecure, ca_cert, page_size
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    #[command(alias = "use")]
    SetDefault {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
