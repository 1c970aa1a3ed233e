//! Clap derive structures for the `stockroom` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// stockroom -- manage a product catalog from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "stockroom",
    version,
    about = "Manage a product catalog from the command line",
    long_about = "Browse, create, update and delete catalog products, and keep a\n\
        per-user favorites list in sync with the catalog API.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "STOCKROOM_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Catalog API root (overrides profile)
    #[arg(long, env = "STOCKROOM_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STOCKROOM_OUTPUT",
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
    #[arg(long, short = 'k', env = "STOCKROOM_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "STOCKROOM_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Session and favorites store file (overrides profile)
    #[arg(long, env = "STOCKROOM_STORE", global = true)]
    pub store: Option<PathBuf>,
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
    /// Plain text, one value per line (scripting)
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
    /// Log in and store the session token
    Login(LoginArgs),

    /// Create an account and log in
    Register(RegisterArgs),

    /// Forget the stored session token
    Logout,

    /// Manage catalog products
    #[command(alias = "p")]
    Products(ProductsArgs),

    /// Manage favorite products
    #[command(alias = "fav", alias = "f")]
    Favorites(FavoritesArgs),

    /// Search products by name or SKU (at most 5 suggestions)
    Search(SearchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Authentication ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    pub email: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Account email
    pub email: String,
}

// ── Products ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List products
    #[command(alias = "ls")]
    List {
        /// Show only favorite products
        #[arg(long, short = 'f')]
        favorites: bool,
    },

    /// Show one product
    Get {
        /// Product id
        id: String,
    },

    /// Create a product
    Create(CreateArgs),

    /// Update a product; unset fields keep their current value
    Update(UpdateArgs),

    /// Delete a product
    #[command(alias = "rm")]
    Delete {
        /// Product id
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Stock keeping unit
    #[arg(long)]
    pub sku: String,

    /// Product name
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Unit price (e.g. 12.50)
    #[arg(long, default_value = "0")]
    pub price: String,

    /// Units in stock
    #[arg(long, default_value = "0")]
    pub quantity: String,

    /// Image file to upload (repeatable)
    #[arg(long = "image", short = 'i')]
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Product id
    pub id: String,

    #[arg(long)]
    pub sku: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub price: Option<String>,

    #[arg(long)]
    pub quantity: Option<String>,

    /// Image file to upload (repeatable)
    #[arg(long = "image", short = 'i')]
    pub images: Vec<PathBuf>,

    /// Thumbnail: an existing image reference or the file name of a new image
    #[arg(long)]
    pub thumbnail: Option<String>,
}

// ── Favorites ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: FavoritesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List favorites from the local cache
    #[command(alias = "ls")]
    List {
        /// Adopt the server's list before printing
        #[arg(long)]
        sync: bool,
    },

    /// Add or remove a product from favorites
    Toggle {
        /// Product id
        id: String,
    },

    /// Replace the local cache with the server's favorites list
    Sync,
}

// ── Search ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive substring of a product name or SKU
    pub term: String,
}

// ── Config ───────────────────────────────────────────────────────────

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

    /// Set a value on the active profile
    Set {
        /// Config key (api_url, timeout, insecure, ca_cert, store_path, favorites_policy)
        key: String,

        /// Value to set
        value: String,
    },

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
