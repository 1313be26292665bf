//! Clap derive structures for the `hemma` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hemma -- command-line client for the IKEA DIRIGERA hub
#[derive(Debug, Parser)]
#[command(
    name = "hemma",
    version,
    about = "Manage an IKEA DIRIGERA smart-home hub from the command line",
    long_about = "A CLI for the IKEA DIRIGERA smart-home hub.\n\n\
        Pairs with a hub via its button-press authorization ceremony,\n\
        pins the hub's TLS certificate on first use, and then lists\n\
        devices, rooms, scenes and users or streams live events.",
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
    /// Context (hub) to use
    #[arg(long, short = 'c', env = "HEMMA_CONTEXT", global = true)]
    pub context: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HEMMA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorize a new user on a hub (press its action button)
    #[command(alias = "auth", alias = "a")]
    Authorize(AuthorizeArgs),

    /// List hubs, contexts, or hub resources
    #[command(alias = "l")]
    List(ListArgs),

    /// Show details for a single element
    #[command(alias = "s")]
    Show(ShowArgs),

    /// Delete a user from the hub or a context from the config
    Delete(DeleteArgs),

    /// Set the current context
    Use {
        /// Context name to make current
        name: String,
    },

    /// Stream live events from the hub until interrupted
    Listen(ListenArgs),

    /// Raw authenticated GET against the hub's /v1 API
    Curl {
        /// API path relative to /v1, e.g. "devices" or "hub/status"
        path: String,
    },

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTHORIZE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthorizeArgs {
    /// Hub IP address or host name
    pub address: String,

    /// Port used to connect to the hub
    #[arg(long, short = 'p', default_value_t = 8443)]
    pub port: u16,

    /// Don't create a context, just print the credential
    ///
    /// The global --context flag names the context to create; without
    /// it the hub's custom name is used.
    #[arg(long, short = 'n')]
    pub no_context: bool,

    /// Client name registered on the hub (default: user@host)
    #[arg(long)]
    pub name: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIST
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(subcommand)]
    pub command: ListCommand,
}

#[derive(Debug, Subcommand)]
pub enum ListCommand {
    /// Scan the local network for hubs via mDNS
    #[command(alias = "hub", alias = "h")]
    Hubs {
        /// Scan window in seconds
        #[arg(long, default_value_t = 3)]
        timeout: u64,
    },

    /// List contexts defined in the CLI config
    #[command(alias = "context", alias = "ctx")]
    Contexts,

    /// List devices known to the hub
    #[command(alias = "device", alias = "dev", alias = "d")]
    Devices,

    /// List rooms defined on the hub
    #[command(alias = "room", alias = "r")]
    Rooms,

    /// List scenes defined on the hub
    #[command(alias = "scene")]
    Scenes,

    /// List users authorized on the hub
    #[command(alias = "user", alias = "u")]
    Users,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SHOW
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(subcommand)]
    pub command: ShowCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShowCommand {
    /// Show details for a device
    #[command(alias = "dev", alias = "d")]
    Device {
        /// Device id
        id: String,
    },

    /// Show details for a room
    #[command(alias = "r")]
    Room {
        /// Room id
        id: String,
    },

    /// Show details for a scene
    Scene {
        /// Scene id
        id: String,
    },

    /// Show details for a user
    #[command(alias = "u")]
    User {
        /// User id (omit with --me)
        #[arg(required_unless_present = "me")]
        id: Option<String>,

        /// Show the user behind the current credential
        #[arg(long, conflicts_with = "id")]
        me: bool,
    },

    /// Show the hub's own status
    Hub,

    /// Show the access token for the current or specified context
    #[command(alias = "t")]
    Token,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DELETE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[command(subcommand)]
    pub command: DeleteCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeleteCommand {
    /// Delete a user from the hub (revokes its token)
    User {
        /// User id
        id: String,
    },

    /// Delete a context from the CLI config (and its stored token)
    Context {
        /// Context name
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LISTEN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Event types to filter (comma-separated; default: all)
    #[arg(long, short = 't', value_delimiter = ',')]
    pub types: Option<Vec<String>>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
