use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "reviewbox")]
#[command(about = "Collect star ratings and reviews on this device")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local review store
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a new review
    #[command(alias = "new")]
    Add {
        /// Reviewer name
        #[arg(long)]
        name: Option<String>,
        /// Service the review is about
        #[arg(long)]
        service: Option<String>,
        /// Star rating from 1 to 5
        #[arg(short, long)]
        rating: Option<u8>,
        /// Review text (read from stdin when omitted)
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// List reviews, newest first
    List {
        /// Number of reviews to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a review (admin only)
    Edit {
        /// Review ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Pass an empty value to clear the service
        #[arg(long)]
        service: Option<String>,
        #[arg(short, long)]
        rating: Option<u8>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Delete one of your reviews, or any review in admin mode
    Delete {
        /// Review ID
        id: String,
    },
    /// Delete every review (admin only)
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Export reviews
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Enter or leave admin mode
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Relay pending reviews to the configured form inbox
    Sync {
        #[command(subcommand)]
        command: Option<SyncCommands>,
    },
    /// Manage relay and admin configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl From<ExportFormat> for reviewbox_core::ExportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Csv => Self::Csv,
            ExportFormat::Json => Self::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RelayKind {
    GoogleForms,
    Formspree,
    Json,
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Unlock admin mode with the shared password
    Login {
        /// Admin password (read from stdin when omitted)
        #[arg(long, value_name = "PASSWORD")]
        password: Option<String>,
    },
    /// Leave admin mode
    Logout,
    /// Show device token and admin state
    Status,
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Keep sweeping pending reviews until interrupted
    Watch,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create or update the config file
    Init(ConfigInitArgs),
    /// Print the effective config
    Show,
}

#[derive(Args, Debug, Default)]
pub struct ConfigInitArgs {
    /// Relay destination type
    #[arg(long, value_enum)]
    pub relay: Option<RelayKind>,
    /// Form endpoint URL
    #[arg(long, value_name = "URL")]
    pub relay_url: Option<String>,
    /// Google Forms entry id for the name field
    #[arg(long, value_name = "ENTRY")]
    pub name_field: Option<String>,
    /// Google Forms entry id for the rating field
    #[arg(long, value_name = "ENTRY")]
    pub rating_field: Option<String>,
    /// Google Forms entry id for the service field
    #[arg(long, value_name = "ENTRY")]
    pub service_field: Option<String>,
    /// Google Forms entry id for the review text field
    #[arg(long, value_name = "ENTRY")]
    pub text_field: Option<String>,
    /// Google Forms entry id for the date field
    #[arg(long, value_name = "ENTRY")]
    pub date_field: Option<String>,
    /// Remove the relay endpoint
    #[arg(long, conflicts_with_all = ["relay", "relay_url"])]
    pub no_relay: bool,
    /// Shared admin password
    #[arg(long, value_name = "SECRET")]
    pub admin_secret: Option<String>,
    /// strftime pattern for review dates
    #[arg(long, value_name = "FORMAT")]
    pub date_format: Option<String>,
    #[arg(long, value_name = "SECS")]
    pub sweep_interval_secs: Option<u64>,
    /// 0 retries forever
    #[arg(long, value_name = "N")]
    pub max_relay_attempts: Option<u32>,
    #[arg(long, value_name = "SECS")]
    pub relay_timeout_secs: Option<u64>,
}
