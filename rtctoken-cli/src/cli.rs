use clap::{Args, Parser, Subcommand};
use rtctoken::{Role, Version};

#[derive(Parser)]
#[command(
    name = "rtctoken",
    version,
    about = "Issue, inspect and verify access tokens for real-time channels",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a signed token for a channel
    Generate(GenerateArgs),

    /// Decode a token and print its fields without checking the signature
    Inspect {
        /// The token (read from stdin when omitted)
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Verify a token's signature against an app certificate
    Verify(VerifyArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Channel to grant access to
    #[arg(short, long)]
    pub channel: String,

    /// Numeric user id (0 lets the server assign one)
    #[arg(short, long, conflicts_with = "account")]
    pub uid: Option<u32>,

    /// String user account
    #[arg(short, long)]
    pub account: Option<String>,

    /// Role of the user: host or audience
    #[arg(short, long)]
    pub role: Option<Role>,

    /// Validity window in seconds
    #[arg(short, long)]
    pub expires: Option<u32>,

    /// Token revision: 006 or 007
    #[arg(short, long)]
    pub profile: Option<Version>,

    /// 32-character hex app id
    #[arg(long, env = "RTCTOKEN_APP_ID")]
    pub app_id: Option<String>,

    /// Hex-encoded app certificate
    #[arg(long, env = "RTCTOKEN_APP_CERTIFICATE", hide_env_values = true)]
    pub app_certificate: Option<String>,

    /// Output only the token without any formatting (useful for piping)
    #[arg(long)]
    pub token_only: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// The token to verify
    #[arg(short, long)]
    pub token: String,

    /// Hex-encoded app certificate
    #[arg(long, env = "RTCTOKEN_APP_CERTIFICATE", hide_env_values = true)]
    pub app_certificate: String,

    /// Channel the token must be valid for (required for 006 tokens)
    #[arg(short, long)]
    pub channel: Option<String>,

    /// Numeric user id the token must be valid for
    #[arg(short, long, conflicts_with = "account")]
    pub uid: Option<u32>,

    /// String user account the token must be valid for
    #[arg(short, long)]
    pub account: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create an empty configuration file
    Init {
        /// Overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to get (omit to show all)
        key: Option<String>,
    },

    /// Show the configuration file path
    Path,
}
