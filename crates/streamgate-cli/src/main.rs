use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "streamgate", version, about = "Streamgate video gateway")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP gateway.
    Serve {
        /// Configuration file (defaults to $STREAMGATE_CONFIG, then ./streamgate.yaml).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Manage access-token signing keys.
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Mint, verify and inspect access tokens.
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Validate a configuration file.
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new Ed25519 keypair.
    Generate {
        /// Directory to write `private.key` and `public.key` into.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint an access token for a video path.
    Mint {
        /// Private key file or hex string.
        #[arg(long, env = "STREAMGATE_PRIVATE_KEY")]
        key: Option<String>,

        /// Base URL of the embedding site (must be allowlisted).
        #[arg(long)]
        base_url: String,

        /// Video path, e.g. `/<video-id>/watch`.
        #[arg(long)]
        path: String,

        #[arg(long, default_value = "")]
        org_id: String,

        #[arg(long, default_value = "")]
        role: String,

        #[arg(long, default_value = "")]
        extra_data: String,

        /// Lifetime such as `24h`, `30m` or `7d`.
        #[arg(long)]
        expires: Option<String>,

        /// Write the token to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a token against a public key and print its claims.
    Verify {
        /// Public key file or hex string.
        #[arg(long, env = "STREAMGATE_PUBLIC_KEY")]
        key: Option<String>,

        /// Token or file containing it.
        token: String,
    },

    /// Show a token's structure without verifying it.
    Inspect {
        /// Token or file containing it.
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve { config } => commands::serve::run(config.as_deref()).await?,

        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Mint {
                key,
                base_url,
                path,
                org_id,
                role,
                extra_data,
                expires,
                output,
            } => commands::token::mint(commands::token::MintArgs {
                key,
                base_url,
                path,
                org_id,
                role,
                extra_data,
                expires,
                output,
            })?,
            TokenCommand::Verify { key, token } => commands::token::verify(key, token)?,
            TokenCommand::Inspect { token } => commands::token::inspect(token)?,
        },

        Command::Check { config } => {
            let ok = commands::check::run(config.as_deref())?;
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
