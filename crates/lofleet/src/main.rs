mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lofleet")]
#[command(about = "Launch, list and tear down learning-observer instances", long_about = None)]
struct Cli {
    /// Credentials file (default: search for creds.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stop waiting on the provider after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch an instance and wait until it has a public address
    Create {
        /// Value of the instance's Name tag
        name: String,
        /// Also point <name>.<domain> at the new address
        #[arg(long)]
        dns: bool,
    },
    /// List the instances of this deployment
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Register or remove an address record
    Dns {
        subdomain: String,
        /// IPv4 address the record points at
        address: String,
        /// Zone name (default: from the credentials file)
        #[arg(long)]
        domain: Option<String>,
        /// Delete the record instead of upserting it
        #[arg(long)]
        remove: bool,
    },
    /// Terminate every instance with this name and remove its DNS record
    Terminate {
        name: String,
        /// Fail instead of terminating several same-named instances
        #[arg(long)]
        reject_duplicates: bool,
    },
    /// Print the space-separated addresses of instances with this name
    Pool { name: String },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("lofleet {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let ctx = commands::Context::load(cli.config.as_deref(), cli.timeout).await?;
    let cancel = ctx.wait.cancel_token().clone();

    commands::interruptible(&cancel, run(&ctx, cli.command)).await
}

async fn run(ctx: &commands::Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Create { name, dns } => commands::create::handle(ctx, &name, dns).await,
        Commands::List { json } => commands::list::handle(ctx, json).await,
        Commands::Dns {
            subdomain,
            address,
            domain,
            remove,
        } => commands::dns::handle(ctx, &subdomain, &address, domain.as_deref(), remove).await,
        Commands::Terminate {
            name,
            reject_duplicates,
        } => commands::terminate::handle(ctx, &name, reject_duplicates).await,
        Commands::Pool { name } => commands::pool::handle(ctx, &name).await,
        // handled before loading credentials
        Commands::Version => Ok(()),
    }
}
