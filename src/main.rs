// cupla: command-line front end for the browser toolkit
//
// `query` subcommands run the query-parameter synchronizer against an
// in-memory host seeded with the given URL. `fetch` performs a single GET,
// or polls until a 2xx arrives.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cupla_browser::{
    Config, Credentials, FetchClient, FetchResponse, MemoryHost, NavigationHost,
    NavigationIntent, QueryStateSync, load_yaml_config, load_yaml_config_from,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cupla", version, about = "Browser utility toolkit")]
struct Cli {
    /// YAML config file (defaults to config.yaml in the package root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read or write a URL query parameter
    Query {
        #[command(subcommand)]
        action: QueryAction,
    },
    /// GET a URL and print its body
    Fetch {
        url: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, requires = "user")]
        password: Option<String>,
        /// Poll until a 2xx response, giving up after this many milliseconds
        #[arg(long)]
        poll_ms: Option<u64>,
    },
}

#[derive(Subcommand)]
enum QueryAction {
    Get {
        url: String,
        name: String,
        #[arg(long)]
        default: Option<String>,
    },
    /// Set a parameter; omit the value to remove it
    Set {
        url: String,
        name: String,
        value: Option<String>,
        /// Overwrite the current history entry instead of pushing a new one
        #[arg(long)]
        replace: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_yaml_config_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => load_yaml_config().unwrap_or_else(|e| {
            tracing::debug!("No valid config.yaml found ({}), using defaults", e);
            Config::default()
        }),
    };

    match cli.command {
        Command::Query { action } => run_query(action, &config),
        Command::Fetch {
            url,
            user,
            password,
            poll_ms,
        } => {
            let credentials = user.map(|user| Credentials { user, password });
            run_fetch(&url, credentials.as_ref(), poll_ms, &config).await
        }
    }
}

fn run_query(action: QueryAction, config: &Config) -> Result<()> {
    match action {
        QueryAction::Get { url, name, default } => {
            let host = Arc::new(MemoryHost::new(&url)?);
            let sync = QueryStateSync::from_config(host, &config.history);
            match (sync.get(&name), default) {
                (Some(value), _) | (None, Some(value)) => println!("{value}"),
                (None, None) => println!("null"),
            }
        }
        QueryAction::Set {
            url,
            name,
            value,
            replace,
        } => {
            let host = Arc::new(MemoryHost::new(&url)?);
            let sync = QueryStateSync::from_config(host.clone(), &config.history);
            let outcome = if replace {
                sync.set_with_intent(&name, value.as_deref(), NavigationIntent::Replace)
            } else {
                sync.set(&name, value.as_deref())
            };

            let report = json!({
                "commit": outcome,
                "location": host.current_url(),
                "search": host.read_location().map(|loc| loc.search),
                "history": host.history(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

async fn run_fetch(
    url: &str,
    credentials: Option<&Credentials>,
    poll_ms: Option<u64>,
    config: &Config,
) -> Result<()> {
    let client = FetchClient::new(config.fetch.clone())?;
    let response = match poll_ms {
        Some(timeout_ms) => {
            client
                .poll_until(url, credentials, Some(timeout_ms), FetchResponse::is_success)
                .await?
        }
        None => client.request(url, credentials).await?,
    };

    match response {
        FetchResponse::Body(body) => println!("{body}"),
        FetchResponse::Aborted => anyhow::bail!("Request to {} was aborted", url),
        FetchResponse::Failed(status) => anyhow::bail!("Request to {} failed: HTTP {}", url, status),
    }
    Ok(())
}
