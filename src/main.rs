use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pill_buddy::catalog::CatalogStore;
use pill_buddy::config::ServiceConfig;
use pill_buddy::lookup::LookupCriteria;
use pill_buddy::service::{self, ServiceClient};
use pill_buddy::tool::pill_buddy::PILL_BUDDY_ID;
use pill_buddy::tool::{ExecutionContext, ToolExecutor, ToolResponse};
use pill_buddy::PillRecord;

/// Pill Buddy: identify pills by color, shape and imprint
#[derive(Parser, Debug)]
#[command(name = "pill-buddy", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a pill-buddy.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the pill lookup tool
    Serve {
        /// Address to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Path to the JSON pill dataset
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Serve JSON-RPC on stdin/stdout instead of HTTP
        #[arg(long)]
        stdio: bool,

        /// Retry lookups that match nothing
        #[arg(long)]
        retry: bool,

        /// Total scans per lookup when retrying
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Delay between scans when retrying, in milliseconds
        #[arg(long)]
        retry_delay_ms: Option<u64>,
    },

    /// Look up a pill once and print the matches
    Lookup {
        /// Color of the pill
        #[arg(long)]
        color: String,

        /// Shape of the pill
        #[arg(long)]
        shape: String,

        /// Imprint on the pill
        #[arg(long)]
        imprint: Option<String>,

        /// Path to the JSON pill dataset
        #[arg(long, conflicts_with = "url")]
        catalog: Option<PathBuf>,

        /// Query a running service instead of a local dataset
        #[arg(long)]
        url: Option<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the tool definitions as JSON
    Tools {
        /// Path to the JSON pill dataset
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so the stdio transport owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(config: &ServiceConfig) -> Result<Arc<CatalogStore>> {
    let store = CatalogStore::load(&config.catalog_path).with_context(|| {
        format!(
            "Failed to load pill catalog from {}",
            config.catalog_path.display()
        )
    })?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = ServiceConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            catalog,
            stdio,
            retry,
            max_attempts,
            retry_delay_ms,
        } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(catalog) = catalog {
                config.catalog_path = catalog;
            }
            config.retry.enabled |= retry;
            if let Some(max_attempts) = max_attempts {
                config.retry.max_attempts = max_attempts;
            }
            if let Some(delay_ms) = retry_delay_ms {
                config.retry.delay_ms = delay_ms;
            }
            config.validate().context("Invalid configuration")?;

            let handler = service::build_handler(&config, load_catalog(&config)?);

            if stdio {
                service::serve_stdio(&handler).await?;
            } else {
                let listener = service::bind(&config.bind_address())
                    .await
                    .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
                let shutdown = async {
                    let _ = tokio::signal::ctrl_c().await;
                };
                service::serve_http(listener, Arc::new(handler), shutdown).await?;
            }
        }

        Commands::Lookup {
            color,
            shape,
            imprint,
            catalog,
            url,
            json,
        } => {
            let mut criteria = LookupCriteria::new(color, shape);
            criteria.imprint = imprint;
            let arguments = serde_json::to_value(&criteria)?;

            let response = match url {
                Some(url) => {
                    let client = ServiceClient::builder()
                        .with_url(url)
                        .with_agent_id("pill-buddy-cli")
                        .build()?;
                    client.call_tool(PILL_BUDDY_ID, arguments).await?
                }
                None => {
                    if let Some(catalog) = catalog {
                        config.catalog_path = catalog;
                    }
                    let registry = service::build_registry(&config, load_catalog(&config)?);
                    ToolExecutor::new(Arc::new(registry))
                        .execute(PILL_BUDDY_ID, arguments, ExecutionContext::new("pill-buddy-cli"))
                        .await?
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_response(&response);
            }
        }

        Commands::Tools { catalog } => {
            if let Some(catalog) = catalog {
                config.catalog_path = catalog;
            }
            let registry = service::build_registry(&config, load_catalog(&config)?);
            println!(
                "{}",
                serde_json::to_string_pretty(&registry.to_tool_definitions())?
            );
        }
    }

    Ok(())
}

fn print_response(response: &ToolResponse) {
    println!("{}", response.text);

    let Ok(pills) = serde_json::from_value::<Vec<PillRecord>>(response.data.clone()) else {
        return;
    };

    for pill in pills {
        println!(
            "  {:<28} {:<8} {:<8} {:<16} {}",
            pill.name, pill.color, pill.shape, pill.imprint, pill.url
        );
    }
}
