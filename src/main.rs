//! Meridian MCP Server Entry Point

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use meridian::{
    create_store, run_server, ApiTextModel, Config, GetContextParams, MeridianServer, TextModel,
    TransportType,
};

/// Meridian: Product Context MCP Server
#[derive(Parser, Debug)]
#[command(name = "meridian")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server (default)
    Serve {
        /// Transport override: "stdio" or "http"
        #[arg(short, long)]
        transport: Option<String>,
        /// HTTP port override
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Build context for a product once and print the result
    Ask {
        /// Product ID
        product_id: String,
        /// Natural-language request
        intent: String,
        /// Keyword filter override
        #[arg(short = 'f', long)]
        query_filter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the stdio transport.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    let store = create_store(&config).await?;
    let model: Arc<dyn TextModel> = Arc::new(ApiTextModel::from_config(&config.llm)?);
    let server = MeridianServer::new(config.clone(), store, model);

    match args.command {
        None => run_server(server, config.server.transport, config.server.http_port).await,
        Some(Command::Serve { transport, port }) => {
            let transport = match transport.as_deref() {
                None => config.server.transport,
                Some("stdio") => TransportType::Stdio,
                Some("http") => TransportType::Http,
                Some(other) => anyhow::bail!("unknown transport: {other}"),
            };
            let port = port.unwrap_or(config.server.http_port);
            run_server(server, transport, port).await
        }
        Some(Command::Ask {
            product_id,
            intent,
            query_filter,
        }) => {
            let text = server
                .get_context_text(&GetContextParams {
                    product_id,
                    intent,
                    query_filter,
                })
                .await;
            println!("{text}");
            Ok(())
        }
    }
}
