use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use mcluster::api::{serve, AppState};
use mcluster::client::ClusterClient;
use mcluster::engine::ClusterCoordinator;
use mcluster::providers::{ClusterProvider, KindProvider};
use mcluster::types::ClusterMetadata;
use mcluster::Config;

#[derive(Parser)]
#[command(name = "mcluster")]
#[command(about = "Create and destroy ephemeral kind clusters over HTTP", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control plane
    Serve {
        #[arg(short, long, help = "Port to listen on (default: MCLUSTER_PORT or 8080)")]
        port: Option<u16>,
    },
    /// Create a cluster and print its ID
    Create {
        name: String,
        #[arg(long, help = "Worker node count, recorded with the cluster")]
        nodes: Option<u32>,
        #[arg(long = "type", help = "Cluster type, recorded with the cluster")]
        cluster_type: Option<u32>,
        #[arg(long, help = "Server URL (default: MCLUSTER_SERVER)")]
        server: Option<String>,
    },
    /// Delete a cluster
    Delete {
        name: String,
        #[arg(long)]
        server: Option<String>,
    },
    /// Show one cluster
    Get {
        name: String,
        #[arg(long)]
        server: Option<String>,
    },
    /// Show every known cluster
    List {
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Serve { port } => run_server(&config, port).await?,
        Commands::Create {
            name,
            nodes,
            cluster_type,
            server,
        } => {
            let client = client_for(&config, server);
            let metadata = ClusterMetadata {
                nodes,
                cluster_type,
            };
            let cluster_id = client.create(&name, &metadata).await?;
            println!("ClusterID: {}", cluster_id);
        }
        Commands::Delete { name, server } => {
            client_for(&config, server).delete(&name).await?;
            println!("Cluster '{}' deleted", name);
        }
        Commands::Get { name, server } => {
            let cluster = client_for(&config, server).get(&name).await?;
            println!("{}", serde_json::to_string_pretty(&cluster)?);
        }
        Commands::List { server } => {
            let clusters = client_for(&config, server).list().await?;
            println!("{}", serde_json::to_string_pretty(&clusters)?);
        }
    }

    Ok(())
}

async fn run_server(config: &Config, port: Option<u16>) -> Result<()> {
    let provider = KindProvider::new(config.kind_config());
    let coordinator = ClusterCoordinator::new(Arc::new(provider) as Arc<dyn ClusterProvider>)
        .with_create_args(config.create_args());

    log::info!(
        "Using `{}` with a {}s timeout per invocation",
        config.kind_binary,
        config.timeout_secs
    );

    let state = AppState {
        coordinator: Arc::new(coordinator),
    };
    serve(state, port.unwrap_or(config.port)).await
}

fn client_for(config: &Config, server: Option<String>) -> ClusterClient {
    ClusterClient::new(server.unwrap_or_else(|| config.server_url.clone()))
}
