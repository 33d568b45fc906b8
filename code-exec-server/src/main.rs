use clap::Parser;
use code_exec::{toolchain_report, ExecutionCoordinator, Settings, Strategy};
use code_exec_server::{create_app, run_server};
use ecs_runner::{ClusterConfig, EcsClient};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to listen on
    #[arg(short, long, env = "BIND_ADDR", default_value = "0.0.0.0:3001")]
    addr: SocketAddr,

    /// Port to listen on, replacing the port of --addr
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Settings file (TOML)
    #[arg(short, long, env = "CODE_EXEC_CONFIG")]
    config: Option<PathBuf>,

    /// Execution strategy: local or remote
    #[arg(long, env = "EXECUTION_STRATEGY")]
    strategy: Option<Strategy>,

    /// Directory for per-execution workspaces
    #[arg(long, env = "WORKSPACE_ROOT")]
    workspace_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(strategy) = args.strategy {
        settings = settings.with_strategy(strategy);
    }
    if let Some(root) = args.workspace_root {
        settings = settings.with_workspace_root(root);
    }

    let mut coordinator = ExecutionCoordinator::new(settings.clone());
    toolchain_report(coordinator.registry());

    if settings.strategy == Strategy::Remote {
        let cluster = ClusterConfig::from_env()?;
        info!(
            "Remote execution on cluster {} in {}",
            cluster.cluster, cluster.region
        );
        let client = EcsClient::new(cluster).await?;
        coordinator = coordinator.with_orchestrator(Arc::new(client));
    }

    let mut addr = args.addr;
    if let Some(port) = args.port {
        addr.set_port(port);
    }

    let app = create_app(coordinator);
    run_server(app, addr).await?;

    Ok(())
}
