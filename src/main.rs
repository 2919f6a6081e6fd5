use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use edge_router::config::Config;
use edge_router::routing::{BuildManifest, RouteTable};
use edge_router::server::{self, ServerContext};
use edge_router::{logger, EdgeRouter};

#[derive(Debug, Parser)]
#[command(name = "edge-router", version, about = "Edge router for the prebuilt SPA bundle")]
struct Cli {
    /// Configuration file, extension optional
    #[arg(short, long, env = "EDGE_CONFIG", default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Write the platform routing manifest
    Manifest {
        #[arg(long, default_value = "dist")]
        out_dir: PathBuf,
    },
    /// Print the ordered route table
    Routes,
    /// Print the effective configuration with secrets redacted
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg),
        Command::Manifest { out_dir } => {
            let manifest = BuildManifest::from_table(&RouteTable::from_config(&cfg));
            let path = manifest.write_routes_json(&out_dir)?;
            println!("wrote {}", path.display());
            Ok(())
        }
        Command::Routes => {
            let router = EdgeRouter::new(&cfg)?;
            for route in router.table().routes() {
                println!("{:<24} {}", route.pattern, route.kind.label());
            }
            Ok(())
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(&cfg)?);
            Ok(())
        }
    }
}

fn serve(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg.logging)?;

    // Worker count from configuration, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let router = EdgeRouter::new(&cfg)?;
    let listener = server::create_listener(addr, cfg.server.backlog)?;

    logger::log_server_start(&listener.local_addr()?, &cfg);
    let ctx = Arc::new(ServerContext::new(&cfg, router));
    server::serve(listener, ctx, server::shutdown_signal()).await;

    tracing::info!("server stopped");
    Ok(())
}
