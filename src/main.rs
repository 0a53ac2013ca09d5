//! Route Engine CLI
//!
//! Loads a TOML route table and answers routing queries against it.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes.toml ──▶ config::loader ──▶ EngineConfig ──┐
//!   route_files ──▶ FileCollector ───────────────────┤
//!                                                    ▼
//!                                     ChainCollector (inline, files)
//!                                                    │
//!   request / name ──────────────────────────▶ Router ──▶ PathRegexGenerator
//!                                                    │
//!                                                    ▼
//!                                       RouteMatch / path / error (JSON)
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use route_engine::collector::{ChainCollector, FileCollector, ReloadableCollector, StaticCollector};
use route_engine::config::{load_config, watcher::ConfigWatcher, EngineConfig};
use route_engine::observability::logging::init_logging;
use route_engine::routing::generator::PathRegexGenerator;
use route_engine::routing::{RequestParts, RouteMatch, Router};
use route_engine::RoutingError;

#[derive(Parser)]
#[command(name = "route-engine")]
#[command(about = "Resolve requests and route names against a route table", long_about = None)]
struct Cli {
    /// Route table configuration file.
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the route matching a request
    Match {
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        #[arg(long, default_value = "")]
        host: String,
        #[arg(long, default_value = "http")]
        scheme: String,
    },
    /// Look up a route by name
    Lookup { name: String },
    /// Build the path for a named route from key=value parameters
    Url { name: String, params: Vec<String> },
    /// Validate the route table and compile every route
    Check,
    /// Watch the configuration file and apply changes until Ctrl+C
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.settings.log_level)?;

    tracing::info!(
        config = %cli.config.display(),
        collections = config.collections.len(),
        route_files = config.settings.route_files.len(),
        "route-engine v0.1.0 starting"
    );

    let router = Arc::new(build_router(&config, StaticCollector::new(config.build_collections()?))?);

    let result = match cli.command {
        Commands::Watch => return watch(cli.config, config).await,
        Commands::Match {
            path,
            method,
            host,
            scheme,
        } => {
            let request = RequestParts::new(path)
                .with_method(method)
                .with_hostname(host)
                .with_scheme(scheme);
            router
                .resolve_within(request, config.settings.resolve_timeout())
                .await
                .map(|found| render_match(&found))
        }
        Commands::Lookup { name } => router.get_route(&name).map(|route| {
            json!({
                "name": route.name(),
                "path": route.path(),
                "target": route.target(),
                "method": route.method(),
                "hostname": route.hostname(),
                "scheme": route.scheme(),
            })
        }),
        Commands::Url { name, params } => {
            let params = parse_params(&params)?;
            router
                .generate_path(&name, &params)
                .map(|path| json!({ "name": name, "path": path }))
        }
        Commands::Check => router
            .verify()
            .map(|summary| serde_json::to_value(summary).unwrap_or_default()),
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) if e.is_lookup_miss() => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn build_router<C>(config: &EngineConfig, inline: C) -> Result<Router<ChainCollector>, RoutingError>
where
    C: route_engine::RouteCollector + 'static,
{
    let generator = PathRegexGenerator::with_default_fragment(config.settings.default_placeholder.clone())?;
    let collector = ChainCollector::new().with(inline).with(FileCollector::new(
        config.settings.route_files.clone(),
        config.settings.clone(),
    ));
    Ok(Router::with_generator(
        collector,
        Arc::new(generator),
        config.router_options(),
    ))
}

async fn watch(path: PathBuf, config: EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let reloadable = Arc::new(ReloadableCollector::new(config.build_collections()?));
    let router = build_router(&config, Arc::clone(&reloadable))?;
    let summary = router.verify()?;
    tracing::info!(routes = summary.routes, "Serving route table");

    let (watcher, updates) = ConfigWatcher::new(&path, &config);
    let _watcher = watcher.run()?;
    let follower = Arc::clone(&reloadable).follow(updates);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    follower.abort();

    Ok(())
}

fn render_match(found: &RouteMatch) -> serde_json::Value {
    json!({
        "name": found.route().name(),
        "target": found.route().target(),
        "parameters": found.parameters(),
    })
}

fn parse_params(pairs: &[String]) -> Result<BTreeMap<String, String>, String> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("expected key=value, got '{}'", pair))
        })
        .collect()
}
