use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;
mod store;

/// Config file stem used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let store = store::build_store(&cfg.database);
    if cfg.database.create_schema_on_start {
        if let Err(e) = store.create_schema().await {
            logger::log_store_error("create_schema", &e);
            return Err(e.into());
        }
        logger::log_schema_ready();
    }

    let listener = server::create_listener(addr)?;
    let state = Arc::new(config::AppState::new(&cfg, store));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    logger::log_server_start(&addr, &cfg);
    server::run_server(listener, state, Arc::clone(&signals.shutdown)).await?;
    Ok(())
}
