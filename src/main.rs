use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod dispatch;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config path as the first argument, extension may be omitted
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg)?;

    // Single-threaded runtime; connections are cooperative local tasks
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr, cfg.server.backlog)?;

    let state = Arc::new(config::AppState::new(cfg));
    logger::log_server_start(&addr, &state.config, &state.dispatcher.registry().paths());

    let shutdown = Arc::new(server::ShutdownSignal::new());
    let active_connections = Arc::new(AtomicUsize::new(0));

    // LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            server::start_signal_handler(Arc::clone(&shutdown));
            server::start_server_loop(listener, state, active_connections, shutdown).await
        })
        .await
}
