use astra::Server;
use listing_map::config::Config;
use listing_map::templates::html_error_response;
use listing_map::{handle, init_db, AppState, Database};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    let db = Database::new(config.db_path.clone());
    if let Err(e) = init_db(&db) {
        error!("Database initialization failed: {e}");
        std::process::exit(1);
    }

    if config.map_token.is_none() {
        error!("MAP_TOKEN is not set; the map page will show a blocking error");
    }

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(bind_addr = %config.bind_addr, "Invalid bind address: {e}");
            std::process::exit(1);
        }
    };
    info!(%addr, workers = config.max_workers, "starting server");

    let server = Server::bind(&addr).max_workers(config.max_workers);
    let state = AppState { db, config };

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => html_error_response(err),
    });

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    info!("server shut down");
}
