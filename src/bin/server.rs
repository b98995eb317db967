use std::{
    env,
    fs::OpenOptions,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use gastos_rs::{
    AppState, ConversionGateway, build_router, graceful_shutdown, initialize_db,
    logging_middleware,
    stores::{SQLiteTransactionStore, SQLiteUserStore},
};

/// The REST API server for gastos-rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Base URL of the exchange rate provider.
    #[arg(long, default_value = "https://v6.exchangerate-api.com/v6")]
    exchange_api_url: String,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");
    let exchange_api_key = env::var("EXCHANGE_API_KEY")
        .expect("The environment variable 'EXCHANGE_API_KEY' must be set");

    let conn = Connection::open(&args.db_path).expect("Could not open the database.");
    initialize_db(&conn).expect("Could not initialize the database.");
    let conn = Arc::new(Mutex::new(conn));

    let gateway = ConversionGateway::new(&args.exchange_api_url, &exchange_api_key)
        .expect("Could not create the conversion gateway.");

    let state = AppState::new(
        &secret,
        SQLiteUserStore::new(conn.clone()),
        SQLiteTransactionStore::new(conn),
        gateway,
    );

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state)).layer(middleware::from_fn(logging_middleware));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start the server.");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // TraceLayer logs 5xx responses by default but the error type does
        // its own logging, so disable that.
        .on_failure(());

    router.layer(tracing_layer)
}
