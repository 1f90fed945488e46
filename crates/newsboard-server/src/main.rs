mod cleanup;
mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::bail;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use newsboard_api::authors;
use newsboard_api::{AppState, AppStateInner, DbSessionStore, MemorySessionStore, SessionStore};
use newsboard_db::Database;

use crate::config::{Config, SessionBackend};

const USAGE: &str = "usage:
    newsboard [serve]
    newsboard add-author <username> <name> <password>
    newsboard remove-author <username>
    newsboard list-authors";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsboard=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let db = Arc::new(open_database(&config)?);

    match args.as_slice() {
        [] | ["serve"] => serve(config, db).await,
        ["add-author", username, name, password] => {
            let author = authors::register_author(&db, username, name, password)?;
            println!("added author {} ({})", author.username, author.name);
            Ok(())
        }
        ["remove-author", username] => {
            authors::remove_author(&db, username)?;
            println!("removed author {} and their stories", username);
            Ok(())
        }
        ["list-authors"] => {
            for author in authors::list_authors(&db)? {
                println!("{}\t{}", author.username, author.name);
            }
            Ok(())
        }
        _ => bail!("unrecognized arguments\n{}", USAGE),
    }
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    if config.db_path.as_os_str() == ":memory:" {
        return Database::open_in_memory();
    }
    Database::open(&config.db_path)
}

async fn serve(config: Config, db: Arc<Database>) -> anyhow::Result<()> {
    let ttl = config.session_ttl;
    let sessions: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Sqlite => Arc::new(DbSessionStore::new(db.clone(), ttl)),
        SessionBackend::Memory => Arc::new(MemorySessionStore::new(ttl)),
    };

    // Background cleanup task (runs every hour)
    tokio::spawn(cleanup::run_cleanup_loop(sessions.clone(), 3600));

    let state: AppState =
        Arc::new(AppStateInner::new(db, sessions).with_secure_cookies(config.secure_cookies));

    let app = newsboard_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Newsboard listening on {}", addr);
    info!(
        "Sessions: {:?} store, {} hour lifetime",
        config.session_backend, config.session_ttl_hours
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::warn!("SIGTERM handler unavailable: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
