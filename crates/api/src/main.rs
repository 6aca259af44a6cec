use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bookings_api::auth::bootstrap::ensure_admin;
use bookings_api::config::{self, ServerConfig};
use bookings_api::render::PageRenderer;
use bookings_api::router::build_app_router;
use bookings_api::state::AppState;
use bookings_db::{BookingRepository, PgBookingRepository};
use bookings_events::{
    EmailConfig, LogTransport, MailDispatcher, MailQueue, MailTransport, SmtpTransport,
};
use tokio_util::sync::CancellationToken;
use tower_sessions::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bookings_api=debug,bookings_db=debug,bookings_events=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = config::database_url()?;
    let pool = bookings_db::create_pool(&database_url, config.db_max_connections).await?;
    tracing::info!("Database connection pool created");

    bookings_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    bookings_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let repo: Arc<dyn BookingRepository> = Arc::new(PgBookingRepository::with_timeout(
        pool,
        Duration::from_millis(config.storage_timeout_ms),
    ));

    if let Some(admin) = &config.admin_bootstrap {
        ensure_admin(repo.as_ref(), admin).await?;
    }

    // --- Mail ---
    let transport: Arc<dyn MailTransport> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "SMTP delivery enabled");
            Arc::new(SmtpTransport::new(&email_config)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, outgoing mail will only be logged");
            Arc::new(LogTransport)
        }
    };
    let (mail, mail_rx) = MailQueue::new(config.mail.queue_capacity);
    let mail_cancel = CancellationToken::new();
    let dispatcher = MailDispatcher::new(transport, config.mail.max_attempts);
    let mail_handle = tokio::spawn(dispatcher.run(mail_rx, mail_cancel.clone()));
    tracing::info!("Mail dispatcher started");

    // --- App state ---
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
        mail,
        renderer: Arc::new(PageRenderer::default()),
    };

    let app = build_app_router(state, &config, MemoryStore::default());

    // --- Start server ---
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining mail queue");
    mail_cancel.cancel();
    if tokio::time::timeout(Duration::from_secs(10), mail_handle)
        .await
        .is_err()
    {
        tracing::warn!("Mail dispatcher did not finish draining in time");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
