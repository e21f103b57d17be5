use std::net::SocketAddr;

use stock_notify::config::{NotifierBackend, ServiceConfig};
use stock_notify::error::Result;
use stock_notify::notify::{Dispatcher, sender_from_config};
use stock_notify::server::{build_app, serve};
use stock_notify::store::{InMemoryStore, SubmissionStore};
use stock_notify::submission::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    // Optional .env for local runs
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env()?;

    eprintln!("📦 Stock Notify v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Notify: {}", config.to_email);
    eprintln!("   Delivery: {:?}", config.intake.delivery_mode);
    eprintln!("   CORS: {:?}", config.intake.cors_origins);

    // ── Notifier ────────────────────────────────────────────────────────
    let sender = sender_from_config(&config).await.inspect_err(|e| {
        tracing::error!(host = %config.smtp.host, error = %e, "SMTP transport unusable, refusing to start");
    })?;
    match config.backend {
        NotifierBackend::Smtp => eprintln!(
            "   SMTP: {}:{} ({})",
            config.smtp.host,
            config.smtp.port,
            if config.smtp.secure { "implicit TLS" } else { "STARTTLS" }
        ),
        NotifierBackend::Noop => eprintln!("   SMTP: disabled (noop)"),
    }

    // ── Server ──────────────────────────────────────────────────────────
    let store: std::sync::Arc<dyn SubmissionStore> = std::sync::Arc::new(InMemoryStore::new());
    let state = AppState {
        store,
        dispatcher: Dispatcher::new(sender, config.to_email.clone()),
        intake: config.intake.clone(),
    };
    let app = build_app(state);

    let addr = SocketAddr::new(config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await.inspect_err(|e| {
        tracing::error!(%addr, error = %e, "Failed to bind");
    })?;
    eprintln!("   Listening: http://{addr}/back-in-stock\n");

    serve(listener, app).await
}
