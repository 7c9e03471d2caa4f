//! Wavebeat Back binary entrypoint wiring REST, SSE, camera capture and the song pipeline.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod capture;
mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod songs;
mod state;
mod vision;

use capture::FfmpegBackend;
use config::AppConfig;
use songs::{FfmpegAnalyzer, YtDlpProvider};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    ensure_directories(&config).context("creating storage directories")?;

    let backend = Arc::new(FfmpegBackend::new(
        config.ffmpeg_binary.clone(),
        config.capture.clone(),
    ));
    let provider = Box::new(YtDlpProvider::new(&config.songs));
    let analyzer = Box::new(FfmpegAnalyzer::new(config.ffmpeg_binary.clone()));

    let app_state = AppState::new(config, backend, provider, analyzer);

    // Cameras come up before the listener so the first request already sees
    // gestures; a missing camera only degrades the healthcheck.
    app_state.feeds().start_all().await;

    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    app_state.feeds().stop_all().await;
    info!("capture feeds stopped");

    Ok(())
}

/// Create the media and data directories if this is the first run.
fn ensure_directories(config: &AppConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.songs.media_dir)
        .with_context(|| format!("creating media directory {}", config.songs.media_dir))?;
    std::fs::create_dir_all(&config.songs.data_dir)
        .with_context(|| format!("creating data directory {}", config.songs.data_dir))?;
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
