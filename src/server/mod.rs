//! HTTP server: API routes plus static file serving.

pub mod api;

use std::net::SocketAddr;
use std::path::{Component, Path};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tower_http::cors::CorsLayer;

use crate::config::IntakeConfig;
use crate::mailer::{Mailer, NotifyConfig, SmtpMailer};
use crate::store::{StoreHandle, SubmissionStore};

use api::{AppState, SharedState};

/// Token in the served index.html replaced with the configured key.
pub const MAPS_KEY_PLACEHOLDER: &str = "__GOOGLE_MAPS_API_KEY__";

/// Build the full application router from shared state.
pub fn build_router(state: SharedState) -> Router {
    api::api_router()
        .fallback(static_handler)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve files from the document root. `/` serves index.html with the
/// maps key substituted; anything else is looked up verbatim.
async fn static_handler(State(state): State<SharedState>, req: Request) -> Response {
    let path = req.uri().path().trim_start_matches('/');

    if path.is_empty() {
        return serve_index(&state);
    }

    // Only plain path segments; anything like ".." cannot escape the root.
    let relative = Path::new(path);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let file_path = state.document_root.join(relative);
    match std::fs::read(&file_path) {
        Ok(content) => {
            let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
            Response::builder()
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(content))
                .unwrap()
                .into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn serve_index(state: &AppState) -> Response {
    let index_path = state.document_root.join("index.html");
    match std::fs::read_to_string(&index_path) {
        Ok(html) => Html(html.replace(MAPS_KEY_PLACEHOLDER, &state.maps_api_key)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}

/// Start the intake server and run until Ctrl+C.
pub async fn start(config: IntakeConfig) -> Result<()> {
    let store =
        SubmissionStore::open(&config.data_dir).context("Failed to open submission store")?;

    let mailer: Option<Arc<dyn Mailer>> = match &config.mail {
        Some(mail) => {
            let smtp = SmtpMailer::new(mail).context("Failed to configure SMTP mailer")?;
            tracing::info!(server = %mail.server, "email notifications enabled");
            Some(Arc::new(smtp))
        }
        None => {
            tracing::info!("email notifications disabled (MAIL_USERNAME not set)");
            None
        }
    };

    let state = Arc::new(AppState {
        store: StoreHandle::new(store),
        mailer,
        notify: NotifyConfig {
            company_name: config.company_name.clone(),
            company_email: config.company_email.clone(),
        },
        document_root: config.document_root.clone(),
        maps_api_key: config.maps_api_key.clone(),
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    println!("Factory intake server running at http://{}", local_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    println!("\nShutting down...");
}
