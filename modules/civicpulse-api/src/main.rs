use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ai_client::Gemini;
use civicpulse_common::Config;
use civicpulse_domains::users::AnonymousReporter;
use civicpulse_domains::verification::{EvidenceClassifier, EvidenceVerifier};

mod auth;
mod error;
mod jwt;
mod media;
mod password;
mod rest;

use jwt::JwtService;
use media::MediaStore;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub struct AppState {
    pub pool: sqlx::PgPool,
    pub jwt: JwtService,
    pub verifier: EvidenceVerifier,
    pub anonymous: AnonymousReporter,
    pub media: MediaStore,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting civicpulse-api");

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    info!("Connected to database");

    civicpulse_domains::migrate(&pool).await?;
    info!("Migrations complete");

    // One outbound client with a hard timeout. It bounds both the evidence
    // fetch and the classification call, so a slow collaborator degrades the
    // verdict instead of hanging the submission.
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.ai_timeout_secs))
        .build()?;

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set; evidence verification will degrade to UNCERTAIN");
    }
    let gemini = Gemini::new(
        config.gemini_api_key.clone().unwrap_or_default(),
        &config.gemini_model,
    )
    .with_http_client(http_client.clone());
    let classifier: Arc<dyn EvidenceClassifier> = Arc::new(gemini);

    let media = MediaStore::new(config.media_dir.clone(), config.public_base_url.clone());
    media.ensure_dir().await?;

    let state = Arc::new(AppState {
        pool,
        jwt: JwtService::new(&config.jwt_secret, "civicpulse".to_string()),
        verifier: EvidenceVerifier::new(http_client, classifier),
        anonymous: AnonymousReporter::new(),
        media,
    });

    let app = Router::new()
        .route("/", get(|| async { "CivicPulse API" }))
        .route("/api/health", get(rest::health))
        .route("/api/auth/register", post(rest::account::api_register))
        .route("/api/auth/login", post(rest::account::api_login))
        .route(
            "/api/issues",
            get(rest::api_issues).post(rest::submit::api_submit_issue),
        )
        .route(
            "/api/issues/{id}",
            get(rest::api_issue_detail)
                .put(rest::api_edit_issue)
                .delete(rest::api_delete_issue),
        )
        .route("/api/issues/{id}/status", patch(rest::api_change_status))
        .route("/api/users/{user_id}/issues", get(rest::api_user_issues))
        .route("/api/upload", post(rest::upload::api_upload))
        .nest_service("/uploads", ServeDir::new(&config.media_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.host, config.port);
    info!("CivicPulse API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
