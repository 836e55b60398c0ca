//! Farmstand Backend
//!
//! REST backend for a farm-to-consumer produce platform: a read-only catalog
//! served from an immutable snapshot, signup forms persisted in SQLite, and a
//! bearer-token-gated admin surface.

mod api;
mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod models;
mod notify;
mod validation;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog::Catalog;
use config::Config;
use db::Repository;
use notify::EmailClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub catalog: Arc<Catalog>,
    pub config: Arc<Config>,
    pub mailer: Option<Arc<EmailClient>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Farmstand Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Catalog data dir: {:?}", config.data_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if the admin key is not configured
    if config.admin_key.is_none() {
        tracing::warn!("No admin key configured (FARMSTAND_ADMIN_KEY). Admin auth is disabled!");
    }
    if config.email.is_none() {
        tracing::info!("Email settings incomplete; signup notifications disabled");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Load the catalog snapshot
    let catalog = Arc::new(Catalog::load(&config.data_dir)?);
    tracing::info!(
        "Catalog loaded: {} produce items, {} farms, {} FAQs",
        catalog.produce_count(),
        catalog.farm_count(),
        catalog.faq_count()
    );

    let mailer = config.email.as_ref().map(|s| Arc::new(EmailClient::new(s)));

    // Create application state
    let state = AppState {
        repo,
        catalog,
        config: Arc::new(config.clone()),
        mailer,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration: allowlist from config, permissive otherwise
    let allow_origin = match &state.config.cors_origins {
        Some(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        ),
        None => AllowOrigin::any(),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes
    let public_routes = Router::new()
        // Catalog
        .route("/produce", get(api::list_produce))
        .route("/produce/{id}", get(api::get_produce))
        .route("/farms", get(api::list_farms))
        .route("/faqs", get(api::list_faqs))
        .route("/search", get(api::search_catalog))
        // Signups
        .route("/waitlist", post(api::join_waitlist))
        .route("/newsletter", post(api::subscribe_newsletter))
        .route("/early-access", post(api::request_early_access))
        .route("/farm-applications", post(api::submit_farm_application))
        // Chat log
        .route(
            "/chat/messages/{session_id}",
            get(api::list_chat_messages).post(api::post_chat_message),
        );

    // Clone the admin key for the auth layer
    let admin_key = state.config.admin_key.clone();

    // Admin routes, bearer-token gated
    let admin_routes = Router::new()
        .route(
            "/blog-posts",
            get(api::list_blog_posts).post(api::create_blog_post),
        )
        .route(
            "/blog-posts/{id}",
            get(api::get_blog_post)
                .put(api::update_blog_post)
                .delete(api::delete_blog_post),
        )
        .route("/stats", get(api::admin_stats))
        .route("/export/{kind}", get(api::export_csv))
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(admin_key.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api/admin", admin_routes)
        .nest("/api", public_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
