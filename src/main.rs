use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prizmo::{admin, api, auth, flow::SpinSettings, state::AppState, store::MemoryStore};

#[tokio::main]
async fn main() {
    // A missing .env is fine; anything else is worth a note.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: could not read .env: {e}");
        }
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("prizmo=debug,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Prizmo...");

    let auth_config = Arc::new(auth::AuthConfig::from_env());

    let store = Arc::new(MemoryStore::new());
    store.seed_demo_data().await;
    let state = AppState::with_store(store, SpinSettings::from_env());

    let admin_routes = admin::router().layer(middleware::from_fn_with_state(
        auth_config,
        auth::admin_auth_middleware,
    ));

    let app = Router::new()
        .merge(api::router())
        .merge(admin_routes)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
