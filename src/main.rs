use anyhow::Context;
use axum::routing::{get, post, put};
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use tourney_api::config;
use tourney_api::database::DatabaseManager;
use tourney_api::handlers::{self, admin_auth, players, schedule, settings, teams, user_auth};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting tournament API in {:?} mode", config.environment);

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Tournament API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

fn app() -> Router {
    use axum::routing::delete;
    use tourney_api::handlers::method_not_allowed as mna;

    let config = config::config();

    let router = Router::new()
        .route("/", get(root).fallback(mna))
        .route("/health", get(health).fallback(mna))
        // Admin authentication and account management
        .route("/auth/login", post(admin_auth::login).fallback(mna))
        .route(
            "/auth/admins",
            get(admin_auth::list_admins)
                .post(admin_auth::create_admin)
                .fallback(mna),
        )
        .route(
            "/auth/admins/:id",
            delete(admin_auth::delete_admin).fallback(mna),
        )
        // Captain/player sessions
        .route("/user-auth/login", post(user_auth::login).fallback(mna))
        .route("/user-auth/verify", post(user_auth::verify).fallback(mna))
        .route("/user-auth/logout", post(user_auth::logout).fallback(mna))
        // Team registration and management
        .route(
            "/teams",
            get(teams::list)
                .post(teams::register)
                .delete(teams::clear_all)
                .fallback(mna),
        )
        .route("/teams/login", post(teams::login).fallback(mna))
        .route(
            "/teams/:id",
            get(teams::get)
                .put(teams::update)
                .delete(teams::delete)
                .fallback(mna),
        )
        .route("/teams/:id/status", put(teams::set_status).fallback(mna))
        // Individual players
        .route(
            "/players",
            get(players::list).post(players::register).fallback(mna),
        )
        .route("/players/:id", delete(players::delete).fallback(mna))
        .route(
            "/players/:id/status",
            put(players::set_status).fallback(mna),
        )
        // Match schedule
        .route(
            "/schedule/matches",
            get(schedule::list)
                .post(schedule::create)
                .delete(schedule::clear)
                .fallback(mna),
        )
        .route(
            "/schedule/matches/:id",
            put(schedule::update).delete(schedule::delete).fallback(mna),
        )
        .route(
            "/schedule/published",
            get(schedule::published)
                .put(schedule::set_published)
                .fallback(mna),
        )
        // Global settings
        .route(
            "/settings",
            get(settings::list).put(settings::put).fallback(mna),
        )
        .fallback(handlers::unknown_route)
        // Global middleware
        .layer(CorsLayer::permissive());

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Tournament API",
            "version": version,
            "description": "Tournament registration backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "admin_auth": "/auth/login, /auth/admins (super admin)",
                "user_auth": "/user-auth/login|verify|logout (public)",
                "teams": "/teams[/:id], /teams/login, /teams/:id/status",
                "players": "/players[/:id], /players/:id/status",
                "schedule": "/schedule/matches[/:id], /schedule/published",
                "settings": "/settings",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
