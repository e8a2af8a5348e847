use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::Gateway;
use crate::handlers;

/// Shared handler state; the gateway is created once at startup
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }
}

/// Full application: routes plus the global middleware the config asks for
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut app = router(state);

    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}

/// Routes only
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Reference data
        .merge(country_routes())
        .merge(currency_routes())
        .merge(exchange_routes())
        .merge(investment_routes())
        .with_state(state)
}

fn country_routes() -> Router<AppState> {
    use handlers::country;

    Router::new()
        .route("/api/country", get(country::list).post(country::create))
        .route(
            "/api/country/:id",
            get(country::show).put(country::update).delete(country::delete),
        )
}

fn currency_routes() -> Router<AppState> {
    use handlers::currency;

    Router::new()
        .route("/api/currency", get(currency::list).post(currency::create))
        .route(
            "/api/currency/:id",
            get(currency::show).put(currency::update).delete(currency::delete),
        )
}

fn exchange_routes() -> Router<AppState> {
    use handlers::exchange;

    Router::new()
        .route("/api/exchange", get(exchange::list).post(exchange::create))
        .route(
            "/api/exchange/:id",
            get(exchange::show).put(exchange::update).delete(exchange::delete),
        )
}

fn investment_routes() -> Router<AppState> {
    use handlers::{investment_segment as segment, investment_type};

    Router::new()
        .route(
            "/api/investment/segment",
            get(segment::list).post(segment::create),
        )
        .route(
            "/api/investment/segment/:id",
            get(segment::show).put(segment::update).delete(segment::delete),
        )
        .route(
            "/api/investment/type",
            get(investment_type::list).post(investment_type::create),
        )
        .route(
            "/api/investment/type/:id",
            get(investment_type::show)
                .put(investment_type::update)
                .delete(investment_type::delete),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}
