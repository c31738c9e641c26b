//! HTTP adapters - REST API implementations.
//!
//! `app` assembles the ticketing router with the cross-cutting layers:
//! request tracing, a per-request timeout and CORS.

mod error;
pub mod middleware;
pub mod ticketing;

use std::time::Duration;

use ::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::{status_for, ApiError, ErrorResponse};
pub use middleware::AuthState;
pub use ticketing::{ticketing_router, TicketingAppState};

/// Settings for the outer HTTP layers.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    /// Allowed browser origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
    /// Expose the message of 5xx errors in response bodies.
    pub verbose_errors: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
            verbose_errors: false,
        }
    }
}

/// Builds the complete application router.
pub fn app(state: TicketingAppState, validator: AuthState, settings: &HttpSettings) -> Router {
    let mut router = ticketing_router(validator).with_state(state);

    if settings.verbose_errors {
        router = router.layer(axum::middleware::map_response(error::reveal_internal_errors));
    }

    router
        .layer(cors_layer(&settings.cors_origins))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}
