pub mod error;
pub mod store;
pub mod tasks;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::store::TaskStore;

#[derive(Debug)]
pub struct AppState {
    pub store: TaskStore,
}

/// The complete HTTP surface, ready to serve.
pub fn app(store: TaskStore) -> Router {
    with_layers(tasks::router()).with_state(Arc::new(AppState { store }))
}

/// Wraps `router` in request tracing, CORS and panic recovery. Panic
/// responses pass through CORS like any other.
pub fn with_layers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    router
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
