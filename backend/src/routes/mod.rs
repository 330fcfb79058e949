mod docs;
mod health;
pub mod v1;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/v1/nonce", get(v1::nonce::handler))
        .api_route("/v1/complete-siwe", post(v1::siwe::handler))
        .api_route("/v1/verify", post(v1::verify::handler))
}
