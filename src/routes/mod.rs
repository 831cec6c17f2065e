//! Route gateway: merges every subrouter and attaches the shared state.

use axum::Router;

use crate::SharedState;

mod dashboard;
mod health;
mod page;

// ---

pub fn router(state: SharedState) -> Router {
    // ---
    Router::new()
        .merge(dashboard::router())
        .merge(page::router())
        .merge(health::router())
        .with_state(state)
}
