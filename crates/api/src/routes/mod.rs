pub mod campaigns;
pub mod health;
pub mod provider;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(campaigns::router())
        .merge(provider::router())
        .with_state(state)
}
