//! API v1 routes.

mod parcels;

use axum::Router;

use crate::state::AppState;

pub use parcels::ParcelResponse;

/// Create API v1 routes.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/parcel", parcels::routes())
}
