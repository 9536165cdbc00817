//! Application state shared across request handlers.

use std::sync::Arc;

use parcel_id::PublicIdCodec;

use crate::db::ParcelStore;

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn ParcelStore>,
    codec: PublicIdCodec,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: Arc<dyn ParcelStore>, codec: PublicIdCodec) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, codec }),
        }
    }

    /// Get a reference to the parcel store.
    pub fn store(&self) -> &dyn ParcelStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the public id codec.
    pub fn codec(&self) -> &PublicIdCodec {
        &self.inner.codec
    }
}
