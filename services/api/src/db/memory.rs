//! In-process parcel store.
//!
//! Rows live in a map behind a lock and vanish with the process. Used by the
//! HTTP integration tests and by `PARCEL_STORE=memory` for local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{DbError, ParcelStore};
use crate::parcel::{NewParcel, Parcel, ParcelId, ParcelPatch};

/// Parcel store backed by an in-memory map.
#[derive(Debug, Default)]
pub struct MemoryParcelStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<ParcelId, Parcel>,
}

impl MemoryParcelStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParcelStore for MemoryParcelStore {
    async fn create(&self, parcel: NewParcel) -> Result<Parcel, DbError> {
        let mut inner = self.inner.write().await;
        // Ids are never reused, even after deletes.
        inner.last_id += 1;
        let id = ParcelId::new(inner.last_id);

        let row = Parcel {
            id,
            arrived_at: Utc::now(),
            name: parcel.name,
            street: parcel.street,
            street_number: parcel.street_number,
            post_code: parcel.post_code,
            region: parcel.region,
            country: parcel.country,
            handed_out: parcel.handed_out,
        };
        inner.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: ParcelId) -> Result<Option<Parcel>, DbError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Parcel>, DbError> {
        let mut rows: Vec<Parcel> = self.inner.read().await.rows.values().cloned().collect();
        rows.sort_by(|a, b| b.arrived_at.cmp(&a.arrived_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn update(&self, id: ParcelId, patch: ParcelPatch) -> Result<Option<Parcel>, DbError> {
        let mut inner = self.inner.write().await;
        Ok(inner.rows.get_mut(&id).map(|row| {
            patch.apply_to(row);
            row.clone()
        }))
    }

    async fn delete(&self, id: ParcelId) -> Result<bool, DbError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_parcel(name: &str) -> NewParcel {
        NewParcel {
            name: name.to_string(),
            street: "Main".to_string(),
            street_number: 1,
            post_code: 1000,
            region: "R".to_string(),
            country: "C".to_string(),
            handed_out: false,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = MemoryParcelStore::new();
        let a = store.create(new_parcel("a")).await.unwrap();
        let b = store.create(new_parcel("b")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = MemoryParcelStore::new();
        let a = store.create(new_parcel("a")).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        let b = store.create(new_parcel("b")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_create_stamps_arrival_time() {
        let store = MemoryParcelStore::new();
        let before = Utc::now();
        let parcel = store.create(new_parcel("a")).await.unwrap();
        let after = Utc::now();
        assert!(parcel.arrived_at >= before && parcel.arrived_at <= after);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryParcelStore::new();
        for name in ["a", "b", "c"] {
            store.create(new_parcel(name)).await.unwrap();
        }
        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let store = MemoryParcelStore::new();
        let result = store
            .update(ParcelId::new(99), ParcelPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_arrival_time() {
        let store = MemoryParcelStore::new();
        let parcel = store.create(new_parcel("a")).await.unwrap();
        let patch = ParcelPatch {
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        let updated = store.update(parcel.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.arrived_at, parcel.arrived_at);
    }

    #[tokio::test]
    async fn test_delete_missing_row() {
        let store = MemoryParcelStore::new();
        assert!(!store.delete(ParcelId::new(1)).await.unwrap());
    }
}
