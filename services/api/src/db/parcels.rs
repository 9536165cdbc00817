//! Postgres-backed parcel store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgPool, postgres::PgRow, Row};

use super::{DbError, ParcelStore};
use crate::parcel::{NewParcel, Parcel, ParcelId, ParcelPatch};

impl<'r> sqlx::FromRow<'r, PgRow> for Parcel {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: ParcelId::new(row.try_get("id")?),
            arrived_at: row.try_get("arrived_at")?,
            name: row.try_get("name")?,
            street: row.try_get("street")?,
            street_number: row.try_get("street_number")?,
            post_code: row.try_get("post_code")?,
            region: row.try_get("region")?,
            country: row.try_get("country")?,
            handed_out: row.try_get("handed_out")?,
        })
    }
}

/// Store for parcels in the `parcels` table.
#[derive(Clone)]
pub struct PgParcelStore {
    pool: PgPool,
}

impl PgParcelStore {
    /// Create a new parcel store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParcelStore for PgParcelStore {
    async fn create(&self, parcel: NewParcel) -> Result<Parcel, DbError> {
        sqlx::query_as::<_, Parcel>(
            r#"
            INSERT INTO parcels
                (arrived_at, name, street, street_number, post_code, region, country, handed_out)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, arrived_at, name, street, street_number, post_code, region, country, handed_out
            "#,
        )
        .bind(Utc::now())
        .bind(parcel.name)
        .bind(parcel.street)
        .bind(parcel.street_number)
        .bind(parcel.post_code)
        .bind(parcel.region)
        .bind(parcel.country)
        .bind(parcel.handed_out)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::Query)
    }

    async fn find_by_id(&self, id: ParcelId) -> Result<Option<Parcel>, DbError> {
        sqlx::query_as::<_, Parcel>(
            r#"
            SELECT id, arrived_at, name, street, street_number, post_code, region, country, handed_out
            FROM parcels
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::Query)
    }

    async fn list_all(&self) -> Result<Vec<Parcel>, DbError> {
        sqlx::query_as::<_, Parcel>(
            r#"
            SELECT id, arrived_at, name, street, street_number, post_code, region, country, handed_out
            FROM parcels
            ORDER BY arrived_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Query)
    }

    async fn update(&self, id: ParcelId, patch: ParcelPatch) -> Result<Option<Parcel>, DbError> {
        // NULL means "not present"; none of the columns are nullable.
        sqlx::query_as::<_, Parcel>(
            r#"
            UPDATE parcels
            SET name = COALESCE($2, name),
                street = COALESCE($3, street),
                street_number = COALESCE($4, street_number),
                post_code = COALESCE($5, post_code),
                region = COALESCE($6, region),
                country = COALESCE($7, country),
                handed_out = COALESCE($8, handed_out)
            WHERE id = $1
            RETURNING id, arrived_at, name, street, street_number, post_code, region, country, handed_out
            "#,
        )
        .bind(id.value())
        .bind(patch.name)
        .bind(patch.street)
        .bind(patch.street_number)
        .bind(patch.post_code)
        .bind(patch.region)
        .bind(patch.country)
        .bind(patch.handed_out)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::Query)
    }

    async fn delete(&self, id: ParcelId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM parcels WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(DbError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DbError::Query)?;
        Ok(())
    }
}
