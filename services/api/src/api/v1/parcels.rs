//! Parcel API endpoints.
//!
//! Rows are addressed by their public id; the integer key never leaves the
//! server.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use parcel_id::PublicIdCodec;
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::error::{ApiError, FieldError};
use crate::api::extract::ApiJson;
use crate::api::request_context::RequestContext;
use crate::db::DbError;
use crate::parcel::{NewParcel, Parcel, ParcelId, ParcelPatch};
use crate::state::AppState;

const ENTITY: &str = "parcel";

/// Create parcel routes.
///
/// Mounted at /api/v1/parcel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_parcels).put(create_parcel))
        .route(
            "/{id}",
            get(get_parcel).patch(update_parcel).delete(delete_parcel),
        )
        .route("/{id}/label", get(get_label))
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request to create a parcel. Every field is required.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParcelRequest {
    pub name: String,
    pub street: String,
    pub street_number: i32,
    pub post_code: i32,
    pub region: String,
    pub country: String,
    pub handed_out: bool,
}

/// Partial update. Absent fields are left alone; `null` is rejected.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParcelRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub street_number: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub post_code: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub handed_out: Option<bool>,
}

/// Deserializes a field that, when present, must hold a value of `T`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A parcel as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelResponse {
    /// Public id.
    pub id: String,
    pub arrived_at: DateTime<Utc>,
    pub name: String,
    pub street: String,
    pub street_number: i32,
    pub post_code: i32,
    pub region: String,
    pub country: String,
    pub handed_out: bool,
}

impl ParcelResponse {
    pub fn from_parcel(parcel: &Parcel, codec: &PublicIdCodec) -> Self {
        Self {
            id: parcel.id.to_public(codec),
            arrived_at: parcel.arrived_at,
            name: parcel.name.clone(),
            street: parcel.street.clone(),
            street_number: parcel.street_number,
            post_code: parcel.post_code,
            region: parcel.region.clone(),
            country: parcel.country.clone(),
            handed_out: parcel.handed_out,
        }
    }
}

impl CreateParcelRequest {
    fn validate(&self) -> Vec<FieldError> {
        [
            ("name", &self.name),
            ("street", &self.street),
            ("region", &self.region),
            ("country", &self.country),
        ]
        .into_iter()
        .filter_map(|(field, value)| check_text(field, Some(value)))
        .collect()
    }
}

impl UpdateParcelRequest {
    fn validate(&self) -> Vec<FieldError> {
        [
            ("name", self.name.as_ref()),
            ("street", self.street.as_ref()),
            ("region", self.region.as_ref()),
            ("country", self.country.as_ref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| check_text(field, value))
        .collect()
    }
}

impl From<CreateParcelRequest> for NewParcel {
    fn from(req: CreateParcelRequest) -> Self {
        Self {
            name: req.name,
            street: req.street,
            street_number: req.street_number,
            post_code: req.post_code,
            region: req.region,
            country: req.country,
            handed_out: req.handed_out,
        }
    }
}

impl From<UpdateParcelRequest> for ParcelPatch {
    fn from(req: UpdateParcelRequest) -> Self {
        Self {
            name: req.name,
            street: req.street,
            street_number: req.street_number,
            post_code: req.post_code,
            region: req.region,
            country: req.country,
            handed_out: req.handed_out,
        }
    }
}

fn check_text(field: &str, value: Option<&String>) -> Option<FieldError> {
    match value {
        Some(value) if value.trim().is_empty() => {
            Some(FieldError::new(field, "must not be empty"))
        }
        _ => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List all parcels, newest arrival first.
///
/// GET /api/v1/parcel
async fn list_parcels(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<ParcelResponse>>, ApiError> {
    let parcels = state
        .store()
        .list_all()
        .await
        .map_err(|e| store_error(e, &ctx.request_id))?;

    let items = parcels
        .iter()
        .map(|parcel| ParcelResponse::from_parcel(parcel, state.codec()))
        .collect();

    Ok(Json(items))
}

/// Create a parcel.
///
/// PUT /api/v1/parcel
async fn create_parcel(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<CreateParcelRequest>,
) -> Result<StatusCode, ApiError> {
    let errors = req.validate();
    if !errors.is_empty() {
        return Err(ApiError::invalid_body("Request body failed validation")
            .with_details(errors)
            .with_request_id(ctx.request_id));
    }

    let parcel = state
        .store()
        .create(req.into())
        .await
        .map_err(|e| store_error(e, &ctx.request_id))?;

    tracing::info!(
        request_id = %ctx.request_id,
        parcel_id = %parcel.id,
        "Parcel created"
    );

    Ok(StatusCode::CREATED)
}

/// Get a parcel.
///
/// GET /api/v1/parcel/{id}
async fn get_parcel(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(public_id): Path<String>,
) -> Result<Json<ParcelResponse>, ApiError> {
    let parcel = load(&state, &ctx, &public_id).await?;
    Ok(Json(ParcelResponse::from_parcel(&parcel, state.codec())))
}

/// Update the fields present in the body.
///
/// PATCH /api/v1/parcel/{id}
async fn update_parcel(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(public_id): Path<String>,
    ApiJson(req): ApiJson<UpdateParcelRequest>,
) -> Result<StatusCode, ApiError> {
    let id = decode_id(&state, &ctx, &public_id)?;

    let errors = req.validate();
    if !errors.is_empty() {
        return Err(ApiError::invalid_body("Request body failed validation")
            .with_details(errors)
            .with_request_id(ctx.request_id));
    }

    let updated = state
        .store()
        .update(id, req.into())
        .await
        .map_err(|e| store_error(e, &ctx.request_id))?;

    match updated {
        Some(parcel) => {
            tracing::info!(
                request_id = %ctx.request_id,
                parcel_id = %parcel.id,
                "Parcel updated"
            );
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::resource_not_found(ENTITY).with_request_id(ctx.request_id)),
    }
}

/// Delete a parcel.
///
/// DELETE /api/v1/parcel/{id}
async fn delete_parcel(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(public_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = decode_id(&state, &ctx, &public_id)?;

    let deleted = state
        .store()
        .delete(id)
        .await
        .map_err(|e| store_error(e, &ctx.request_id))?;

    if !deleted {
        return Err(ApiError::resource_not_found(ENTITY).with_request_id(ctx.request_id));
    }

    tracing::info!(request_id = %ctx.request_id, parcel_id = %id, "Parcel deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Render the printable label.
///
/// GET /api/v1/parcel/{id}/label
async fn get_label(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(public_id): Path<String>,
) -> Result<Response, ApiError> {
    let parcel = load(&state, &ctx, &public_id).await?;
    let public_id = parcel.id.to_public(state.codec());

    let pdf = parcel_label::render(&parcel_label::Label {
        public_id: &public_id,
        name: &parcel.name,
        arrived_at: parcel.arrived_at,
    })
    .map_err(|e| {
        tracing::error!(
            error = %e,
            request_id = %ctx.request_id,
            parcel_id = %parcel.id,
            "Failed to render label"
        );
        ApiError::internal("internal_error", "Failed to render label")
            .with_request_id(ctx.request_id.clone())
    })?;

    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{public_id}.pdf\""))
        .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

// =============================================================================
// Helpers
// =============================================================================

fn decode_id(state: &AppState, ctx: &RequestContext, public_id: &str) -> Result<ParcelId, ApiError> {
    ParcelId::from_public(state.codec(), public_id).ok_or_else(|| {
        tracing::debug!(request_id = %ctx.request_id, public_id, "Undecodable parcel id");
        ApiError::invalid_id(ENTITY).with_request_id(ctx.request_id.clone())
    })
}

async fn load(state: &AppState, ctx: &RequestContext, public_id: &str) -> Result<Parcel, ApiError> {
    let id = decode_id(state, ctx, public_id)?;

    state
        .store()
        .find_by_id(id)
        .await
        .map_err(|e| store_error(e, &ctx.request_id))?
        .ok_or_else(|| ApiError::resource_not_found(ENTITY).with_request_id(ctx.request_id.clone()))
}

fn store_error(e: DbError, request_id: &str) -> ApiError {
    tracing::error!(error = %e, request_id = %request_id, "Parcel store operation failed");
    ApiError::internal("internal_error", "Internal server error").with_request_id(request_id)
}
