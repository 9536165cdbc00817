//! Body extractors that reject with problem details.

use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::api::request_context::REQUEST_ID_HEADER;

/// JSON body extractor.
///
/// Like [`axum::Json`], but every rejection (wrong content type, malformed
/// JSON, schema mismatch) becomes a 400 `invalid_body` problem.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(request_id = %request_id, error = %rejection, "Rejected request body");
                Err(ApiError::invalid_body(rejection_message(&rejection))
                    .with_request_id(request_id))
            }
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        other => other.body_text(),
    }
}
