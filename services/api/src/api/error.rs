//! Problem-details error responses.

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    pub code: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ProblemDetails {
    fn new(status: StatusCode, code: impl Into<String>, detail: impl Into<String>) -> Self {
        let code = code.into();
        let title = status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_string();
        Self {
            r#type: format!("urn:parcel:problem:{code}"),
            title,
            status: status.as_u16(),
            detail: detail.into(),
            instance: None,
            code,
            request_id: "unknown".to_string(),
            details: None,
        }
    }

    fn set_request_id(&mut self, request_id: impl Into<String>) {
        let request_id = request_id.into();
        self.request_id = request_id.clone();
        if self.instance.is_none() {
            self.instance = Some(request_id);
        }
    }

    fn set_details(&mut self, details: Vec<FieldError>) {
        self.details = Some(details);
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub problem: Box<ProblemDetails>,
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        let status = StatusCode::BAD_REQUEST;
        let problem = Box::new(ProblemDetails::new(status, code, message));
        Self { status, problem }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        let status = StatusCode::NOT_FOUND;
        let problem = Box::new(ProblemDetails::new(status, code, message));
        Self { status, problem }
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let problem = Box::new(ProblemDetails::new(status, code, message));
        Self { status, problem }
    }

    /// A path id that is not a valid public id.
    pub fn invalid_id(entity: &str) -> Self {
        Self::bad_request("invalid_id", format!("Invalid {entity} id"))
    }

    /// A well-formed id with no matching row.
    pub fn resource_not_found(entity: &str) -> Self {
        let mut chars = entity.chars();
        let entity = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        Self::not_found("resource_not_found", format!("{entity} was not found"))
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::bad_request("invalid_body", message)
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.problem.set_request_id(request_id);
        self
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.problem.set_details(details);
        self
    }

    pub fn code(&self) -> &str {
        &self.problem.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.problem)).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_problem() {
        let err = ApiError::invalid_id("parcel");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_id");
        assert_eq!(err.problem.detail, "Invalid parcel id");
    }

    #[test]
    fn test_resource_not_found_problem() {
        let err = ApiError::resource_not_found("parcel");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.problem.detail, "Parcel was not found");
        assert_eq!(err.problem.title, "Not Found");
    }

    #[test]
    fn test_request_id_fills_instance() {
        let err = ApiError::internal("internal_error", "boom").with_request_id("req-1");
        assert_eq!(err.problem.request_id, "req-1");
        assert_eq!(err.problem.instance.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::invalid_body("bad")
            .with_details(vec![FieldError::new("name", "must not be empty")]);
        let json = serde_json::to_value(&*err.problem).unwrap();
        assert_eq!(json["type"], "urn:parcel:problem:invalid_body");
        assert_eq!(json["status"], 400);
        assert_eq!(json["details"][0]["field"], "name");
        assert!(json.get("instance").is_none());
    }

    #[test]
    fn test_problem_json_content_type() {
        let response = ApiError::invalid_id("parcel").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
    }
}
