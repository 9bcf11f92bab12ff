//! Renders domain errors as the canonical envelope.
//!
//! Failure-class errors (4xx) expose their message and details to the
//! client. Error-class faults (5xx) are logged with full context and the
//! response body carries only a generic message, so backend internals never
//! leak through the API.

use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, ErrorStatus};

const REDACTED_MESSAGE: &str = "an internal error occurred";

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let mut body = match status {
            ErrorStatus::Failure => {
                let mut body = json!({
                    "status": status.as_str(),
                    "message": self.message(),
                });
                if let Some(details) = self.details() {
                    body["details"] = details.clone();
                }
                body
            }
            ErrorStatus::Error => {
                error!(
                    code = ?self.code(),
                    message = self.message(),
                    trace_id = self.trace_id().unwrap_or("-"),
                    "request failed with server-side error"
                );
                json!({
                    "status": status.as_str(),
                    "message": REDACTED_MESSAGE,
                })
            }
        };
        if let Some(trace_id) = self.trace_id() {
            body["traceId"] = json!(trace_id);
        }
        let mut response = HttpResponse::build(self.status_code()).json(body);
        if let Some(trace_id) = self.trace_id() {
            if let Ok(value) = HeaderValue::from_str(trace_id) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static("trace-id"), value);
            }
        }
        response
    }
}

/// Maps JSON body deserialization failures onto the failure envelope so
/// malformed payloads never surface the framework's default error page.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}")).into()
}
