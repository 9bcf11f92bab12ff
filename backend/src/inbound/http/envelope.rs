//! Canonical response envelope helpers.
//!
//! Every JSON handler result is one of three shapes: a success envelope
//! (`{"status":"success","data":...}`), a failure envelope, or an error
//! envelope (both `{"status":...,"message":...}`, rendered by the domain
//! error's `ResponseError` impl). Binary responses bypass the envelope.

use actix_web::http::header;
use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

/// Success envelope with a data payload.
pub fn success<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "success",
        "data": data,
    }))
}

/// Success envelope with a data payload and a human-readable message.
pub fn success_with_message<T: Serialize>(data: T, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "success",
        "data": data,
        "message": message,
    }))
}

/// Binary PDF response delivered as a named attachment.
pub fn pdf_response(pdf: Vec<u8>, name: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}.pdf\""),
        ))
        .body(pdf)
}
