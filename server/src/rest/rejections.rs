// server/src/rest/rejections.rs

use std::convert::Infallible;

use log::{error, warn};
use models::errors::SchedulingError;
use serde_json::json;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

/// A `SchedulingError` travelling through warp's rejection chain.
#[derive(Debug)]
pub struct ApiError(pub SchedulingError);

impl warp::reject::Reject for ApiError {}

pub fn reject_with(err: SchedulingError) -> Rejection {
    warp::reject::custom(ApiError(err))
}

pub fn status_for(err: &SchedulingError) -> StatusCode {
    match err {
        SchedulingError::Validation(_) | SchedulingError::Conflict(_) => StatusCode::BAD_REQUEST,
        SchedulingError::DuplicateEntry { .. } => StatusCode::CONFLICT,
        SchedulingError::NotFound(_) => StatusCode::NOT_FOUND,
        SchedulingError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        SchedulingError::Forbidden(_) => StatusCode::FORBIDDEN,
        SchedulingError::Upstream { status, .. } => status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        SchedulingError::Configuration(_) | SchedulingError::Storage(_) | SchedulingError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// JSON error body. Internal failures are logged in full and answered with a
/// generic message.
pub fn error_response(err: &SchedulingError) -> Response {
    let status = status_for(err);
    let body = match err {
        SchedulingError::DuplicateEntry { hora } => json!({
            "error": "duplicate booking detected",
            "type": "DUPLICATE_ENTRY",
            "hora": hora,
        }),
        SchedulingError::Upstream { .. } => json!({ "error": "external directory error" }),
        e if e.is_internal() => {
            error!("Request failed: {}", e);
            json!({ "error": "internal server error" })
        }
        e => json!({ "error": e.to_string() }),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

fn plain_error(message: &str, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status).into_response()
}

pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if let Some(ApiError(e)) = err.find::<ApiError>() {
        return Ok(error_response(e));
    }
    let response = if err.is_not_found() {
        plain_error("not found", StatusCode::NOT_FOUND)
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        warn!("Rejected request body: {}", e);
        plain_error("invalid request body", StatusCode::BAD_REQUEST)
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        plain_error("invalid query string", StatusCode::BAD_REQUEST)
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        plain_error("payload too large", StatusCode::PAYLOAD_TOO_LARGE)
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        plain_error("unsupported media type", StatusCode::UNSUPPORTED_MEDIA_TYPE)
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        plain_error("method not allowed", StatusCode::METHOD_NOT_ALLOWED)
    } else {
        error!("Unhandled rejection: {:?}", err);
        plain_error("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    };
    Ok(response)
}
