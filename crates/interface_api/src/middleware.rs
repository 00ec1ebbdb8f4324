//! API middleware

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use core_kernel::OperationMetadata;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header naming the console operator, if the gateway forwards it
pub const OPERATOR_HEADER: &str = "x-operator-id";

/// Audit logging middleware
///
/// Logs every API request with its correlation id, outcome and duration.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = header_value(request.headers(), REQUEST_ID_HEADER)
        .unwrap_or_else(|| "-".to_string());
    let operator = header_value(request.headers(), OPERATOR_HEADER)
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    if status.is_server_error() {
        warn!(
            method = %method,
            uri = %uri,
            request_id = %request_id,
            operator = %operator,
            status = %status.as_u16(),
            duration_ms = duration.num_milliseconds(),
            "API request failed"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            request_id = %request_id,
            operator = %operator,
            status = %status.as_u16(),
            duration_ms = duration.num_milliseconds(),
            "API request"
        );
    }

    response
}

/// Port call metadata derived from request headers
pub fn operation_metadata(headers: &HeaderMap) -> Option<OperationMetadata> {
    let request_id = header_value(headers, REQUEST_ID_HEADER);
    let operator = header_value(headers, OPERATOR_HEADER);
    if request_id.is_none() && operator.is_none() {
        return None;
    }

    Some(OperationMetadata {
        correlation_id: request_id,
        initiated_by: operator,
        ..Default::default()
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}
