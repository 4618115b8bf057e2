//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Auth token responses
//! are the exception and are returned bare.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
