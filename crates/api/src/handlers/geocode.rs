//! Free-text address geocoding, used by the add-restaurant form before the
//! favorite exists.

use axum::extract::State;
use axum::Json;
use mineruca_core::error::CoreError;
use mineruca_core::restaurant::Coordinates;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub address: String,
    /// `None` when the address could not be resolved.
    pub coordinates: Option<Coordinates>,
}

/// POST /api/v1/geocode
pub async fn geocode(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(input): Json<GeocodeRequest>,
) -> AppResult<Json<DataResponse<GeocodeResponse>>> {
    let address = input.address.trim();
    if address.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Address must not be empty".into(),
        )));
    }

    let coordinates = state.geocoder.geocode(address).await?;
    Ok(Json(DataResponse {
        data: GeocodeResponse {
            address: address.to_string(),
            coordinates,
        },
    }))
}
