use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use trek_core::{NewTrip, Trip};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct TripsResponse {
    pub trips: Vec<Trip>,
}

#[derive(Debug, Serialize)]
struct SeedResponse {
    message: &'static str,
    inserted: u64,
}

/// Demo catalog installed by `/seed-trips`.
pub fn demo_trips() -> Vec<NewTrip> {
    vec![
        NewTrip {
            name: "trip 1".to_string(),
            description: Some("This is a nice place".to_string()),
            price: Decimal::new(59999, 2),
        },
        NewTrip {
            name: "trip 2".to_string(),
            description: Some("This is a nice place too".to_string()),
            price: Decimal::new(89999, 2),
        },
    ]
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/seed-trips", get(seed_trips))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/v1/trips", get(list_trips))
}

async fn list_trips(State(state): State<AppState>) -> Result<Json<TripsResponse>, AppError> {
    let trips = state.trips.list_trips().await?;
    Ok(Json(TripsResponse { trips }))
}

async fn seed_trips(State(state): State<AppState>) -> Result<Json<SeedResponse>, AppError> {
    let inserted = state.trips.seed_trips(&demo_trips()).await?;
    Ok(Json(SeedResponse { message: "Seeded!", inserted }))
}
