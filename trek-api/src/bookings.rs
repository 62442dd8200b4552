use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use trek_booking::BookingRequest;
use trek_core::Booking;

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct BookingResponse {
    message: &'static str,
    booking_id: i64,
    payment_response: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct BookingsResponse {
    bookings: Vec<Booking>,
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/v1/bookings", post(create_booking).get(list_bookings))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let confirmation = state.bookings.book(&user.username, &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            message: "Booking successful",
            booking_id: confirmation.booking.id,
            payment_response: confirmation.payment_response,
        }),
    ))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<BookingsResponse>, AppError> {
    let bookings = state.bookings.list_for(&user.username).await?;
    Ok(Json(BookingsResponse { bookings }))
}
