use async_trait::async_trait;

use crate::models::{Booking, NewTrip, Trip, User};
use crate::StoreResult;

/// Repository trait for user credentials
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; `StoreError::Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<i64>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
}

/// Repository trait for the trip catalog
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn list_trips(&self) -> StoreResult<Vec<Trip>>;

    async fn get_trip(&self, id: i64) -> StoreResult<Option<Trip>>;

    /// Insert each trip whose name is not already present. Returns how many were inserted.
    async fn seed_trips(&self, trips: &[NewTrip]) -> StoreResult<u64>;
}

/// Repository trait for the booking ledger
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(
        &self,
        user_id: i64,
        trip_id: i64,
        merchant_reference: &str,
    ) -> StoreResult<Booking>;

    async fn list_bookings(&self, user_id: i64) -> StoreResult<Vec<Booking>>;
}
