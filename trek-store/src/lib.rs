pub mod app_config;
pub mod database;
pub mod user_repo;
pub mod trip_repo;
pub mod booking_repo;

pub use database::DbClient;
pub use user_repo::StoreUserRepository;
pub use trip_repo::StoreTripRepository;
pub use booking_repo::StoreBookingRepository;

use trek_core::StoreError;

/// Maps sqlx failures onto the storage taxonomy, surfacing unique violations as conflicts.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    StoreError::Database(err.to_string())
}
