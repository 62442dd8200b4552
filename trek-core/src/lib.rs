pub mod models;
pub mod repository;
pub mod payment;
pub mod pii;

pub use models::{Booking, NewTrip, Trip, User};
pub use pii::Masked;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record already exists")]
    Conflict,
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
