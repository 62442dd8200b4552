use async_trait::async_trait;
use sqlx::SqlitePool;
use trek_core::repository::BookingRepository;
use trek_core::{Booking, StoreResult};
use tracing::info;

use crate::store_error;

pub struct StoreBookingRepository {
    pool: SqlitePool,
}

impl StoreBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    user_id: i64,
    trip_id: i64,
    merchant_reference: Option<String>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            trip_id: row.trip_id,
            merchant_reference: row.merchant_reference,
        }
    }
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_booking(
        &self,
        user_id: i64,
        trip_id: i64,
        merchant_reference: &str,
    ) -> StoreResult<Booking> {
        // Dropping an uncommitted transaction rolls it back
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let result = sqlx::query(
            "INSERT INTO bookings (user_id, trip_id, merchant_reference) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(trip_id)
        .bind(merchant_reference)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        let booking = Booking {
            id: result.last_insert_rowid(),
            user_id,
            trip_id,
            merchant_reference: Some(merchant_reference.to_string()),
        };
        info!("Booking {} stored for user {} trip {}", booking.id, user_id, trip_id);
        Ok(booking)
    }

    async fn list_bookings(&self, user_id: i64) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT id, user_id, trip_id, merchant_reference FROM bookings WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbClient, StoreTripRepository, StoreUserRepository};
    use rust_decimal_macros::dec;
    use trek_core::repository::{TripRepository, UserRepository};
    use trek_core::{NewTrip, StoreError};

    async fn setup() -> (StoreBookingRepository, i64, i64) {
        let db = DbClient::in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let users = StoreUserRepository::new(db.pool.clone());
        let user_id = users.create_user("alice", "hash").await.unwrap();

        let trips = StoreTripRepository::new(db.pool.clone());
        trips
            .seed_trips(&[NewTrip { name: "trip 1".into(), description: None, price: dec!(10) }])
            .await
            .unwrap();

        (StoreBookingRepository::new(db.pool), user_id, 1)
    }

    #[tokio::test]
    async fn test_double_booking_is_allowed() {
        let (repo, user_id, trip_id) = setup().await;

        let first = repo.create_booking(user_id, trip_id, "booking_1_1_a").await.unwrap();
        let second = repo.create_booking(user_id, trip_id, "booking_1_1_b").await.unwrap();
        assert_ne!(first.id, second.id);

        let bookings = repo.list_bookings(user_id).await.unwrap();
        assert_eq!(bookings, vec![first, second]);
    }

    #[tokio::test]
    async fn test_unknown_trip_is_rejected_and_nothing_stored() {
        let (repo, user_id, _) = setup().await;

        let err = repo.create_booking(user_id, 42, "booking_1_42_a").await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert!(repo.list_bookings(user_id).await.unwrap().is_empty());
    }
}
