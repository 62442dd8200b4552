use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use trek_core::payment::PaymentGateway;
use trek_core::repository::{BookingRepository, TripRepository, UserRepository};
use trek_core::{Booking, StoreError, User};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Trip is required to make a booking")]
    MissingTrip,
    #[error("Authenticated user {0} no longer exists")]
    UnknownUser(String),
    #[error("user_id {requested} does not belong to the authenticated user")]
    IdentityMismatch { requested: i64 },
    #[error("Trip {0} not found")]
    TripNotFound(i64),
    #[error("Failed to create payment")]
    PaymentFailed,
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub trip_id: Option<i64>,
    /// Optional; when present it must match the token's user.
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub payment_response: serde_json::Value,
}

/// Turns an authenticated booking request into a committed ledger row.
///
/// Callers have already verified the bearer token; `username` is the identity it
/// carried. Nothing is written unless the gateway accepted the checkout.
pub struct BookingOrchestrator {
    users: Arc<dyn UserRepository>,
    trips: Arc<dyn TripRepository>,
    bookings: Arc<dyn BookingRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl BookingOrchestrator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        trips: Arc<dyn TripRepository>,
        bookings: Arc<dyn BookingRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self { users, trips, bookings, gateway }
    }

    pub async fn book(
        &self,
        username: &str,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, BookingError> {
        // Trip ids start at 1; a zero id is as good as none
        let trip_id = request
            .trip_id
            .filter(|id| *id != 0)
            .ok_or(BookingError::MissingTrip)?;

        let user = self.resolve_user(username).await?;
        if let Some(requested) = request.user_id {
            if requested != user.id {
                warn!("User {} tried to book on behalf of user_id {}", username, requested);
                return Err(BookingError::IdentityMismatch { requested });
            }
        }

        let trip = self
            .trips
            .get_trip(trip_id)
            .await?
            .ok_or(BookingError::TripNotFound(trip_id))?;

        let payment = self
            .gateway
            .initiate(trip.price, user.id, trip.id)
            .await
            .ok_or(BookingError::PaymentFailed)?;

        let booking = self
            .bookings
            .create_booking(user.id, trip.id, &payment.merchant_reference)
            .await?;

        info!(
            "Booking {} committed: user {} trip {} ref {}",
            booking.id, user.id, trip.id, payment.merchant_reference
        );

        Ok(BookingConfirmation {
            booking,
            payment_response: payment.data,
        })
    }

    pub async fn list_for(&self, username: &str) -> Result<Vec<Booking>, BookingError> {
        let user = self.resolve_user(username).await?;
        Ok(self.bookings.list_bookings(user.id).await?)
    }

    async fn resolve_user(&self, username: &str) -> Result<User, BookingError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| BookingError::UnknownUser(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockPaymentGateway;
    use rust_decimal_macros::dec;
    use trek_core::NewTrip;
    use trek_store::{DbClient, StoreBookingRepository, StoreTripRepository, StoreUserRepository};

    struct Fixture {
        orchestrator: BookingOrchestrator,
        bookings: Arc<StoreBookingRepository>,
        gateway: Arc<MockPaymentGateway>,
        user_id: i64,
    }

    async fn fixture(gateway: MockPaymentGateway) -> Fixture {
        let db = DbClient::in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let users = Arc::new(StoreUserRepository::new(db.pool.clone()));
        let user_id = users.create_user("alice", "hash").await.unwrap();

        let trips = Arc::new(StoreTripRepository::new(db.pool.clone()));
        trips
            .seed_trips(&[NewTrip { name: "trip 1".into(), description: None, price: dec!(599.99) }])
            .await
            .unwrap();

        let bookings = Arc::new(StoreBookingRepository::new(db.pool.clone()));
        let gateway = Arc::new(gateway);

        Fixture {
            orchestrator: BookingOrchestrator::new(users, trips, bookings.clone(), gateway.clone()),
            bookings,
            gateway,
            user_id,
        }
    }

    fn request(trip_id: Option<i64>, user_id: Option<i64>) -> BookingRequest {
        BookingRequest { trip_id, user_id }
    }

    #[tokio::test]
    async fn test_successful_booking_commits_row() {
        let f = fixture(MockPaymentGateway::succeeding()).await;

        let confirmation = f.orchestrator.book("alice", &request(Some(1), Some(f.user_id))).await.unwrap();
        assert_eq!(confirmation.booking.user_id, f.user_id);
        assert_eq!(confirmation.booking.trip_id, 1);
        assert_eq!(confirmation.payment_response["amount"], "599.99");

        let stored = f.bookings.list_bookings(f.user_id).await.unwrap();
        assert_eq!(stored, vec![confirmation.booking]);
    }

    #[tokio::test]
    async fn test_body_user_id_is_optional() {
        let f = fixture(MockPaymentGateway::succeeding()).await;
        let confirmation = f.orchestrator.book("alice", &request(Some(1), None)).await.unwrap();
        assert_eq!(confirmation.booking.user_id, f.user_id);
    }

    #[tokio::test]
    async fn test_missing_trip_is_rejected_before_payment() {
        let f = fixture(MockPaymentGateway::succeeding()).await;

        let err = f.orchestrator.book("alice", &request(None, None)).await.unwrap_err();
        assert!(matches!(err, BookingError::MissingTrip));
        assert_eq!(f.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_trip_id_counts_as_missing() {
        let f = fixture(MockPaymentGateway::succeeding()).await;

        let err = f.orchestrator.book("alice", &request(Some(0), None)).await.unwrap_err();
        assert!(matches!(err, BookingError::MissingTrip));
        assert_eq!(f.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_trip_writes_nothing() {
        let f = fixture(MockPaymentGateway::succeeding()).await;

        let err = f.orchestrator.book("alice", &request(Some(99), None)).await.unwrap_err();
        assert!(matches!(err, BookingError::TripNotFound(99)));
        assert_eq!(f.gateway.calls(), 0);
        assert!(f.bookings.list_bookings(f.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_payment_never_writes_even_on_retry() {
        let f = fixture(MockPaymentGateway::failing()).await;

        for _ in 0..3 {
            let err = f.orchestrator.book("alice", &request(Some(1), None)).await.unwrap_err();
            assert!(matches!(err, BookingError::PaymentFailed));
        }

        assert_eq!(f.gateway.calls(), 3);
        assert!(f.bookings.list_bookings(f.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_user_id_is_refused() {
        let f = fixture(MockPaymentGateway::succeeding()).await;

        let err = f.orchestrator.book("alice", &request(Some(1), Some(f.user_id + 1))).await.unwrap_err();
        assert!(matches!(err, BookingError::IdentityMismatch { .. }));
        assert_eq!(f.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_refused() {
        let f = fixture(MockPaymentGateway::succeeding()).await;

        let err = f.orchestrator.book("ghost", &request(Some(1), None)).await.unwrap_err();
        assert!(matches!(err, BookingError::UnknownUser(_)));
    }

    #[tokio::test]
    async fn test_list_for_returns_own_bookings() {
        let f = fixture(MockPaymentGateway::succeeding()).await;
        f.orchestrator.book("alice", &request(Some(1), None)).await.unwrap();
        f.orchestrator.book("alice", &request(Some(1), None)).await.unwrap();

        assert_eq!(f.orchestrator.list_for("alice").await.unwrap().len(), 2);
    }
}
