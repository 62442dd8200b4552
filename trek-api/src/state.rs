use std::sync::Arc;
use trek_booking::{BookingOrchestrator, CredentialService};
use trek_core::payment::PaymentGateway;
use trek_core::repository::TripRepository;
use trek_store::app_config::AuthConfig;
use trek_store::{DbClient, StoreBookingRepository, StoreTripRepository, StoreUserRepository};

use crate::token::{TokenError, TokenService};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub credentials: Arc<CredentialService>,
    pub trips: Arc<dyn TripRepository>,
    pub bookings: Arc<BookingOrchestrator>,
}

impl AppState {
    /// Wires the stores, token service and orchestrator over one database.
    pub fn new(
        db: &DbClient,
        auth: &AuthConfig,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, TokenError> {
        let users = Arc::new(StoreUserRepository::new(db.pool.clone()));
        let trips = Arc::new(StoreTripRepository::new(db.pool.clone()));
        let bookings = Arc::new(StoreBookingRepository::new(db.pool.clone()));

        let tokens = TokenService::new(&auth.jwt_secret, auth.jwt_expiration_seconds)?;

        Ok(Self {
            tokens: Arc::new(tokens),
            credentials: Arc::new(CredentialService::new(users.clone())),
            trips: trips.clone(),
            bookings: Arc::new(BookingOrchestrator::new(users, trips, bookings, gateway)),
        })
    }
}
