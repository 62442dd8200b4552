pub mod credentials;
pub mod gateway;
pub mod orchestrator;

pub use credentials::{CredentialError, CredentialService};
pub use gateway::{build_gateway, GatewayError, MockPaymentGateway, RapydGateway};
pub use orchestrator::{BookingConfirmation, BookingError, BookingOrchestrator, BookingRequest};
