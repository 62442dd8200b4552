use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status sentinel the gateway uses for a successful call.
pub const GATEWAY_SUCCESS: &str = "SUCCESS";

/// Outcome of a successful payment initiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub merchant_reference: String,
    /// Gateway `data` payload, passed through to the caller untouched.
    pub data: serde_json::Value,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Ask the gateway to start a checkout for `amount` USD.
    ///
    /// Never fails loudly: any transport, timeout, or non-success answer is
    /// logged by the implementation and reported as `None`.
    async fn initiate(&self, amount: Decimal, user_id: i64, trip_id: i64) -> Option<PaymentRecord>;
}

/// `booking_<user>_<trip>_<nonce>`. The nonce keeps retries of the same pair apart.
pub fn merchant_reference(user_id: i64, trip_id: i64, nonce: &str) -> String {
    format!("booking_{}_{}_{}", user_id, trip_id, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_reference_format() {
        assert_eq!(merchant_reference(1, 2, "ab12cd34"), "booking_1_2_ab12cd34");
    }
}
