use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A registered account. Never serialized: the hash stays inside the process.
#[derive(Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"********")
            .finish()
    }
}

/// A bookable trip. Prices are USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Catalog entry before the store assigns it an id.
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

/// A committed booking. Proves payment was initiated, not captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub trip_id: i64,
    pub merchant_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trip_price_serializes_as_number() {
        let trip = Trip {
            id: 1,
            name: "trip 1".to_string(),
            description: Some("This is a nice place".to_string()),
            price: dec!(599.99),
        };

        let value = serde_json::to_value(&trip).unwrap();
        assert_eq!(value["price"], serde_json::json!(599.99));
        assert_eq!(value["name"], "trip 1");
    }

    #[test]
    fn test_user_debug_masks_hash() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
        };

        let rendered = format!("{:?}", user);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("argon2id"));
    }
}
