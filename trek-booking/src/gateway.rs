use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use trek_core::payment::{merchant_reference, PaymentGateway, PaymentRecord, GATEWAY_SUCCESS};
use trek_store::app_config::{PaymentConfig, PaymentProvider};
use uuid::Uuid;

pub const CHECKOUT_PATH: &str = "/v1/checkout";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed gateway response: {0}")]
    Malformed(String),
    #[error("Gateway returned status {status} ({code}): {message}")]
    Rejected {
        status: String,
        code: String,
        message: String,
    },
    #[error("Request signing failed: {0}")]
    Signing(String),
}

/// Body of `POST /v1/checkout`.
#[derive(Debug, Serialize)]
struct CheckoutBody<'a> {
    amount: String,
    complete_payment_url: &'a str,
    country: &'a str,
    currency: &'a str,
    error_payment_url: &'a str,
    language: &'a str,
    merchant_reference_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: EnvelopeStatus,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeStatus {
    status: String,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Hosted-checkout client for a Rapyd-style gateway.
pub struct RapydGateway {
    client: reqwest::Client,
    config: PaymentConfig,
}

impl RapydGateway {
    pub fn new(config: PaymentConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(5)))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    async fn try_initiate(
        &self,
        amount: Decimal,
        reference: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        let body = CheckoutBody {
            amount: amount.to_string(),
            complete_payment_url: &self.config.complete_payment_url,
            country: &self.config.country,
            currency: &self.config.currency,
            error_payment_url: &self.config.error_payment_url,
            language: &self.config.language,
            merchant_reference_id: reference,
        };
        // The signature covers these exact bytes, so serialize once and send the string
        let body_json = serde_json::to_string(&body)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let salt = random_salt();
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign_request(
            &self.config.access_key,
            &self.config.secret_key,
            "post",
            CHECKOUT_PATH,
            &salt,
            timestamp,
            &body_json,
        )?;

        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), CHECKOUT_PATH);
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("access_key", &self.config.access_key)
            .header("salt", &salt)
            .header("timestamp", timestamp.to_string())
            .header("signature", signature)
            .header("idempotency", Uuid::new_v4().to_string())
            .body(body_json)
            .send()
            .await?;

        let http_status = response.status();
        // Error envelopes arrive with 4xx codes, so parse regardless of the HTTP status
        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(format!("HTTP {}: {}", http_status, e)))?;

        if envelope.status.status != GATEWAY_SUCCESS {
            return Err(GatewayError::Rejected {
                status: envelope.status.status,
                code: envelope.status.error_code.unwrap_or_default(),
                message: envelope.status.message.unwrap_or_default(),
            });
        }

        Ok(envelope.data.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl PaymentGateway for RapydGateway {
    async fn initiate(&self, amount: Decimal, user_id: i64, trip_id: i64) -> Option<PaymentRecord> {
        let reference = merchant_reference(user_id, trip_id, &nonce());

        match self.try_initiate(amount, &reference).await {
            Ok(data) => {
                info!("Checkout {} created for {} USD", reference, amount);
                Some(PaymentRecord {
                    merchant_reference: reference,
                    data,
                })
            }
            Err(e) => {
                warn!("Checkout {} failed: {}", reference, e);
                None
            }
        }
    }
}

/// `base64(hex(HMAC-SHA256(secret, method + path + salt + timestamp + access_key + secret + body)))`
pub fn sign_request(
    access_key: &str,
    secret_key: &str,
    method: &str,
    path: &str,
    salt: &str,
    timestamp: i64,
    body: &str,
) -> Result<String, GatewayError> {
    let to_sign = format!(
        "{}{}{}{}{}{}{}",
        method.to_lowercase(),
        path,
        salt,
        timestamp,
        access_key,
        secret_key,
        body
    );

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| GatewayError::Signing(e.to_string()))?;
    mac.update(to_sign.as_bytes());
    let digest = hex::encode(mac.finalize().into_bytes());

    Ok(base64::engine::general_purpose::STANDARD.encode(digest))
}

fn random_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

fn nonce() -> String {
    format!("{:08x}", rand::random::<u32>())
}

/// In-process gateway for local runs and tests.
pub struct MockPaymentGateway {
    succeed: bool,
    calls: AtomicUsize,
}

impl MockPaymentGateway {
    pub fn succeeding() -> Self {
        Self { succeed: true, calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { succeed: false, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initiate(&self, amount: Decimal, user_id: i64, trip_id: i64) -> Option<PaymentRecord> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = merchant_reference(user_id, trip_id, &nonce());

        if !self.succeed {
            warn!("Mock gateway declined checkout {}", reference);
            return None;
        }

        Some(PaymentRecord {
            data: serde_json::json!({
                "id": format!("checkout_mock_{}", call),
                "amount": amount.to_string(),
                "currency": "USD",
                "merchant_reference_id": reference,
                "status": "NEW",
            }),
            merchant_reference: reference,
        })
    }
}

pub fn build_gateway(config: &PaymentConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
    match config.provider {
        PaymentProvider::Rapyd => Ok(Arc::new(RapydGateway::new(config.clone())?)),
        PaymentProvider::Mock => {
            warn!("Using mock payment gateway; no real checkouts will be created");
            Ok(Arc::new(MockPaymentGateway::succeeding()))
        }
    }
}
