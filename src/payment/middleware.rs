//! x402 payment gate
//!
//! Axum middleware guarding paid routes:
//!
//! ```text
//! request ──► X-PAYMENT? ──no──► 402 + requirements
//!                 │yes
//!                 ▼
//!          decode + match ──fail──► 402
//!                 │
//!                 ▼
//!          facilitator /verify ──invalid──► 402
//!                 │valid
//!                 ▼
//!              handler ──non-2xx──► response (not settled)
//!                 │2xx
//!                 ▼
//!          facilitator /settle ──fail──► 402
//!                 │
//!                 ▼
//!      response + X-PAYMENT-RESPONSE
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;

use super::facilitator::PaymentVerifier;
use super::types::{
    PaymentConfig, PaymentError, PaymentPayload, PaymentRequiredResponse, PaymentRequirements,
    EXACT_SCHEME, X402_VERSION,
};

pub const X_PAYMENT: &str = "x-payment";
pub const X_PAYMENT_RESPONSE: &str = "x-payment-response";

const DESCRIPTION: &str = "Extract text from an uploaded PDF document";

/// Shared state of the payment middleware
#[derive(Clone)]
pub struct PaymentGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    config: PaymentConfig,
    verifier: Arc<dyn PaymentVerifier>,
}

impl PaymentGate {
    pub fn new(config: PaymentConfig, verifier: Arc<dyn PaymentVerifier>) -> Self {
        Self {
            inner: Arc::new(GateInner { config, verifier }),
        }
    }

    /// Payment requirements for a resource path
    pub fn requirements(&self, resource: &str) -> PaymentRequirements {
        let config = &self.inner.config;
        let (name, version) = config.network.usdc_domain();

        PaymentRequirements {
            scheme: EXACT_SCHEME.to_string(),
            network: config.network,
            max_amount_required: config.price_atomic.to_string(),
            resource: resource.to_string(),
            description: DESCRIPTION.to_string(),
            mime_type: "application/json".to_string(),
            pay_to: config.pay_to.clone(),
            max_timeout_seconds: config.max_timeout_seconds,
            asset: config.network.usdc_address().to_string(),
            extra: Some(serde_json::json!({ "name": name, "version": version })),
        }
    }

    fn reject(&self, requirements: PaymentRequirements, error: PaymentError) -> Response {
        tracing::warn!(resource = %requirements.resource, "Payment rejected: {}", error);

        let body = Json(PaymentRequiredResponse {
            x402_version: X402_VERSION,
            error: error.to_string(),
            accepts: vec![requirements],
        });

        (error.status_code(), body).into_response()
    }
}

/// Middleware requiring a valid x402 payment before the handler runs
pub async fn require_payment(
    State(gate): State<PaymentGate>,
    request: Request,
    next: Next,
) -> Response {
    let requirements = gate.requirements(request.uri().path());

    let payload = match decode_payment_header(request.headers())
        .and_then(|p| check_matches(&p, &requirements).map(|_| p))
    {
        Ok(payload) => payload,
        Err(e) => return gate.reject(requirements, e),
    };

    match gate.inner.verifier.verify(&payload, &requirements).await {
        Ok(verified) if verified.is_valid => {
            tracing::debug!(payer = ?verified.payer, "Payment verified");
        }
        Ok(verified) => {
            let reason = verified
                .invalid_reason
                .unwrap_or_else(|| "payment is not valid".to_string());
            return gate.reject(requirements, PaymentError::Invalid(reason));
        }
        Err(e) => return gate.reject(requirements, e),
    }

    let mut response = next.run(request).await;

    // Only charge for work that was delivered
    if !response.status().is_success() {
        return response;
    }

    match gate.inner.verifier.settle(&payload, &requirements).await {
        Ok(settled) if settled.success => {
            tracing::info!(
                transaction = %settled.transaction,
                network = %settled.network,
                "Payment settled"
            );
            if let Some(value) = encode_settlement(&settled) {
                response.headers_mut().insert(X_PAYMENT_RESPONSE, value);
            }
            response
        }
        Ok(settled) => {
            let reason = settled
                .error_reason
                .unwrap_or_else(|| "settlement was not successful".to_string());
            gate.reject(requirements, PaymentError::SettlementFailed(reason))
        }
        Err(e) => gate.reject(requirements, e),
    }
}

/// Decode the base64 JSON `X-PAYMENT` header
pub fn decode_payment_header(headers: &HeaderMap) -> Result<PaymentPayload, PaymentError> {
    let raw = headers
        .get(X_PAYMENT)
        .ok_or(PaymentError::MissingHeader)?
        .to_str()
        .map_err(|e| PaymentError::MalformedHeader(e.to_string()))?;

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(raw.trim())
        .map_err(|e| PaymentError::MalformedHeader(format!("invalid base64: {}", e)))?;

    serde_json::from_slice(&decoded)
        .map_err(|e| PaymentError::MalformedHeader(format!("invalid payload: {}", e)))
}

fn check_matches(
    payload: &PaymentPayload,
    requirements: &PaymentRequirements,
) -> Result<(), PaymentError> {
    if payload.x402_version != X402_VERSION {
        return Err(PaymentError::Mismatch(format!(
            "unsupported x402 version {}",
            payload.x402_version
        )));
    }
    if payload.scheme != requirements.scheme {
        return Err(PaymentError::Mismatch(format!(
            "scheme '{}' not accepted",
            payload.scheme
        )));
    }
    if payload.network != requirements.network.as_str() {
        return Err(PaymentError::Mismatch(format!(
            "network '{}' not accepted, expected '{}'",
            payload.network,
            requirements.network.as_str()
        )));
    }
    Ok(())
}

fn encode_settlement(settled: &super::types::SettleResponse) -> Option<HeaderValue> {
    let json = serde_json::to_vec(settled).ok()?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(json);
    HeaderValue::from_str(&encoded).ok()
}
