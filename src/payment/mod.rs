//! x402 Micropayments
//!
//! Per-call payment gate for paid routes. The server advertises its price with
//! a `402 Payment Required` response; clients retry with a signed `X-PAYMENT`
//! header which is verified and settled through a facilitator service.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//! use pdf_extract_api::payment::{FacilitatorClient, PaymentGate, require_payment};
//!
//! let verifier = Arc::new(FacilitatorClient::new(&config.payment.facilitator_url));
//! let gate = PaymentGate::new(config.payment.clone(), verifier);
//!
//! let paid = Router::new()
//!     .route("/extract", post(extract))
//!     .route_layer(from_fn_with_state(gate, require_payment));
//! ```

mod facilitator;
mod middleware;
mod types;

pub use facilitator::{FacilitatorClient, PaymentVerifier};
pub use middleware::{decode_payment_header, require_payment, PaymentGate, X_PAYMENT, X_PAYMENT_RESPONSE};
pub use types::{
    parse_usd_price, Network, PaymentConfig, PaymentError, PaymentPayload,
    PaymentRequiredResponse, PaymentRequirements, SettleResponse, VerifyResponse, EXACT_SCHEME,
    X402_VERSION,
};
