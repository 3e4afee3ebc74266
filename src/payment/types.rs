//! x402 payment types
//!
//! Wire types of the x402 protocol (version 1, `exact` scheme) plus the
//! server-side payment configuration.

use std::str::FromStr;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Protocol version spoken by this server
pub const X402_VERSION: u32 = 1;

/// Payment scheme accepted by this server
pub const EXACT_SCHEME: &str = "exact";

/// USDC uses 6 decimals on every supported network
const USDC_DECIMALS: usize = 6;
const USDC_UNIT: u64 = 1_000_000;

/// Supported settlement networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Base,
    BaseSepolia,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::BaseSepolia => "base-sepolia",
        }
    }

    /// USDC contract address on this network
    pub fn usdc_address(&self) -> &'static str {
        match self {
            Self::Base => "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
            Self::BaseSepolia => "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
        }
    }

    /// EIP-712 domain (name, version) of the USDC contract
    pub fn usdc_domain(&self) -> (&'static str, &'static str) {
        match self {
            Self::Base => ("USD Coin", "2"),
            Self::BaseSepolia => ("USDC", "2"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "base-sepolia" => Ok(Self::BaseSepolia),
            other => Err(format!("unsupported network '{}'", other)),
        }
    }
}

/// Server-side payment configuration, built once at startup
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Address receiving payments
    pub pay_to: String,
    /// Settlement network
    pub network: Network,
    /// Price per call in USDC atomic units
    pub price_atomic: u64,
    /// Facilitator base URL (verify/settle)
    pub facilitator_url: String,
    /// How long a signed payment stays valid
    pub max_timeout_seconds: u64,
}

/// Convert a `"$0.01"`-style price into USDC atomic units
pub fn parse_usd_price(price: &str) -> Result<u64, String> {
    let trimmed = price.trim();
    let amount = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(format!("'{}' is not a dollar amount", price));
    }
    if frac.len() > USDC_DECIMALS {
        return Err(format!(
            "'{}' has more than {} decimal places",
            price, USDC_DECIMALS
        ));
    }

    let whole_units: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|e| format!("'{}': {}", price, e))?
    };
    let frac_units: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = USDC_DECIMALS)
            .parse()
            .map_err(|e| format!("'{}': {}", price, e))?
    };

    let total = whole_units
        .checked_mul(USDC_UNIT)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(|| format!("'{}' is too large", price))?;

    if total == 0 {
        return Err("price must be greater than zero".to_string());
    }
    Ok(total)
}

/// What a client must pay to access a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: Network,
    /// Amount in atomic units, as a decimal string
    pub max_amount_required: String,
    pub resource: String,
    pub description: String,
    pub mime_type: String,
    pub pay_to: String,
    pub max_timeout_seconds: u64,
    /// Token contract address
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// Decoded `X-PAYMENT` header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: u32,
    pub scheme: String,
    pub network: String,
    /// Scheme-specific signed authorization
    pub payload: serde_json::Value,
}

/// Body of a 402 response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredResponse {
    pub x402_version: u32,
    pub error: String,
    pub accepts: Vec<PaymentRequirements>,
}

/// Facilitator `/verify` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(default)]
    pub invalid_reason: Option<String>,
    #[serde(default)]
    pub payer: Option<String>,
}

/// Facilitator `/settle` response, echoed back in `X-PAYMENT-RESPONSE`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    #[serde(default)]
    pub transaction: String,
    #[serde(default)]
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Payment errors
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("X-PAYMENT header is required")]
    MissingHeader,

    #[error("Malformed X-PAYMENT header: {0}")]
    MalformedHeader(String),

    #[error("Payment does not match requirements: {0}")]
    Mismatch(String),

    #[error("Payment rejected: {0}")]
    Invalid(String),

    #[error("Payment settlement failed: {0}")]
    SettlementFailed(String),

    #[error("Facilitator error: {0}")]
    Facilitator(String),
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Facilitator(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::PAYMENT_REQUIRED,
        }
    }
}
