//! Request types for the Zivra Pay gateway API.
//!
//! This module contains the data structures sent to the gateway, including
//! plaintext card fields (encrypted before transmission) and the request
//! bodies for USSD, status, and card operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Result, ZivraError};

/// Plaintext card details supplied by the cardholder.
///
/// Never sent to the gateway directly: [`CardEncryptor`](crate::encryption::CardEncryptor)
/// serializes this struct to JSON and RSA-encrypts it first. The serialized
/// key order is `cvv`, `pin`, `expiryDate`, `pan`, which is what the gateway
/// decrypts against. The `Debug` output masks every field, and memory is
/// zeroed on drop.
///
/// # Examples
///
/// ```
/// use zivra_pay::types::CardFields;
///
/// let card = CardFields::new("4111111111111111", "12", "25", "123", "1234");
/// assert_eq!(card.expiry_date, "1225");
/// ```
#[derive(Serialize, Clone, Zeroize, ZeroizeOnDrop)]
pub struct CardFields {
    /// Card verification value printed on the card
    pub cvv: String,

    /// Cardholder PIN
    pub pin: String,

    /// Expiry in MMYY form, month and year concatenated without a separator
    #[serde(rename = "expiryDate")]
    pub expiry_date: String,

    /// Primary account number (the long card number)
    pub pan: String,
}

impl CardFields {
    /// Creates card fields from their individual parts.
    ///
    /// # Arguments
    ///
    /// * `pan` - Primary account number
    /// * `expiry_month` - Two-digit expiry month (e.g., "12")
    /// * `expiry_year` - Two-digit expiry year (e.g., "25")
    /// * `cvv` - Card verification value
    /// * `pin` - Cardholder PIN
    pub fn new(
        pan: impl Into<String>,
        expiry_month: impl Into<String>,
        expiry_year: impl Into<String>,
        cvv: impl Into<String>,
        pin: impl Into<String>,
    ) -> Self {
        Self {
            cvv: cvv.into(),
            pin: pin.into(),
            expiry_date: format!("{}{}", expiry_month.into(), expiry_year.into()),
            pan: pan.into(),
        }
    }

    /// Checks that every field is present and non-empty.
    ///
    /// Encryption calls this before touching the key so that a partially
    /// filled card fails fast instead of producing a ciphertext the gateway
    /// will reject.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("pan", &self.pan),
            ("expiryDate", &self.expiry_date),
            ("cvv", &self.cvv),
            ("pin", &self.pin),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ZivraError::MissingField(name.to_string()));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CardFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardFields")
            .field("cvv", &"***")
            .field("pin", &"***")
            .field("expiry_date", &"***")
            .field("pan", &mask_pan(&self.pan))
            .finish()
    }
}

/// Masks a PAN down to its first six and last four digits.
fn mask_pan(pan: &str) -> String {
    if pan.is_ascii() && pan.len() >= 10 {
        format!("{}******{}", &pan[..6], &pan[pan.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Body for requesting a USSD payment code.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UssdCodeRequest {
    /// Name of the customer's bank, as listed by the supported-banks endpoint
    pub bank_name: String,
}

/// Body for querying the status of a transaction.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TransactionStatusRequest {
    /// Payment method the transaction was initiated with (e.g., "CARD", "USSD")
    pub payment_method: String,

    /// Merchant transaction reference, repeated from the request path
    pub reference: String,
}

/// Body for initializing an encrypted card charge.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CardPaymentRequest {
    /// Merchant transaction reference
    #[serde(rename = "transactionReference")]
    pub transaction_reference: String,

    /// Base64 RSA ciphertext of the card fields
    pub payload: String,

    /// Device and browser capture for risk screening
    #[serde(rename = "deviceDetails")]
    pub device_details: crate::device::DeviceInfo,
}

/// Body for submitting a one-time password on a card charge.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OtpSubmission {
    /// One-time password entered by the cardholder
    pub otp: String,

    /// Gateway-issued reference returned by the card initialize call
    #[serde(rename = "gatewayReference")]
    pub gateway_reference: String,
}

/// Body for requesting a fresh one-time password.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OtpResendRequest {
    /// Gateway-issued reference returned by the card initialize call
    #[serde(rename = "gatewayReference")]
    pub gateway_reference: String,
}

/// Body for verifying a completed card transaction.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CardVerifyRequest {
    /// Merchant transaction reference
    pub reference: String,
}
