//! # zivra-pay
//!
//! A Rust client SDK for the Zivra Pay payment gateway.
//!
//! Zivra Pay processes card, bank-transfer, and USSD payments through a
//! REST API. This crate maps each gateway endpoint onto one async method,
//! handles bearer authentication and error normalization, and encrypts
//! sensitive card fields with the merchant's RSA public key before they
//! leave the process.
//!
//! ## Features
//!
//! - **Full endpoint coverage**: Initiation, verification, status, cancel, bank transfer, USSD, and card flows
//! - **Card encryption**: RSA PKCS#1 v1.5 over the card fields, interoperable with the gateway's decryption
//! - **Device capture**: Derive fraud-screening details from any web framework's request via a small trait
//! - **Secret hygiene**: Keys and card fields are zeroized on drop and redacted from debug output
//!
//! ## Quick Start
//!
//! ### Verify a transaction
//!
//! ```rust,no_run
//! use zivra_pay::{ZivraClient, ZivraConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ZivraConfig::new("https://api.zivrapay.com", "sk_live_YOUR_KEY")?;
//! let client = ZivraClient::new(config)?;
//!
//! let outcome = client.verify_transaction("b4a7c21e-6f3d-4d9a-9f6e-2f1b0c8d5a47").await?;
//! println!("Outcome: {}", outcome);
//! # Ok(())
//! # }
//! ```
//!
//! ### Charge a card
//!
//! ```rust,no_run
//! use zivra_pay::{
//!     generate_payment_reference, CardEncryptor, CardFields, RequestMeta, ZivraClient,
//!     ZivraConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ZivraClient::new(ZivraConfig::sandbox("sk_test_YOUR_KEY")?)?;
//! let encryptor = CardEncryptor::new("/etc/zivra/public.pem")?;
//!
//! let card = CardFields::new("4111111111111111", "12", "25", "123", "1234");
//! let request = RequestMeta::new()
//!     .with_header("User-Agent", "Mozilla/5.0")
//!     .with_ip("203.0.113.5");
//!
//! let reference = generate_payment_reference();
//! let pending = client
//!     .initiate_card_transaction(&reference, &card, &encryptor, &request)
//!     .await?;
//!
//! // The cardholder receives an OTP out of band; submit it to complete.
//! let gateway_reference = pending["data"]["gatewayReference"]
//!     .as_str()
//!     .unwrap_or_default();
//! client
//!     .submit_card_otp(&reference, "123456", gateway_reference)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Card Charge Flow
//!
//! 1. **Generate a reference**: [`generate_payment_reference`] creates a UUID locally
//! 2. **Initialize the charge**: Card fields are encrypted and submitted with device details
//! 3. **Submit the OTP**: The gateway challenges the cardholder; relay their OTP
//! 4. **Verify**: Confirm the final state before delivering value
//!
//! ## Security
//!
//! - **PKCS#1 v1.5 encryption**: Card fields are encrypted before transmission; padding matches the gateway's decryption exactly
//! - **No plaintext persistence**: Card fields are zeroized on drop and never logged
//! - **Bearer credential redaction**: The secret key never appears in `Debug` output
//! - **TLS verification on by default**: Opting out is explicit and meant for sandboxes only
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events for dispatched requests and gateway
//! errors. Without a subscriber installed they are no-ops; install one
//! (e.g. `tracing-subscriber`) in your application to see them. Card and
//! key material is never part of an event.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod device;
pub mod encryption;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use client::{ZivraClient, ZivraConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use device::{
    BrowserDetails, DeviceInfo, RequestContext, RequestMeta, CHALLENGE_WINDOW_FULL_SCREEN,
};
pub use encryption::CardEncryptor;
pub use errors::{Result, ZivraError};
pub use types::CardFields;
pub use utils::generate_payment_reference;
