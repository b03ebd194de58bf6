//! Gateway client for the Zivra Pay payment API.
//!
//! This module provides the HTTP client covering every `/api/v1/payment`
//! endpoint: transaction initiation and verification, bank transfers, USSD
//! codes, encrypted card charges with OTP validation, and supporting
//! lookups. Each method maps one-to-one onto a remote endpoint and funnels
//! through a single dispatch primitive.

use std::fmt;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use url::Url;
use zeroize::Zeroizing;

use crate::device::{DeviceInfo, RequestContext};
use crate::encryption::CardEncryptor;
use crate::errors::{Result, ZivraError};
use crate::types::{
    CardFields, CardPaymentRequest, CardVerifyRequest, OtpResendRequest, OtpSubmission,
    TransactionStatusRequest, UssdCodeRequest,
};

/// Production gateway base URL.
pub const PRODUCTION_BASE_URL: &str = "https://api.zivrapay.com";

/// Sandbox gateway base URL.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.zivrapay.com";

/// Path prefix shared by every payment endpoint.
const API_PREFIX: &str = "/api/v1/payment";

/// Synthesized status for transport failures with no response.
const NO_RESPONSE_STATUS: u16 = 500;

/// Configuration for the Zivra Pay gateway client.
///
/// Immutable after construction. The secret key is held in zeroizing
/// memory and redacted from `Debug` output.
///
/// # Examples
///
/// ```
/// use zivra_pay::client::ZivraConfig;
///
/// let config = ZivraConfig::new("https://sandbox.zivrapay.com", "sk_test_abc123").unwrap();
/// assert!(config.verify_tls);
/// ```
#[derive(Clone)]
pub struct ZivraConfig {
    /// Gateway base URL
    pub base_url: Url,

    /// Merchant secret key, sent as a bearer credential on every call
    pub secret_key: Zeroizing<String>,

    /// Whether TLS certificates are verified. Leave enabled outside of
    /// test environments with self-signed certificates.
    pub verify_tls: bool,
}

impl ZivraConfig {
    /// Creates a configuration for the given gateway address.
    ///
    /// Endpoint paths are appended to `base_url`, so a base address with a
    /// path prefix (e.g. a reverse-proxy mount like `https://host/zivra/`)
    /// keeps that prefix on every call.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Gateway base URL, e.g. [`PRODUCTION_BASE_URL`]
    /// * `secret_key` - Merchant secret key from the Zivra dashboard
    pub fn new(base_url: impl AsRef<str>, secret_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            secret_key: Zeroizing::new(secret_key.into()),
            verify_tls: true,
        })
    }

    /// Creates a configuration pointed at the sandbox gateway.
    pub fn sandbox(secret_key: impl Into<String>) -> Result<Self> {
        Self::new(SANDBOX_BASE_URL, secret_key)
    }

    /// Sets whether TLS certificates are verified.
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Reads configuration from the environment.
    ///
    /// * `ZIVRA_SECRET_KEY` - required
    /// * `ZIVRA_BASE_URL` - optional, defaults to [`PRODUCTION_BASE_URL`]
    /// * `ZIVRA_VERIFY_TLS` - optional, "false" or "0" disables verification
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("ZIVRA_BASE_URL").unwrap_or_else(|_| PRODUCTION_BASE_URL.to_string());
        let secret_key = std::env::var("ZIVRA_SECRET_KEY")
            .map_err(|_| ZivraError::ConfigError("ZIVRA_SECRET_KEY is not set".to_string()))?;
        let verify_tls = match std::env::var("ZIVRA_VERIFY_TLS") {
            Ok(value) => !matches!(value.as_str(), "false" | "0"),
            Err(_) => true,
        };
        Ok(Self::new(base_url, secret_key)?.with_verify_tls(verify_tls))
    }
}

impl fmt::Debug for ZivraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZivraConfig")
            .field("base_url", &self.base_url.as_str())
            .field("secret_key", &"[REDACTED]")
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// HTTP client for the Zivra Pay gateway.
///
/// Stateless beyond its configuration: every method issues one independent
/// HTTP call, so a single client may be shared across tasks freely. No
/// timeout is set by the client itself; callers who need one should supply
/// their own [`reqwest::Client`] via [`ZivraClient::with_http_client`].
///
/// # Examples
///
/// ```rust,no_run
/// use zivra_pay::client::{ZivraClient, ZivraConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ZivraConfig::sandbox("sk_test_abc123")?;
/// let client = ZivraClient::new(config)?;
///
/// let banks = client.supported_ussd_banks().await?;
/// println!("Banks: {}", banks);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ZivraClient {
    config: ZivraConfig,
    http: Client,
}

impl ZivraClient {
    /// Creates a client from configuration.
    ///
    /// Builds an HTTP client honoring the configured TLS toggle.
    pub fn new(config: ZivraConfig) -> Result<Self> {
        let http = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        Ok(Self { config, http })
    }

    /// Creates a client around a caller-supplied [`reqwest::Client`].
    ///
    /// Use this to control pooling, proxies, or timeouts. The configured
    /// `verify_tls` toggle does not apply to a supplied client.
    pub fn with_http_client(config: ZivraConfig, http: Client) -> Self {
        Self { config, http }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ZivraConfig {
        &self.config
    }

    /// Generates a merchant transaction reference without a gateway call.
    ///
    /// Shorthand for [`generate_payment_reference`](crate::utils::generate_payment_reference)
    /// for callers that already have the client in scope. References are
    /// UUID v4 strings created locally.
    ///
    /// # Examples
    ///
    /// ```
    /// use zivra_pay::ZivraClient;
    ///
    /// let reference = ZivraClient::generate_payment_reference();
    /// assert_eq!(reference.len(), 36);
    /// ```
    pub fn generate_payment_reference() -> String {
        crate::utils::generate_payment_reference()
    }

    /// Initiates a payment transaction.
    ///
    /// The gateway accepts a merchant-defined body here (amount, currency,
    /// customer fields, preferred payment methods), so any serializable
    /// value can be passed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use zivra_pay::client::{ZivraClient, ZivraConfig};
    /// use zivra_pay::utils::generate_payment_reference;
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ZivraClient::new(ZivraConfig::sandbox("sk_test_abc123")?)?;
    ///
    /// let response = client
    ///     .initiate_transaction(&json!({
    ///         "amount": "2500.00",
    ///         "currency": "NGN",
    ///         "reference": generate_payment_reference(),
    ///     }))
    ///     .await?;
    /// println!("{}", response);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn initiate_transaction<B: Serialize>(&self, body: &B) -> Result<Value> {
        let path = format!("{}/initiate", API_PREFIX);
        self.dispatch(Method::POST, &path, Some(serde_json::to_value(body)?))
            .await
    }

    /// Verifies the outcome of a transaction by merchant reference.
    pub async fn verify_transaction(&self, reference: &str) -> Result<Value> {
        let path = format!("{}/transaction/verify/{}", API_PREFIX, reference);
        self.dispatch(Method::GET, &path, None).await
    }

    /// Requests a dedicated bank account for a transfer payment.
    pub async fn request_bank_account(&self, reference: &str) -> Result<Value> {
        let path = format!("{}/bank-transfer/request-bank-account/{}", API_PREFIX, reference);
        self.dispatch(Method::GET, &path, None).await
    }

    /// Requests a USSD payment code for the given bank.
    ///
    /// `bank_name` must be one of the names returned by
    /// [`supported_ussd_banks`](Self::supported_ussd_banks).
    pub async fn request_ussd_code(&self, reference: &str, bank_name: &str) -> Result<Value> {
        let path = format!("{}/ussd/request-ussd-code/{}", API_PREFIX, reference);
        let body = UssdCodeRequest {
            bank_name: bank_name.to_string(),
        };
        self.dispatch(Method::POST, &path, Some(serde_json::to_value(&body)?))
            .await
    }

    /// Lists the banks that support USSD payments.
    pub async fn supported_ussd_banks(&self) -> Result<Value> {
        let path = format!("{}/ussd/supported-banks", API_PREFIX);
        self.dispatch(Method::GET, &path, None).await
    }

    /// Fetches the details of a transaction.
    pub async fn transaction_details(&self, reference: &str) -> Result<Value> {
        let path = format!("{}/details/{}", API_PREFIX, reference);
        self.dispatch(Method::GET, &path, None).await
    }

    /// Queries the status of a transaction for a given payment method.
    pub async fn transaction_status(&self, reference: &str, payment_method: &str) -> Result<Value> {
        let path = format!("{}/status/{}", API_PREFIX, reference);
        let body = TransactionStatusRequest {
            payment_method: payment_method.to_string(),
            reference: reference.to_string(),
        };
        self.dispatch(Method::POST, &path, Some(serde_json::to_value(&body)?))
            .await
    }

    /// Cancels a pending transaction.
    pub async fn cancel_transaction(&self, reference: &str) -> Result<Value> {
        let path = format!("{}/cancel/{}", API_PREFIX, reference);
        self.dispatch(Method::GET, &path, None).await
    }

    /// Initializes an encrypted card charge.
    ///
    /// This is the one composite call: it derives [`DeviceInfo`] from the
    /// inbound request, encrypts the card fields, and submits the combined
    /// body. Plaintext card fields never leave the process.
    ///
    /// # Arguments
    ///
    /// * `reference` - Merchant transaction reference
    /// * `card` - Plaintext card fields to encrypt
    /// * `encryptor` - Encryptor bound to the merchant's public key
    /// * `request` - Inbound request the cardholder's device details are read from
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use zivra_pay::client::{ZivraClient, ZivraConfig};
    /// use zivra_pay::device::RequestMeta;
    /// use zivra_pay::encryption::CardEncryptor;
    /// use zivra_pay::types::CardFields;
    /// use zivra_pay::utils::generate_payment_reference;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ZivraClient::new(ZivraConfig::sandbox("sk_test_abc123")?)?;
    /// let encryptor = CardEncryptor::new("/etc/zivra/public.pem")?;
    ///
    /// let card = CardFields::new("4111111111111111", "12", "25", "123", "1234");
    /// let request = RequestMeta::new()
    ///     .with_header("User-Agent", "Mozilla/5.0")
    ///     .with_ip("203.0.113.5");
    ///
    /// let reference = generate_payment_reference();
    /// let response = client
    ///     .initiate_card_transaction(&reference, &card, &encryptor, &request)
    ///     .await?;
    /// println!("{}", response);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn initiate_card_transaction(
        &self,
        reference: &str,
        card: &CardFields,
        encryptor: &CardEncryptor,
        request: &impl RequestContext,
    ) -> Result<Value> {
        let device_details = DeviceInfo::from_request(request);
        let payload = encryptor.encrypt(card)?;
        let body = CardPaymentRequest {
            transaction_reference: reference.to_string(),
            payload,
            device_details,
        };
        let path = format!("{}/cards/initialize", API_PREFIX);
        self.dispatch(Method::POST, &path, Some(serde_json::to_value(&body)?))
            .await
    }

    /// Submits the one-time password for a pending card charge.
    pub async fn submit_card_otp(
        &self,
        reference: &str,
        otp: &str,
        gateway_reference: &str,
    ) -> Result<Value> {
        let path = format!("{}/cards/otp/submit/{}", API_PREFIX, reference);
        let body = OtpSubmission {
            otp: otp.to_string(),
            gateway_reference: gateway_reference.to_string(),
        };
        self.dispatch(Method::POST, &path, Some(serde_json::to_value(&body)?))
            .await
    }

    /// Asks the gateway to resend the one-time password.
    pub async fn resend_card_otp(&self, reference: &str, gateway_reference: &str) -> Result<Value> {
        let path = format!("{}/cards/otp/resend/{}", API_PREFIX, reference);
        let body = OtpResendRequest {
            gateway_reference: gateway_reference.to_string(),
        };
        self.dispatch(Method::POST, &path, Some(serde_json::to_value(&body)?))
            .await
    }

    /// Fetches the details of a card transaction.
    pub async fn card_details(&self, reference: &str) -> Result<Value> {
        let path = format!("{}/cards/details/{}", API_PREFIX, reference);
        self.dispatch(Method::GET, &path, None).await
    }

    /// Verifies the outcome of a card transaction.
    pub async fn verify_card_transaction(&self, reference: &str) -> Result<Value> {
        let path = format!("{}/cards/transaction/verify", API_PREFIX);
        let body = CardVerifyRequest {
            reference: reference.to_string(),
        };
        self.dispatch(Method::POST, &path, Some(serde_json::to_value(&body)?))
            .await
    }

    /// Performs a raw gateway request with a caller-supplied verb.
    ///
    /// An escape hatch for endpoints this client does not model. The verb
    /// is validated before anything is sent: an empty or unknown verb
    /// fails with [`ZivraError::InvalidMethodError`] and no network call
    /// is made. Supported verbs are GET, POST, PUT, PATCH, and DELETE.
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> Result<Value> {
        let method = parse_method(method)?;
        self.dispatch(method, path, body).await
    }

    /// Issues one HTTP call against the gateway.
    ///
    /// The endpoint path is appended to the configured base address, so a
    /// path prefix on the base survives. Fixed headers on every request:
    /// bearer auth plus JSON accept and content types. Success bodies parse
    /// as JSON and return as-is. A non-2xx response raises
    /// [`ZivraError::ApiError`] with the server's `message` field when one
    /// is present, else a synthesized message naming the path. A transport
    /// failure with no response raises [`ZivraError::ApiError`] with status
    /// 500 and no body.
    async fn dispatch(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = Url::parse(&format!(
            "{}{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path
        ))?;
        tracing::debug!(method = %method, path, "dispatching gateway request");

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(self.config.secret_key.as_str())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(path, error = %err, "gateway unreachable");
                return Err(ZivraError::ApiError {
                    status: NO_RESPONSE_STATUS,
                    message: format!("Request to {} failed: {}", path, err),
                    body: None,
                });
            }
        };

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = extract_error_message(&text)
                .unwrap_or_else(|| format!("Request to {} failed with status {}", path, status));
            tracing::warn!(path, status = status.as_u16(), "gateway returned an error");
            return Err(ZivraError::ApiError {
                status: status.as_u16(),
                message,
                body: Some(text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(ZivraError::from)
    }
}

/// Parses a caller-supplied verb string, rejecting anything unknown.
fn parse_method(method: &str) -> Result<Method> {
    match method.trim().to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        _ => Err(ZivraError::InvalidMethodError(method.to_string())),
    }
}

/// Pulls the server's `message` field out of an error body, if any.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("message")?.as_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = ZivraConfig::new("https://sandbox.zivrapay.com", "sk_test_abc").unwrap();
        assert_eq!(config.base_url.as_str(), "https://sandbox.zivrapay.com/");
        assert_eq!(config.secret_key.as_str(), "sk_test_abc");
        assert!(config.verify_tls);
    }

    #[test]
    fn test_config_rejects_bad_url() {
        let err = ZivraConfig::new("not a url", "sk_test_abc").unwrap_err();
        assert!(matches!(err, ZivraError::UrlParseError(_)));
    }

    #[test]
    fn test_sandbox_config() {
        let config = ZivraConfig::sandbox("sk_test_abc").unwrap();
        assert_eq!(config.base_url.as_str(), format!("{}/", SANDBOX_BASE_URL));
    }

    #[test]
    fn test_verify_tls_builder() {
        let config = ZivraConfig::sandbox("sk_test_abc")
            .unwrap()
            .with_verify_tls(false);
        assert!(!config.verify_tls);
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = ZivraConfig::sandbox("sk_live_very_secret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk_live_very_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("ZIVRA_SECRET_KEY", "sk_env_key");
        std::env::set_var("ZIVRA_BASE_URL", "https://sandbox.zivrapay.com");
        std::env::set_var("ZIVRA_VERIFY_TLS", "false");

        let config = ZivraConfig::from_env().unwrap();
        assert_eq!(config.secret_key.as_str(), "sk_env_key");
        assert_eq!(config.base_url.as_str(), "https://sandbox.zivrapay.com/");
        assert!(!config.verify_tls);

        std::env::remove_var("ZIVRA_SECRET_KEY");
        std::env::remove_var("ZIVRA_BASE_URL");
        std::env::remove_var("ZIVRA_VERIFY_TLS");

        let err = ZivraConfig::from_env().unwrap_err();
        assert!(matches!(err, ZivraError::ConfigError(_)));
    }

    #[test]
    fn test_client_reference_shorthand() {
        let reference = ZivraClient::generate_payment_reference();
        assert_eq!(reference, reference.to_lowercase());
        assert_eq!(reference.len(), 36);
        assert_eq!(reference.matches('-').count(), 4);
        assert_ne!(reference, ZivraClient::generate_payment_reference());
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("GET").unwrap(), Method::GET);
        assert_eq!(parse_method("post").unwrap(), Method::POST);
        assert_eq!(parse_method(" delete ").unwrap(), Method::DELETE);

        assert!(matches!(
            parse_method(""),
            Err(ZivraError::InvalidMethodError(_))
        ));
        assert!(matches!(
            parse_method("TRACE"),
            Err(ZivraError::InvalidMethodError(_))
        ));
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"status":"failed","message":"Insufficient funds"}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Insufficient funds")
        );

        assert_eq!(extract_error_message(r#"{"status":"failed"}"#), None);
        assert_eq!(extract_error_message("Internal Server Error"), None);
        assert_eq!(extract_error_message(""), None);
    }
}
