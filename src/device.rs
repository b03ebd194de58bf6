//! Device and browser capture for card payments.
//!
//! Card charges carry a fraud-screening payload describing the cardholder's
//! browser and network address. This module derives that payload from an
//! inbound web request through the [`RequestContext`] trait, so the SDK
//! never depends on a specific web framework's request type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Challenge window size requested from the card issuer.
pub const CHALLENGE_WINDOW_FULL_SCREEN: &str = "FULL_SCREEN";

const DEFAULT_BROWSER: &str = "Unknown";
const DEFAULT_IP: &str = "127.0.0.1";
const DEFAULT_ACCEPT_HEADERS: &str = "application/json";
const DEFAULT_LANGUAGE: &str = "en-US";

/// Read-only view of an inbound web request.
///
/// Implement this for your framework's request type (or populate a
/// [`RequestMeta`]) to let the SDK capture device details. Only header
/// lookup and the client address are needed.
pub trait RequestContext {
    /// Returns the value of the named header, if present.
    ///
    /// Lookups are case-insensitive, matching HTTP header semantics.
    fn header(&self, name: &str) -> Option<String>;

    /// Returns the client's network address, if known.
    fn client_ip(&self) -> Option<String>;
}

/// Framework-independent request capture.
///
/// A plain bag of headers and a client address, for callers that do not
/// want to implement [`RequestContext`] on their framework's request type.
///
/// # Examples
///
/// ```
/// use zivra_pay::device::{DeviceInfo, RequestMeta};
///
/// let request = RequestMeta::new()
///     .with_header("User-Agent", "Mozilla/5.0")
///     .with_ip("203.0.113.5");
///
/// let device = DeviceInfo::from_request(&request);
/// assert_eq!(device.browser, "Mozilla/5.0");
/// assert_eq!(device.ip_address, "203.0.113.5");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    headers: HashMap<String, String>,
    ip: Option<String>,
}

impl RequestMeta {
    /// Creates an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header. Names are stored lowercased.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the client address.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }
}

impl RequestContext for RequestMeta {
    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn client_ip(&self) -> Option<String> {
        self.ip.clone()
    }
}

/// Browser descriptors attached to a card charge.
///
/// Mostly static defaults in the shape the issuer's challenge flow expects;
/// `accept_headers` and `language` are sourced from the inbound request
/// when available.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrowserDetails {
    /// Challenge window size to request, always [`CHALLENGE_WINDOW_FULL_SCREEN`]
    #[serde(rename = "challengeWindowSize")]
    pub challenge_window_size: String,

    /// Accept header of the originating request
    #[serde(rename = "acceptHeaders")]
    pub accept_headers: String,

    /// Screen color depth in bits
    #[serde(rename = "colorDepth")]
    pub color_depth: u32,

    /// Whether the browser reports Java support
    #[serde(rename = "javaEnabled")]
    pub java_enabled: bool,

    /// Preferred language of the originating request
    pub language: String,

    /// Screen height in pixels
    #[serde(rename = "screenHeight")]
    pub screen_height: u32,

    /// Screen width in pixels
    #[serde(rename = "screenWidth")]
    pub screen_width: u32,

    /// Time zone offset in minutes from UTC
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

impl Default for BrowserDetails {
    fn default() -> Self {
        Self {
            challenge_window_size: CHALLENGE_WINDOW_FULL_SCREEN.to_string(),
            accept_headers: DEFAULT_ACCEPT_HEADERS.to_string(),
            color_depth: 24,
            java_enabled: false,
            language: DEFAULT_LANGUAGE.to_string(),
            screen_height: 1080,
            screen_width: 1920,
            time_zone: "0".to_string(),
        }
    }
}

impl BrowserDetails {
    /// Builds browser details from an inbound request, falling back to
    /// defaults for anything the request does not carry.
    pub fn from_request(request: &impl RequestContext) -> Self {
        let mut details = Self::default();
        if let Some(accept) = non_empty(request.header("accept")) {
            details.accept_headers = accept;
        }
        if let Some(language) = non_empty(request.header("accept-language")) {
            // Keep the first preference only, e.g. "en-GB,en;q=0.9" -> "en-GB"
            if let Some(first) = language.split(',').next() {
                details.language = first.trim().to_string();
            }
        }
        details
    }
}

/// Device capture submitted with a card charge.
///
/// # Examples
///
/// ```
/// use zivra_pay::device::{DeviceInfo, RequestMeta};
///
/// let request = RequestMeta::new().with_ip("::ffff:203.0.113.5");
/// let device = DeviceInfo::from_request(&request);
///
/// assert_eq!(device.ip_address, "203.0.113.5");
/// assert_eq!(device.browser, "Unknown");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeviceInfo {
    /// User-agent of the originating request, or "Unknown"
    pub browser: String,

    /// Client address with any IPv6-mapped-IPv4 prefix stripped
    #[serde(rename = "ipAddress")]
    pub ip_address: String,

    /// Browser descriptors for the issuer's challenge flow
    #[serde(rename = "browserDetails")]
    pub browser_details: BrowserDetails,
}

impl DeviceInfo {
    /// Derives device details from an inbound request.
    ///
    /// `browser` and `ip_address` are always populated: absent or empty
    /// values fall back to "Unknown" and the loopback address.
    pub fn from_request(request: &impl RequestContext) -> Self {
        let browser = non_empty(request.header("user-agent"))
            .unwrap_or_else(|| DEFAULT_BROWSER.to_string());
        let ip_address = non_empty(request.client_ip())
            .map(|ip| normalize_ip(&ip))
            .unwrap_or_else(|| DEFAULT_IP.to_string());
        Self {
            browser,
            ip_address,
            browser_details: BrowserDetails::from_request(request),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Strips the IPv6-mapped-IPv4 prefix, e.g. "::ffff:203.0.113.5" -> "203.0.113.5".
fn normalize_ip(ip: &str) -> String {
    match ip.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("::ffff:") => ip[7..].to_string(),
        _ => ip.to_string(),
    }
}
