//! Utility helpers for the Zivra Pay SDK.

use uuid::Uuid;

/// Generates a merchant transaction reference.
///
/// References are random UUID v4 strings created locally, without a gateway
/// call. Use one reference per payment flow so that initiation, OTP, and
/// verification calls correlate.
///
/// # Examples
///
/// ```
/// use zivra_pay::utils::generate_payment_reference;
///
/// let reference = generate_payment_reference();
/// assert_eq!(reference.len(), 36);
/// assert_eq!(reference.matches('-').count(), 4);
/// ```
pub fn generate_payment_reference() -> String {
    Uuid::new_v4().to_string()
}
