//! Example encrypted card checkout.
//!
//! This example walks the full card flow: initialize an encrypted charge,
//! relay the cardholder's OTP, and verify the final state.
//!
//! Run with:
//! ```bash
//! cargo run --example checkout
//! ```
//!
//! Environment variables:
//! - ZIVRA_SECRET_KEY: Merchant secret key from the Zivra dashboard
//! - ZIVRA_BASE_URL: Gateway base URL (default: sandbox)
//! - ZIVRA_PUBLIC_KEY: Path to the merchant RSA public key PEM (default: ./public.pem)

use std::io::{self, BufRead, Write};

use anyhow::Context;
use zivra_pay::{
    generate_payment_reference, CardEncryptor, CardFields, RequestMeta, ZivraClient, ZivraConfig,
    SANDBOX_BASE_URL,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing and load .env if present
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    // Load configuration from environment or use defaults
    let secret_key = std::env::var("ZIVRA_SECRET_KEY").unwrap_or_else(|_| {
        println!("⚠️  No ZIVRA_SECRET_KEY set, using a placeholder sandbox key");
        "sk_test_placeholder".to_string()
    });
    let base_url =
        std::env::var("ZIVRA_BASE_URL").unwrap_or_else(|_| SANDBOX_BASE_URL.to_string());
    let key_path =
        std::env::var("ZIVRA_PUBLIC_KEY").unwrap_or_else(|_| "./public.pem".to_string());

    println!("💳 Zivra Pay card checkout");
    println!("   Gateway: {}", base_url);
    println!("   Public key: {}", key_path);
    println!();

    let client = ZivraClient::new(ZivraConfig::new(&base_url, secret_key)?)?;
    let encryptor = CardEncryptor::new(&key_path)
        .context("ZIVRA_PUBLIC_KEY must point at the merchant RSA public key")?;

    // The PAN below is the standard Visa test number; the gateway sandbox
    // accepts it with any future expiry.
    let card = CardFields::new("4111111111111111", "12", "28", "123", "1234");

    // A real integration derives this from the cardholder's inbound request;
    // see the device_axum example for a framework adapter.
    let request = RequestMeta::new()
        .with_header("User-Agent", "Mozilla/5.0 (X11; Linux x86_64)")
        .with_header("Accept-Language", "en-GB,en;q=0.9")
        .with_ip("203.0.113.5");

    let reference = generate_payment_reference();
    println!("📡 Initializing charge {}...", reference);

    let pending = client
        .initiate_card_transaction(&reference, &card, &encryptor, &request)
        .await?;
    println!("{}", serde_json::to_string_pretty(&pending)?);

    let gateway_reference = pending["data"]["gatewayReference"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    // The OTP reaches the cardholder out of band (SMS, bank app).
    print!("\n🔑 Enter the OTP sent to the cardholder: ");
    io::stdout().flush()?;
    let mut otp = String::new();
    io::stdin().lock().read_line(&mut otp)?;
    let otp = otp.trim();

    let completed = client
        .submit_card_otp(&reference, otp, &gateway_reference)
        .await?;
    println!("{}", serde_json::to_string_pretty(&completed)?);

    println!("\n🔎 Verifying before delivering value...");
    let outcome = client.verify_card_transaction(&reference).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    println!("\n✨ Done!");
    Ok(())
}
