//! Example USSD payment.
//!
//! Lists the banks that support USSD, initiates a transaction, and requests
//! a dial code the customer completes from their phone.
//!
//! Run with:
//! ```bash
//! cargo run --example banks
//! ```
//!
//! Environment variables:
//! - ZIVRA_SECRET_KEY: Merchant secret key from the Zivra dashboard
//! - ZIVRA_BASE_URL: Gateway base URL (default: sandbox)
//! - ZIVRA_BANK: Bank to request a code for (default: first supported bank)
//! - ZIVRA_AMOUNT: Amount to charge (default: 1000.00)

use serde_json::json;
use zivra_pay::{generate_payment_reference, ZivraClient, ZivraConfig, SANDBOX_BASE_URL};

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
    let amount = std::env::var("ZIVRA_AMOUNT").unwrap_or_else(|_| "1000.00".to_string());

    println!("🏦 Zivra Pay USSD payment");
    println!("   Gateway: {}", base_url);
    println!();

    let client = ZivraClient::new(ZivraConfig::new(&base_url, secret_key)?)?;

    println!("📡 Fetching supported banks...");
    let banks = client.supported_ussd_banks().await?;
    let bank_list = banks["data"].as_array().cloned().unwrap_or_default();
    for bank in &bank_list {
        println!(
            "   - {} ({})",
            bank["name"].as_str().unwrap_or("?"),
            bank["ussdBase"].as_str().unwrap_or("?")
        );
    }

    let bank_name = std::env::var("ZIVRA_BANK").unwrap_or_else(|_| {
        bank_list
            .first()
            .and_then(|bank| bank["name"].as_str())
            .unwrap_or("First Bank")
            .to_string()
    });

    let reference = generate_payment_reference();
    println!("\n📡 Initiating transaction {} for ₦{}...", reference, amount);
    client
        .initiate_transaction(&json!({
            "amount": amount,
            "currency": "NGN",
            "reference": reference,
        }))
        .await?;

    println!("📡 Requesting a USSD code from {}...", bank_name);
    let code = client.request_ussd_code(&reference, &bank_name).await?;
    println!(
        "\n📱 Ask the customer to dial: {}",
        code["data"]["ussdCode"].as_str().unwrap_or("?")
    );

    let status = client.transaction_status(&reference, "USSD").await?;
    println!(
        "🔎 Current state: {}",
        status["data"]["paymentState"].as_str().unwrap_or("PENDING")
    );

    println!("\n✨ Done!");
    Ok(())
}
