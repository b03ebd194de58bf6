//! Example Axum checkout endpoint with real device capture.
//!
//! This example shows how to adapt a web framework's request to the SDK's
//! [`RequestContext`] trait so that card charges carry the cardholder's
//! actual browser and network details instead of defaults.
//!
//! Run with:
//! ```bash
//! cargo run --example device_axum
//! ```
//!
//! Environment variables:
//! - ZIVRA_SECRET_KEY: Merchant secret key from the Zivra dashboard
//! - ZIVRA_BASE_URL: Gateway base URL (default: sandbox)
//! - ZIVRA_PUBLIC_KEY: Path to the merchant RSA public key PEM (default: ./public.pem)
//! - PORT: Server port (default: 3000)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use zivra_pay::{
    generate_payment_reference, CardEncryptor, CardFields, RequestContext, ZivraClient,
    ZivraConfig, ZivraError, SANDBOX_BASE_URL,
};

/// The inbound request as the SDK sees it: headers plus the peer address.
struct InboundRequest {
    headers: HeaderMap,
    peer: SocketAddr,
}

impl RequestContext for InboundRequest {
    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }

    fn client_ip(&self) -> Option<String> {
        Some(self.peer.ip().to_string())
    }
}

#[derive(Clone)]
struct AppState {
    client: ZivraClient,
    encryptor: CardEncryptor,
}

#[derive(Deserialize)]
struct CheckoutForm {
    pan: String,
    #[serde(rename = "expiryMonth")]
    expiry_month: String,
    #[serde(rename = "expiryYear")]
    expiry_year: String,
    cvv: String,
    pin: String,
}

/// Charges the submitted card, capturing device details from this request.
async fn checkout_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<Value>, AppError> {
    let card = CardFields::new(
        form.pan,
        form.expiry_month,
        form.expiry_year,
        form.cvv,
        form.pin,
    );
    let inbound = InboundRequest { headers, peer };

    let reference = generate_payment_reference();
    let response = state
        .client
        .initiate_card_transaction(&reference, &card, &state.encryptor, &inbound)
        .await?;

    Ok(Json(json!({
        "reference": reference,
        "gateway": response,
    })))
}

/// Root endpoint with information.
async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Zivra Pay device-capture example",
        "endpoints": {
            "/checkout": "POST card fields to initialize an encrypted charge"
        },
    }))
}

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
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()?;

    println!("🚀 Starting Zivra Pay device-capture example");
    println!("   Gateway: {}", base_url);
    println!("   Public key: {}", key_path);
    println!("   Port: {}", port);

    let state = Arc::new(AppState {
        client: ZivraClient::new(ZivraConfig::new(&base_url, secret_key)?)?,
        encryptor: CardEncryptor::new(&key_path)?,
    });

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/checkout", post(checkout_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("✅ Server listening on http://{}", addr);
    println!("\nTry:");
    println!("  curl http://localhost:{}/", port);
    println!(
        "  curl -X POST http://localhost:{}/checkout \\\n    -H 'Content-Type: application/json' \\\n    -d '{{\"pan\":\"4111111111111111\",\"expiryMonth\":\"12\",\"expiryYear\":\"28\",\"cvv\":\"123\",\"pin\":\"1234\"}}'",
        port
    );
    println!();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

// Error handling
struct AppError(ZivraError);

impl From<ZivraError> for AppError {
    fn from(err: ZivraError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ZivraError::ApiError {
                status, message, ..
            } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                message.clone(),
            ),
            ZivraError::MissingField(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
