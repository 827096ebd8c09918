//! Payment gateway integration.
//!
//! Both gateways follow the same conceptual protocol — create a payment to
//! obtain a redirect target, let the shopper approve it on the provider's
//! side, then verify the outcome when the provider calls back. The protocol
//! lives in [`PaymentProvider`]; each gateway only supplies its own payload
//! shapes. The checkout flow is written once against the trait.

pub mod flutterwave;
pub mod paypal;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

/// Title shown on the provider's hosted payment page.
pub const PAYMENT_TITLE: &str = "ShopNow Payment";

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP exchange itself failed (connect, timeout, malformed body).
    #[error("provider transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("provider API error (status {status})")]
    Api { status: u16, details: Value },

    /// The provider answered 2xx but did not confirm the payment.
    #[error("payment not confirmed by provider")]
    Rejected { details: Value },

    /// The provider answered 2xx with a payload we cannot use.
    #[error("unexpected provider response: {0}")]
    Response(String),
}

impl ProviderError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ProviderError::Transport(_))
    }
}

pub struct CreatePayment<'a> {
    /// Our transaction reference, embedded in the callback round-trip.
    pub reference: &'a str,
    pub amount: Decimal,
    pub customer_email: &'a str,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
}

#[derive(Debug)]
pub struct PaymentCreated {
    /// Where the shopper is sent to approve the payment.
    pub redirect_url: String,
}

/// Identifiers a provider hands back on its callback.
#[derive(Debug, Clone, Copy)]
pub struct CallbackReference<'a> {
    /// Provider-side payment identifier.
    pub payment_id: &'a str,
    /// Second identifier some providers require to execute the payment.
    pub payer_id: Option<&'a str>,
}

#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    fn name(&self) -> &'static str;

    /// Settlement currency this gateway charges in.
    fn currency(&self) -> &'static str;

    /// Register a payment with the gateway and return the approval target.
    async fn create_payment(
        &self,
        request: CreatePayment<'_>,
    ) -> Result<PaymentCreated, ProviderError>;

    /// Confirm with the gateway that a called-back payment really succeeded.
    async fn verify_payment(
        &self,
        callback: CallbackReference<'_>,
    ) -> Result<(), ProviderError>;
}

/// Read a provider response as (status, JSON body). Non-JSON bodies are kept
/// verbatim as a JSON string so error payloads survive the trip to the caller.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<(u16, Value), ProviderError> {
    let status = response.status().as_u16();
    let text = response.text().await?;
    let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
    Ok((status, body))
}
