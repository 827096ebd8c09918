use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct InitiatePaymentRequest {
    pub cart_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentInitiated {
    /// Our transaction reference; also embedded in the provider callback.
    pub reference: String,
    /// Provider page the shopper must be redirected to.
    pub payment_url: String,
}

/// Query parameters Flutterwave appends when redirecting the shopper back.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FlutterwaveCallbackQuery {
    pub transaction_id: Option<String>,
    pub tx_ref: Option<String>,
    pub status: Option<String>,
}

/// PayPal sends these either as query parameters on the redirect or in the
/// frontend's follow-up POST body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaypalCallbackParams {
    #[serde(rename = "paymentId")]
    pub payment_id: Option<String>,
    #[serde(rename = "PayerID")]
    pub payer_id: Option<String>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

impl PaypalCallbackParams {
    /// Field-wise merge, preferring `self`.
    pub fn merged_with(self, other: PaypalCallbackParams) -> PaypalCallbackParams {
        PaypalCallbackParams {
            payment_id: self.payment_id.or(other.payment_id),
            payer_id: self.payer_id.or(other.payer_id),
            reference: self.reference.or(other.reference),
        }
    }
}
