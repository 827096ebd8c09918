//! PayPal adapter: OAuth client-credentials token, then the classic
//! Payments API — create with `intent: sale`, execute on callback with the
//! payer id. Charges in USD.

use std::time::Duration;

use serde_json::Value;

use super::{
    CallbackReference, CreatePayment, PAYMENT_TITLE, PaymentCreated, PaymentProvider,
    ProviderError, read_json,
};

#[derive(Clone)]
pub struct PaypalClient {
    http: reqwest::Client,
    api_base: String,
    client_id: String,
    secret: String,
    callback_base_url: String,
}

impl PaypalClient {
    pub fn new(
        api_base: &str,
        client_id: &str,
        secret: &str,
        frontend_base_url: &str,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            secret: secret.to_string(),
            callback_base_url: frontend_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(&self.client_id, Some(&self.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let (status, body) = read_json(response).await?;
        if !(200..300).contains(&status) {
            return Err(ProviderError::Api {
                status,
                details: body,
            });
        }
        body.get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Response("access token missing from response".into()))
    }
}

impl PaymentProvider for PaypalClient {
    fn name(&self) -> &'static str {
        "paypal"
    }

    fn currency(&self) -> &'static str {
        "USD"
    }

    async fn create_payment(
        &self,
        request: CreatePayment<'_>,
    ) -> Result<PaymentCreated, ProviderError> {
        let token = self.access_token().await?;
        let amount = format!("{:.2}", request.amount);
        // PayPal redirects back to the frontend with paymentId/PayerID query
        // params; our reference rides along so the callback can find the
        // transaction row.
        let callback_url = format!(
            "{}/paypal-payment-callback/?ref={}",
            self.callback_base_url, request.reference
        );
        let payload = serde_json::json!({
            "intent": "sale",
            "payer": { "payment_method": "paypal" },
            "redirect_urls": {
                "return_url": callback_url,
                "cancel_url": callback_url,
            },
            "transactions": [{
                "item_list": {
                    "items": [{
                        "name": "Cart Items",
                        "sku": "cart",
                        "price": amount,
                        "currency": self.currency(),
                        "quantity": 1,
                    }]
                },
                "amount": { "total": amount, "currency": self.currency() },
                "description": PAYMENT_TITLE,
            }],
        });

        let response = self
            .http
            .post(format!("{}/v1/payments/payment", self.api_base))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        let (status, body) = read_json(response).await?;
        if !(200..300).contains(&status) {
            return Err(ProviderError::Api {
                status,
                details: body,
            });
        }

        let approval_url = body
            .get("links")
            .and_then(Value::as_array)
            .and_then(|links| {
                links.iter().find(|link| {
                    link.get("rel").and_then(Value::as_str) == Some("approval_url")
                })
            })
            .and_then(|link| link.get("href"))
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::Response("approval URL missing from response".into()))?;
        Ok(PaymentCreated {
            redirect_url: approval_url.to_string(),
        })
    }

    async fn verify_payment(
        &self,
        callback: CallbackReference<'_>,
    ) -> Result<(), ProviderError> {
        let payer_id = callback
            .payer_id
            .ok_or_else(|| ProviderError::Response("payer id required to execute".into()))?;

        let token = self.access_token().await?;
        let response = self
            .http
            .post(format!(
                "{}/v1/payments/payment/{}/execute",
                self.api_base, callback.payment_id
            ))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "payer_id": payer_id }))
            .send()
            .await?;
        let (status, body) = read_json(response).await?;
        if !(200..300).contains(&status) {
            return Err(ProviderError::Api {
                status,
                details: body,
            });
        }

        if body.get("state").and_then(Value::as_str) == Some("approved") {
            Ok(())
        } else {
            Err(ProviderError::Rejected { details: body })
        }
    }
}
