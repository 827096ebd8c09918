//! Flutterwave adapter: `POST /payments` to create, `GET
//! /transactions/{id}/verify` to confirm. Charges in NGN.

use std::time::Duration;

use serde_json::Value;

use super::{
    CallbackReference, CreatePayment, PAYMENT_TITLE, PaymentCreated, PaymentProvider,
    ProviderError, read_json,
};

#[derive(Clone)]
pub struct FlutterwaveClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
    redirect_url: String,
}

impl FlutterwaveClient {
    pub fn new(
        api_base: &str,
        secret_key: &str,
        frontend_base_url: &str,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
            redirect_url: format!(
                "{}/payment-status/",
                frontend_base_url.trim_end_matches('/')
            ),
        })
    }
}

impl PaymentProvider for FlutterwaveClient {
    fn name(&self) -> &'static str {
        "flutterwave"
    }

    fn currency(&self) -> &'static str {
        "NGN"
    }

    async fn create_payment(
        &self,
        request: CreatePayment<'_>,
    ) -> Result<PaymentCreated, ProviderError> {
        let payload = serde_json::json!({
            "tx_ref": request.reference,
            "amount": format!("{:.2}", request.amount),
            "currency": self.currency(),
            "redirect_url": self.redirect_url,
            "customer": {
                "email": request.customer_email,
                "name": request.customer_name,
                "phonenumber": request.customer_phone,
            },
            "customizations": { "title": PAYMENT_TITLE },
        });

        let response = self
            .http
            .post(format!("{}/payments", self.api_base))
            .bearer_auth(&self.secret_key)
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

        let link = body
            .pointer("/data/link")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::Response("payment link missing from response".into()))?;
        Ok(PaymentCreated {
            redirect_url: link.to_string(),
        })
    }

    async fn verify_payment(
        &self,
        callback: CallbackReference<'_>,
    ) -> Result<(), ProviderError> {
        let response = self
            .http
            .get(format!(
                "{}/transactions/{}/verify",
                self.api_base, callback.payment_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        let (status, body) = read_json(response).await?;
        if !(200..300).contains(&status) {
            return Err(ProviderError::Api {
                status,
                details: body,
            });
        }

        if body.get("status").and_then(Value::as_str) == Some("success") {
            Ok(())
        } else {
            Err(ProviderError::Rejected { details: body })
        }
    }
}
