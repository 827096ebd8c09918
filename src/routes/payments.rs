use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};

use crate::{
    dto::payments::{
        FlutterwaveCallbackQuery, InitiatePaymentRequest, PaymentInitiated, PaypalCallbackParams,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    payments::CallbackReference,
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/flutterwave", post(initiate_flutterwave))
        .route(
            "/flutterwave/callback",
            get(flutterwave_callback).post(flutterwave_callback),
        )
        .route("/paypal", post(initiate_paypal))
        .route("/paypal/callback", post(paypal_callback))
}

#[utoipa::path(
    post,
    path = "/api/payments/flutterwave",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 200, description = "Payment registered, redirect target returned", body = ApiResponse<PaymentInitiated>),
        (status = 404, description = "No unpaid cart for this code"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn initiate_flutterwave(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<InitiatePaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentInitiated>>> {
    let resp =
        checkout_service::initiate_payment(&state, &state.flutterwave, &user, payload).await?;
    Ok(Json(resp))
}

// Flutterwave redirects the shopper here with everything in the query
// string, whichever method it uses.
#[utoipa::path(
    get,
    path = "/api/payments/flutterwave/callback",
    params(
        ("transaction_id" = Option<String>, Query, description = "Provider transaction id"),
        ("tx_ref" = Option<String>, Query, description = "Our transaction reference"),
        ("status" = Option<String>, Query, description = "Provider-reported redirect status"),
    ),
    responses(
        (status = 200, description = "Payment verified", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Missing parameters or unsuccessful status"),
        (status = 404, description = "Unknown transaction reference"),
    ),
    tag = "Payments"
)]
pub async fn flutterwave_callback(
    State(state): State<AppState>,
    Query(query): Query<FlutterwaveCallbackQuery>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let (Some(transaction_id), Some(tx_ref), Some(status)) = (
        query.transaction_id.as_deref(),
        query.tx_ref.as_deref(),
        query.status.as_deref(),
    ) else {
        return Err(AppError::BadRequest("Missing query parameters".to_string()));
    };

    if !checkout_service::is_successful_status(status) {
        return Err(AppError::BadRequest(
            "Payment was not successful".to_string(),
        ));
    }

    let callback = CallbackReference {
        payment_id: transaction_id,
        payer_id: None,
    };
    let resp =
        checkout_service::confirm_payment(&state, &state.flutterwave, tx_ref, callback).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/paypal",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 200, description = "Payment registered, approval URL returned", body = ApiResponse<PaymentInitiated>),
        (status = 404, description = "No unpaid cart for this code"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn initiate_paypal(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<InitiatePaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentInitiated>>> {
    let resp = checkout_service::initiate_payment(&state, &state.paypal, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/paypal/callback",
    request_body = PaypalCallbackParams,
    responses(
        (status = 200, description = "Payment executed and verified", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Missing identifiers or execution failed"),
        (status = 404, description = "Unknown transaction reference"),
    ),
    tag = "Payments"
)]
pub async fn paypal_callback(
    State(state): State<AppState>,
    Query(query): Query<PaypalCallbackParams>,
    body: Result<Json<PaypalCallbackParams>, JsonRejection>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    // PayPal's identifiers may arrive as redirect query params or in the
    // frontend's JSON follow-up; take either, body first.
    let body_params = body.map(|Json(p)| p).unwrap_or_default();
    let params = body_params.merged_with(query);

    let Some(reference) = params.reference.as_deref() else {
        return Err(AppError::BadRequest(
            "Invalid callback parameters".to_string(),
        ));
    };
    let (Some(payment_id), Some(payer_id)) =
        (params.payment_id.as_deref(), params.payer_id.as_deref())
    else {
        return Err(AppError::BadRequest(
            "Invalid callback parameters".to_string(),
        ));
    };

    let callback = CallbackReference {
        payment_id,
        payer_id: Some(payer_id),
    };
    let resp = checkout_service::confirm_payment(&state, &state.paypal, reference, callback).await?;
    Ok(Json(resp))
}
