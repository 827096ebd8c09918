use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::payments::{InitiatePaymentRequest, PaymentInitiated},
    entity::{
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts},
        transactions::{ActiveModel as TransactionActive, Column as TxCol, Entity as Transactions},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    payments::{CallbackReference, CreatePayment, PaymentProvider},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_COMPLETED: &str = "completed";

/// Flat tax added to every checkout total.
pub fn checkout_tax() -> Decimal {
    Decimal::new(1_000_00, 2)
}

/// Redirect statuses a provider reports that are worth verifying at all.
/// Anything else fails the callback without touching any state.
pub fn is_successful_status(status: &str) -> bool {
    matches!(status, "completed" | "successful")
}

/// Start a checkout: price the cart, register the payment with the gateway,
/// and persist a pending transaction once the gateway has accepted it.
///
/// Creating the provider payment first means a rejected create leaves no
/// transaction row behind; there is nothing to reconcile later.
pub async fn initiate_payment<P: PaymentProvider>(
    state: &AppState,
    provider: &P,
    user: &AuthUser,
    payload: InitiatePaymentRequest,
) -> AppResult<ApiResponse<PaymentInitiated>> {
    if payload.cart_code.trim().is_empty() {
        return Err(AppError::BadRequest("cart_code is required".to_string()));
    }

    let cart = Carts::find()
        .filter(CartCol::CartCode.eq(payload.cart_code.as_str()))
        .filter(CartCol::Paid.eq(false))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let account: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?;
    let account = account.ok_or(AppError::NotFound)?;

    let (subtotal,): (Decimal,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(p.price * ci.quantity), 0)
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        "#,
    )
    .bind(cart.id)
    .fetch_one(&state.pool)
    .await?;

    let total = subtotal + checkout_tax();
    let reference = Uuid::new_v4().to_string();

    // Not retried: create is not idempotent on the provider side and a blind
    // retry could charge the shopper twice.
    let created = provider
        .create_payment(CreatePayment {
            reference: &reference,
            amount: total,
            customer_email: &account.email,
            customer_name: &account.username,
            customer_phone: &account.phone,
        })
        .await?;

    TransactionActive {
        id: Set(Uuid::new_v4()),
        reference: Set(reference.clone()),
        user_id: Set(user.user_id),
        cart_id: Set(cart.id),
        amount: Set(total),
        currency: Set(provider.currency().to_string()),
        status: Set(STATUS_PENDING.to_string()),
        created_at: NotSet,
        modified_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "payment_initiated",
        Some("transactions"),
        Some(serde_json::json!({
            "provider": provider.name(),
            "reference": reference,
            "amount": total,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment initiated",
        PaymentInitiated {
            reference,
            payment_url: created.redirect_url,
        },
        None,
    ))
}

/// Finish a checkout from a provider callback: verify with the gateway, then
/// atomically mark the transaction completed and the cart paid.
///
/// A transaction that is already completed is acknowledged as a success
/// without another verify round-trip, so a provider delivering the same
/// callback twice is harmless.
pub async fn confirm_payment<P: PaymentProvider>(
    state: &AppState,
    provider: &P,
    reference: &str,
    callback: CallbackReference<'_>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let transaction = Transactions::find()
        .filter(TxCol::Reference.eq(reference))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if transaction.status == STATUS_COMPLETED {
        return Ok(verified_response(reference));
    }

    // Verification is an idempotent read on the provider, so one retry on a
    // pure transport failure is safe. Anything else is final.
    if let Err(err) = provider.verify_payment(callback).await {
        if err.is_transport() {
            tracing::warn!(
                provider = provider.name(),
                error = %err,
                "payment verification transport failure, retrying once"
            );
            provider.verify_payment(callback).await?;
        } else {
            return Err(err.into());
        }
    }

    let txn = state.orm.begin().await?;

    let locked = Transactions::find_by_id(transaction.id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if locked.status != STATUS_COMPLETED {
        let cart_id = locked.cart_id;

        let mut active: TransactionActive = locked.into();
        active.status = Set(STATUS_COMPLETED.to_string());
        active.modified_at = Set(Utc::now().into());
        active.update(&txn).await?;

        let cart = Carts::find_by_id(cart_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut cart_active: CartActive = cart.into();
        cart_active.paid = Set(true);
        cart_active.modified_at = Set(Utc::now().into());
        cart_active.update(&txn).await?;
    }

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(transaction.user_id),
        "payment_completed",
        Some("transactions"),
        Some(serde_json::json!({
            "provider": provider.name(),
            "reference": reference,
        })),
    )
    .await;

    Ok(verified_response(reference))
}

fn verified_response(reference: &str) -> ApiResponse<serde_json::Value> {
    ApiResponse::success(
        "Payment verified successfully",
        serde_json::json!({ "reference": reference }),
        Some(Meta::empty()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_provider_success_statuses_pass_the_gate() {
        assert!(is_successful_status("completed"));
        assert!(is_successful_status("successful"));
        assert!(!is_successful_status("cancelled"));
        assert!(!is_successful_status("failed"));
        assert!(!is_successful_status(""));
        assert!(!is_successful_status("COMPLETED"));
    }

    #[test]
    fn tax_is_a_fixed_thousand() {
        assert_eq!(checkout_tax(), Decimal::new(100_000, 2));
        assert_eq!(checkout_tax().to_string(), "1000.00");
    }
}
