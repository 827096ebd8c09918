use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use shopnow_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::cart::AddItemRequest,
    dto::payments::InitiatePaymentRequest,
    entity::{
        carts::Entity as Carts,
        transactions::{Column as TxCol, Entity as Transactions},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::Category,
    payments::{
        CallbackReference, CreatePayment, PaymentCreated, PaymentProvider, ProviderError,
    },
    services::{
        account_service, cart_service, checkout_service,
        product_service::{self, NewProduct},
    },
    state::AppState,
};

/// Stand-in gateway: records the created amount, succeeds or fails on demand.
#[derive(Clone, Default)]
struct MockProvider {
    fail_create: bool,
    fail_verify: bool,
    created_amount: Arc<Mutex<Option<Decimal>>>,
}

impl PaymentProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn currency(&self) -> &'static str {
        "NGN"
    }

    async fn create_payment(
        &self,
        request: CreatePayment<'_>,
    ) -> Result<PaymentCreated, ProviderError> {
        if self.fail_create {
            return Err(ProviderError::Api {
                status: 400,
                details: serde_json::json!({ "error": "card declined" }),
            });
        }
        *self.created_amount.lock().unwrap() = Some(request.amount);
        Ok(PaymentCreated {
            redirect_url: format!("https://pay.example.com/{}", request.reference),
        })
    }

    async fn verify_payment(
        &self,
        _callback: CallbackReference<'_>,
    ) -> Result<(), ProviderError> {
        if self.fail_verify {
            Err(ProviderError::Rejected {
                details: serde_json::json!({ "status": "failed" }),
            })
        } else {
            Ok(())
        }
    }
}

// Full happy path: cart -> initiate -> provider callback -> paid cart, plus
// the idempotent second callback.
#[tokio::test]
async fn checkout_completes_and_second_callback_is_noop() -> anyhow::Result<()> {
    let Some(state) = setup().await? else {
        return Ok(());
    };

    let (user, cart_code) = seed_cart(&state, "5000.00", 1).await?;
    let provider = MockProvider::default();

    let initiated = checkout_service::initiate_payment(
        &state,
        &provider,
        &user,
        InitiatePaymentRequest {
            cart_code: cart_code.clone(),
        },
    )
    .await?
    .data
    .expect("payment data");
    assert!(initiated.payment_url.contains(&initiated.reference));

    // Subtotal 5000.00 plus the flat 1000.00 tax.
    let expected_total = "6000.00".parse::<Decimal>()?;
    assert_eq!(
        provider.created_amount.lock().unwrap().expect("created"),
        expected_total
    );

    let transaction = Transactions::find()
        .filter(TxCol::Reference.eq(initiated.reference.as_str()))
        .one(&state.orm)
        .await?
        .expect("transaction row");
    assert_eq!(transaction.status, checkout_service::STATUS_PENDING);
    assert_eq!(transaction.amount, expected_total);
    assert_eq!(transaction.currency, "NGN");

    let callback = CallbackReference {
        payment_id: "prov-123",
        payer_id: None,
    };
    checkout_service::confirm_payment(&state, &provider, &initiated.reference, callback).await?;

    let transaction = Transactions::find_by_id(transaction.id)
        .one(&state.orm)
        .await?
        .expect("transaction row");
    assert_eq!(transaction.status, checkout_service::STATUS_COMPLETED);

    let cart = Carts::find_by_id(transaction.cart_id)
        .one(&state.orm)
        .await?
        .expect("cart row");
    assert!(cart.paid);

    // Delivering the same callback again acknowledges without complaint and
    // changes nothing.
    let resp =
        checkout_service::confirm_payment(&state, &provider, &initiated.reference, callback)
            .await?;
    assert_eq!(resp.message, "Payment verified successfully");

    // The paid cart now shows up in the buyer's purchase history and is gone
    // from the cart endpoints.
    let info = account_service::user_info(&state, &user)
        .await?
        .data
        .expect("user info");
    assert_eq!(info.items.len(), 1);
    assert_eq!(info.items[0].order_id, cart_code);

    let err = cart_service::get_cart(&state, &cart_code).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn rejected_create_leaves_no_transaction() -> anyhow::Result<()> {
    let Some(state) = setup().await? else {
        return Ok(());
    };

    let (user, cart_code) = seed_cart(&state, "1500.00", 2).await?;
    let provider = MockProvider {
        fail_create: true,
        ..MockProvider::default()
    };

    let err = checkout_service::initiate_payment(
        &state,
        &provider,
        &user,
        InitiatePaymentRequest {
            cart_code: cart_code.clone(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Provider { status: 400, .. }));

    // Nothing was persisted for the failed attempt.
    let count = Transactions::find()
        .filter(TxCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 0);

    Ok(())
}

#[tokio::test]
async fn failed_verification_mutates_nothing() -> anyhow::Result<()> {
    let Some(state) = setup().await? else {
        return Ok(());
    };

    let (user, cart_code) = seed_cart(&state, "250.00", 1).await?;
    let provider = MockProvider::default();

    let initiated = checkout_service::initiate_payment(
        &state,
        &provider,
        &user,
        InitiatePaymentRequest { cart_code },
    )
    .await?
    .data
    .expect("payment data");

    let failing = MockProvider {
        fail_verify: true,
        ..MockProvider::default()
    };
    let callback = CallbackReference {
        payment_id: "prov-456",
        payer_id: None,
    };
    let err =
        checkout_service::confirm_payment(&state, &failing, &initiated.reference, callback)
            .await
            .unwrap_err();
    assert!(matches!(err, AppError::Provider { status: 400, .. }));

    let transaction = Transactions::find()
        .filter(TxCol::Reference.eq(initiated.reference.as_str()))
        .one(&state.orm)
        .await?
        .expect("transaction row");
    assert_eq!(transaction.status, checkout_service::STATUS_PENDING);

    let cart = Carts::find_by_id(transaction.cart_id)
        .one(&state.orm)
        .await?
        .expect("cart row");
    assert!(!cart.paid);

    Ok(())
}

#[tokio::test]
async fn unknown_reference_is_not_found() -> anyhow::Result<()> {
    let Some(state) = setup().await? else {
        return Ok(());
    };

    let provider = MockProvider::default();
    let callback = CallbackReference {
        payment_id: "prov-789",
        payer_id: None,
    };
    let err = checkout_service::confirm_payment(
        &state,
        &provider,
        &Uuid::new_v4().to_string(),
        callback,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

/// Register a buyer and fill a fresh cart with `quantity` of one product.
async fn seed_cart(
    state: &AppState,
    price: &str,
    quantity: i32,
) -> anyhow::Result<(AuthUser, String)> {
    let marker = Uuid::new_v4().simple().to_string();
    let profile = account_service::register_user(
        &state.pool,
        shopnow_api::dto::accounts::RegisterRequest {
            username: format!("buyer_{marker}"),
            email: format!("buyer_{marker}@example.com"),
            password: "hunter2hunter2".into(),
            first_name: String::new(),
            last_name: String::new(),
            city: String::new(),
            state: String::new(),
            address: String::new(),
            phone: "+2348000000001".into(),
        },
    )
    .await?
    .data
    .expect("profile data");
    let user = AuthUser {
        user_id: profile.id,
    };

    let product = product_service::create_product(
        &state.orm,
        NewProduct {
            name: format!("Checkout Widget {marker}"),
            description: None,
            price: price.parse()?,
            category: Category::Electronics,
            image: None,
            extra_images: Vec::new(),
        },
    )
    .await?;

    let cart_code = format!("cart-{marker}");
    cart_service::add_item(
        state,
        Some(&user),
        AddItemRequest {
            cart_code: cart_code.clone(),
            product_id: product.id,
            quantity,
        },
    )
    .await?;

    Ok((user, cart_code))
}

// Allow skipping when no DB is configured in the environment.
async fn setup() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        frontend_base_url: "http://localhost:3000".into(),
        flutterwave_api_base: "http://localhost:9".into(),
        flutterwave_secret_key: String::new(),
        paypal_api_base: "http://localhost:9".into(),
        paypal_client_id: String::new(),
        paypal_secret: String::new(),
        media_base_url: "https://cdn.example.com".into(),
    };
    Ok(Some(AppState::new(pool, orm, &config)?))
}
