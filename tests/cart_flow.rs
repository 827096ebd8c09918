use rust_decimal::Decimal;
use uuid::Uuid;

use shopnow_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::accounts::RegisterRequest,
    dto::cart::{AddItemRequest, CheckItemQuery, UpdateQuantityRequest},
    error::AppError,
    middleware::auth::AuthUser,
    models::Category,
    services::{account_service, cart_service, product_service::{self, NewProduct}},
    state::AppState,
};

// Integration flow over the cart and catalog services: seeded products go
// into a code-identified cart, quantities accumulate, derived totals match.
#[tokio::test]
async fn cart_accumulates_items_and_totals() -> anyhow::Result<()> {
    let Some(state) = setup().await? else {
        return Ok(());
    };

    let laptop = product_service::create_product(
        &state.orm,
        new_product("Test Laptop", "1000.00", Category::Electronics),
    )
    .await?;
    let mouse = product_service::create_product(
        &state.orm,
        new_product("Test Mouse", "499.99", Category::Accessory),
    )
    .await?;

    let cart_code = format!("cart-{}", Uuid::new_v4());

    // Same product twice: quantities add up on one row.
    cart_service::add_item(
        &state,
        None,
        AddItemRequest {
            cart_code: cart_code.clone(),
            product_id: laptop.id,
            quantity: 1,
        },
    )
    .await?;
    cart_service::add_item(
        &state,
        None,
        AddItemRequest {
            cart_code: cart_code.clone(),
            product_id: laptop.id,
            quantity: 1,
        },
    )
    .await?;
    cart_service::add_item(
        &state,
        None,
        AddItemRequest {
            cart_code: cart_code.clone(),
            product_id: mouse.id,
            quantity: 1,
        },
    )
    .await?;

    let cart = cart_service::get_cart(&state, &cart_code)
        .await?
        .data
        .expect("cart data");
    assert_eq!(cart.items.len(), 2);
    let laptop_line = cart
        .items
        .iter()
        .find(|i| i.product.id == laptop.id)
        .expect("laptop line");
    assert_eq!(laptop_line.quantity, 2);
    assert_eq!(cart.num_of_items, 3);
    assert_eq!(cart.sum_total, "2499.99".parse::<Decimal>()?);

    let stat = cart_service::get_cart_stat(&state, &cart_code)
        .await?
        .data
        .expect("stat data");
    assert_eq!(stat.num_of_items, 3);
    assert_eq!(stat.cart_code, cart_code);

    Ok(())
}

#[tokio::test]
async fn equal_product_names_get_distinct_slugs() -> anyhow::Result<()> {
    let Some(state) = setup().await? else {
        return Ok(());
    };

    let name = format!("Twin Widget {}", Uuid::new_v4());
    let first =
        product_service::create_product(&state.orm, new_product(&name, "10.00", Category::Others))
            .await?;
    let second =
        product_service::create_product(&state.orm, new_product(&name, "10.00", Category::Others))
            .await?;

    assert_ne!(first.slug, second.slug);
    assert!(second.slug.starts_with(&first.slug));

    Ok(())
}

#[tokio::test]
async fn existence_probe_degrades_to_false() -> anyhow::Result<()> {
    let Some(state) = setup().await? else {
        return Ok(());
    };

    let product = product_service::create_product(
        &state.orm,
        new_product("Probe Target", "5.00", Category::Groceries),
    )
    .await?;
    let cart_code = format!("cart-{}", Uuid::new_v4());
    cart_service::add_item(
        &state,
        None,
        AddItemRequest {
            cart_code: cart_code.clone(),
            product_id: product.id,
            quantity: 1,
        },
    )
    .await?;

    let hit = cart_service::check_item_in_cart(
        &state,
        CheckItemQuery {
            cart_code: cart_code.clone(),
            product_id: product.id,
        },
    )
    .await?;
    assert!(hit.data.expect("probe data").exists);

    // Unknown cart code: false, not an error.
    let miss = cart_service::check_item_in_cart(
        &state,
        CheckItemQuery {
            cart_code: format!("cart-{}", Uuid::new_v4()),
            product_id: product.id,
        },
    )
    .await?;
    assert!(!miss.data.expect("probe data").exists);

    // Unknown product: false, not an error.
    let miss = cart_service::check_item_in_cart(
        &state,
        CheckItemQuery {
            cart_code,
            product_id: Uuid::new_v4(),
        },
    )
    .await?;
    assert!(!miss.data.expect("probe data").exists);

    Ok(())
}

#[tokio::test]
async fn item_mutations_validate_and_404() -> anyhow::Result<()> {
    let Some(state) = setup().await? else {
        return Ok(());
    };

    let product = product_service::create_product(
        &state.orm,
        new_product("Mutable Widget", "15.00", Category::Others),
    )
    .await?;
    let cart_code = format!("cart-{}", Uuid::new_v4());

    // Zero quantity is rejected up front.
    let err = cart_service::add_item(
        &state,
        None,
        AddItemRequest {
            cart_code: cart_code.clone(),
            product_id: product.id,
            quantity: 0,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Unknown product resolves to 404.
    let err = cart_service::add_item(
        &state,
        None,
        AddItemRequest {
            cart_code: cart_code.clone(),
            product_id: Uuid::new_v4(),
            quantity: 1,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let cart = cart_service::add_item(
        &state,
        None,
        AddItemRequest {
            cart_code: cart_code.clone(),
            product_id: product.id,
            quantity: 2,
        },
    )
    .await?
    .data
    .expect("cart data");
    let item_id = cart.items[0].id;

    let updated = cart_service::update_quantity(
        &state,
        item_id,
        UpdateQuantityRequest { quantity: 7 },
    )
    .await?
    .data
    .expect("item data");
    assert_eq!(updated.quantity, 7);
    assert_eq!(
        updated.total,
        updated.product.price * Decimal::from(7)
    );

    cart_service::delete_item(&state, item_id).await?;
    let cart = cart_service::get_cart(&state, &cart_code)
        .await?
        .data
        .expect("cart data");
    assert!(cart.items.is_empty());

    // Deleting again is a 404 and disturbs nothing else.
    let err = cart_service::delete_item(&state, item_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn registration_round_trips_profile_without_password() -> anyhow::Result<()> {
    let Some(state) = setup().await? else {
        return Ok(());
    };

    let marker = Uuid::new_v4().simple().to_string();
    let username = format!("shopper_{marker}");
    let email = format!("{username}@example.com");

    let profile = account_service::register_user(
        &state.pool,
        RegisterRequest {
            username: username.clone(),
            email: email.clone(),
            password: "hunter2hunter2".into(),
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            city: "Ibadan".into(),
            state: "Oyo".into(),
            address: "12 Ring Road".into(),
            phone: "+2348012345678".into(),
        },
    )
    .await?
    .data
    .expect("profile data");

    let user = AuthUser {
        user_id: profile.id,
    };
    let info = account_service::user_info(&state, &user)
        .await?
        .data
        .expect("user info");

    assert_eq!(info.profile.username, username);
    assert_eq!(info.profile.email, email);
    assert_eq!(info.profile.city, "Ibadan");
    assert_eq!(info.profile.phone, "+2348012345678");
    assert!(info.items.is_empty());

    // Nothing password-shaped leaves the serializer.
    let as_json = serde_json::to_value(&info.profile)?;
    let keys: Vec<&String> = as_json.as_object().expect("object").keys().collect();
    assert!(keys.iter().all(|k| !k.contains("password")));

    // Duplicate username is rejected.
    let err = account_service::register_user(
        &state.pool,
        RegisterRequest {
            username,
            email: format!("other_{marker}@example.com"),
            password: "hunter2hunter2".into(),
            first_name: String::new(),
            last_name: String::new(),
            city: String::new(),
            state: String::new(),
            address: String::new(),
            phone: String::new(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

fn new_product(name: &str, price: &str, category: Category) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: Some("integration test product".to_string()),
        price: price.parse().expect("decimal price"),
        category,
        image: None,
        extra_images: Vec::new(),
    }
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
