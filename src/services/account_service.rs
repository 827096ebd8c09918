use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::accounts::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserInfo, UsernameResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, ProductRecord, PurchasedItem, User, UserProfile},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// How many purchased lines the profile view carries.
const HISTORY_LIMIT: i64 = 10;

pub async fn register_user(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    if payload.username.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(AppError::BadRequest(
            "username, email and password are required".to_string(),
        ));
    }

    let taken: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2")
            .bind(payload.username.as_str())
            .bind(payload.email.as_str())
            .fetch_optional(pool)
            .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest(
            "Username or email is already taken".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash,
                           first_name, last_name, city, state, address, phone)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.username.as_str())
    .bind(payload.email.as_str())
    .bind(password_hash)
    .bind(payload.first_name.as_str())
    .bind(payload.last_name.as_str())
    .bind(payload.city.as_str())
    .bind(payload.state.as_str())
    .bind(payload.address.as_str())
    .bind(payload.phone.as_str())
    .fetch_one(pool)
    .await?;

    audit::record(
        pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "User created successfully",
        UserProfile::from(user),
        None,
    ))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username.as_str())
        .fetch_optional(pool)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid username or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    audit::record(
        pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_username(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<UsernameResponse>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT username FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;
    let (username,) = row.ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "OK",
        UsernameResponse { username },
        None,
    ))
}

#[derive(Debug, FromRow)]
struct PurchasedItemRow {
    item_id: Uuid,
    quantity: i32,
    order_id: String,
    order_date: DateTime<Utc>,
    #[sqlx(flatten)]
    product: ProductRecord,
}

pub async fn user_info(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserInfo>> {
    let account: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?;
    let account = account.ok_or(AppError::NotFound)?;

    let rows: Vec<PurchasedItemRow> = sqlx::query_as(
        r#"
        SELECT ci.id AS item_id, ci.quantity,
               c.cart_code AS order_id, c.modified_at AS order_date,
               p.id, p.name, p.slug, p.image, p.description, p.price, p.category, p.created_at
        FROM cart_items ci
        JOIN carts c ON c.id = ci.cart_id
        JOIN products p ON p.id = ci.product_id
        WHERE c.user_id = $1 AND c.paid = TRUE
        ORDER BY c.modified_at DESC
        LIMIT $2
        "#,
    )
    .bind(user.user_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(&state.pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| PurchasedItem {
            id: row.item_id,
            product: Product::build(row.product, Vec::new(), &state.media),
            quantity: row.quantity,
            order_id: row.order_id,
            order_date: row.order_date,
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        UserInfo {
            profile: UserProfile::from(account),
            items,
        },
        None,
    ))
}
