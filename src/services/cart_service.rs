use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::cart::{AddItemRequest, CheckItemQuery, ExistsResponse, UpdateQuantityRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItemView, CartStat, CartView, Product, ProductRecord},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Debug, FromRow)]
struct CartRow {
    id: Uuid,
    cart_code: String,
    user_id: Option<Uuid>,
    paid: bool,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CartItemProductRow {
    item_id: Uuid,
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRecord,
}

const ITEM_COLUMNS: &str = "p.id, p.name, p.slug, p.image, p.description, p.price, p.category, p.created_at";

pub async fn add_item(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: AddItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.cart_code.trim().is_empty() {
        return Err(AppError::BadRequest("cart_code is required".to_string()));
    }
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let product_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exists.is_none() {
        return Err(AppError::NotFound);
    }

    // Get-or-create plus the quantity upsert run inside one transaction so
    // concurrent adds against the same code cannot interleave.
    let mut tx = state.pool.begin().await?;

    let cart: Option<CartRow> =
        sqlx::query_as("SELECT * FROM carts WHERE cart_code = $1 FOR UPDATE")
            .bind(&payload.cart_code)
            .fetch_optional(&mut *tx)
            .await?;

    let cart: CartRow = match cart {
        Some(c) => c,
        None => {
            sqlx::query_as("INSERT INTO carts (id, cart_code) VALUES ($1, $2) RETURNING *")
                .bind(Uuid::new_v4())
                .bind(&payload.cart_code)
                .fetch_one(&mut *tx)
                .await?
        }
    };

    if cart.paid {
        return Err(AppError::BadRequest("Cart is already paid for".to_string()));
    }

    // Attach the caller as owner of a so-far anonymous cart.
    if let (Some(user), None) = (user, cart.user_id) {
        sqlx::query("UPDATE carts SET user_id = $2 WHERE id = $1")
            .bind(cart.id)
            .bind(user.user_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO cart_items (id, cart_id, product_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (cart_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(cart.id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE carts SET modified_at = now() WHERE id = $1")
        .bind(cart.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    audit::record(
        &state.pool,
        user.map(|u| u.user_id),
        "cart_add_item",
        Some("cart_items"),
        Some(serde_json::json!({
            "cart_code": cart.cart_code,
            "product_id": payload.product_id,
            "quantity": payload.quantity,
        })),
    )
    .await;

    let cart = fetch_unpaid_cart(&state.pool, &cart.cart_code)
        .await?
        .ok_or(AppError::NotFound)?;
    let view = load_cart_view(state, cart).await?;
    Ok(ApiResponse::success("Item added to cart", view, None))
}

pub async fn check_item_in_cart(
    state: &AppState,
    query: CheckItemQuery,
) -> AppResult<ApiResponse<ExistsResponse>> {
    // Lookup misses (unknown code, paid cart, unknown product) report
    // `exists: false` instead of erroring; the storefront polls this while
    // browsing. Database failures still surface as errors.
    let not_there = || ApiResponse::success("OK", ExistsResponse { exists: false }, None);

    let Some(cart) = fetch_unpaid_cart(&state.pool, &query.cart_code).await? else {
        return Ok(not_there());
    };

    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(query.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product.is_none() {
        return Ok(not_there());
    }

    let item: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart.id)
            .bind(query.product_id)
            .fetch_optional(&state.pool)
            .await?;

    Ok(ApiResponse::success(
        "OK",
        ExistsResponse {
            exists: item.is_some(),
        },
        None,
    ))
}

pub async fn get_cart(state: &AppState, cart_code: &str) -> AppResult<ApiResponse<CartView>> {
    let cart = fetch_unpaid_cart(&state.pool, cart_code)
        .await?
        .ok_or(AppError::NotFound)?;
    let view = load_cart_view(state, cart).await?;
    Ok(ApiResponse::success("OK", view, None))
}

pub async fn get_cart_stat(state: &AppState, cart_code: &str) -> AppResult<ApiResponse<CartStat>> {
    let cart = fetch_unpaid_cart(&state.pool, cart_code)
        .await?
        .ok_or(AppError::NotFound)?;

    let (num_of_items,): (i64,) =
        sqlx::query_as("SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE cart_id = $1")
            .bind(cart.id)
            .fetch_one(&state.pool)
            .await?;

    Ok(ApiResponse::success(
        "OK",
        CartStat {
            id: cart.id,
            cart_code: cart.cart_code,
            num_of_items,
        },
        None,
    ))
}

pub async fn update_quantity(
    state: &AppState,
    item_id: Uuid,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartItemView>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    // Items of paid carts are frozen; the join filters them out.
    let updated: Option<(Uuid, i32, Uuid, Uuid)> = sqlx::query_as(
        r#"
        UPDATE cart_items ci
        SET quantity = $2
        FROM carts c
        WHERE ci.id = $1 AND c.id = ci.cart_id AND c.paid = FALSE
        RETURNING ci.id, ci.quantity, ci.product_id, ci.cart_id
        "#,
    )
    .bind(item_id)
    .bind(payload.quantity)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((id, quantity, product_id, cart_id)) = updated else {
        return Err(AppError::NotFound);
    };

    sqlx::query("UPDATE carts SET modified_at = now() WHERE id = $1")
        .bind(cart_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let record: ProductRecord = sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM products p WHERE p.id = $1"
    ))
    .bind(product_id)
    .fetch_one(&state.pool)
    .await?;

    let mut images = images_by_product(&state.pool, &[record.id]).await?;
    let product = Product::build(
        record,
        images.remove(&product_id).unwrap_or_default(),
        &state.media,
    );

    let item = CartItemView {
        id,
        total: product.price * Decimal::from(quantity),
        quantity,
        product,
    };
    Ok(ApiResponse::success(
        "Cart item updated successfully",
        item,
        None,
    ))
}

pub async fn delete_item(
    state: &AppState,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query(
        r#"
        DELETE FROM cart_items ci
        USING carts c
        WHERE ci.id = $1 AND c.id = ci.cart_id AND c.paid = FALSE
        "#,
    )
    .bind(item_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        None,
        "cart_remove_item",
        Some("cart_items"),
        Some(serde_json::json!({ "item_id": item_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Item removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn fetch_unpaid_cart(pool: &DbPool, cart_code: &str) -> AppResult<Option<CartRow>> {
    let cart = sqlx::query_as("SELECT * FROM carts WHERE cart_code = $1 AND paid = FALSE")
        .bind(cart_code)
        .fetch_optional(pool)
        .await?;
    Ok(cart)
}

async fn load_cart_view(state: &AppState, cart: CartRow) -> AppResult<CartView> {
    let rows: Vec<CartItemProductRow> = sqlx::query_as(&format!(
        r#"
        SELECT ci.id AS item_id, ci.quantity, {ITEM_COLUMNS}
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY p.name
        "#
    ))
    .bind(cart.id)
    .fetch_all(&state.pool)
    .await?;

    let product_ids: Vec<Uuid> = rows.iter().map(|r| r.product.id).collect();
    let mut images = images_by_product(&state.pool, &product_ids).await?;

    let items = rows
        .into_iter()
        .map(|row| {
            let extra = images.remove(&row.product.id).unwrap_or_default();
            let product = Product::build(row.product, extra, &state.media);
            CartItemView {
                id: row.item_id,
                total: product.price * Decimal::from(row.quantity),
                quantity: row.quantity,
                product,
            }
        })
        .collect();

    Ok(CartView::assemble(
        cart.id,
        cart.cart_code,
        cart.created_at,
        cart.modified_at,
        items,
    ))
}

async fn images_by_product(
    pool: &DbPool,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<(Uuid, String)>>> {
    let mut map: HashMap<Uuid, Vec<(Uuid, String)>> = HashMap::new();
    if ids.is_empty() {
        return Ok(map);
    }

    let rows: Vec<(Uuid, Uuid, String)> =
        sqlx::query_as("SELECT id, product_id, image FROM product_images WHERE product_id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(pool)
            .await?;
    for (id, product_id, image) in rows {
        map.entry(product_id).or_default().push((id, image));
    }
    Ok(map)
}
