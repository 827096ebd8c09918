use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddItemRequest, CartCodeQuery, CheckItemQuery, ExistsResponse, UpdateQuantityRequest},
    error::AppResult,
    middleware::auth::OptionalAuthUser,
    models::{CartItemView, CartStat, CartView},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/stat", get(get_cart_stat))
        .route("/items", post(add_item))
        .route("/items/check", get(check_item_in_cart))
        .route("/items/{item_id}", patch(update_quantity).delete(delete_item))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Item added, full cart returned", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity or cart already paid"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::add_item(&state, user.as_ref(), payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/items/check",
    params(
        ("cart_code" = String, Query, description = "Cart code"),
        ("product_id" = Uuid, Query, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Whether the product sits in the unpaid cart", body = ApiResponse<ExistsResponse>)
    ),
    tag = "Cart"
)]
pub async fn check_item_in_cart(
    State(state): State<AppState>,
    Query(query): Query<CheckItemQuery>,
) -> AppResult<Json<ApiResponse<ExistsResponse>>> {
    let resp = cart_service::check_item_in_cart(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(
        ("cart_code" = String, Query, description = "Cart code"),
    ),
    responses(
        (status = 200, description = "Full cart view", body = ApiResponse<CartView>),
        (status = 404, description = "No unpaid cart for this code"),
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Query(query): Query<CartCodeQuery>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::get_cart(&state, &query.cart_code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/stat",
    params(
        ("cart_code" = String, Query, description = "Cart code"),
    ),
    responses(
        (status = 200, description = "Cart summary", body = ApiResponse<CartStat>),
        (status = 404, description = "No unpaid cart for this code"),
    ),
    tag = "Cart"
)]
pub async fn get_cart_stat(
    State(state): State<AppState>,
    Query(query): Query<CartCodeQuery>,
) -> AppResult<Json<ApiResponse<CartStat>>> {
    let resp = cart_service::get_cart_stat(&state, &query.cart_code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Cart item ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Updated cart item", body = ApiResponse<CartItemView>),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartItemView>>> {
    let resp = cart_service::update_quantity(&state, item_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "Cart"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::delete_item(&state, item_id).await?;
    Ok(Json(resp))
}
