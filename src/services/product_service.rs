use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    dto::products::{ProductDetail, ProductList},
    entity::{
        product_images::{
            ActiveModel as ProductImageActive, Column as ImageCol, Entity as ProductImages,
        },
        products::{ActiveModel as ProductActive, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Category, Product, ProductRecord},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    slug::{slugify, with_suffix},
    state::AppState,
};

/// How many same-category products a detail view carries.
const SIMILAR_LIMIT: u64 = 5;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, page_size, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern.clone()))
                .add(Expr::col(Column::Category).ilike(pattern)),
        );
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(page_size as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = build_views(state, models).await?;

    let meta = Meta::new(page, page_size, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product_detail(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let model = Products::find()
        .filter(Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let similar_models = Products::find()
        .filter(Column::Category.eq(model.category.clone()))
        .filter(Column::Id.ne(model.id))
        .limit(SIMILAR_LIMIT)
        .all(&state.orm)
        .await?;

    let mut views = build_views(state, vec![model]).await?;
    let Some(product) = views.pop() else {
        return Err(AppError::NotFound);
    };
    let similar_products = build_views(state, similar_models).await?;

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product,
            similar_products,
        },
        None,
    ))
}

/// Catalog entry as accepted by [`create_product`].
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Category,
    pub image: Option<String>,
    pub extra_images: Vec<String>,
}

/// Insert a product, deriving a unique slug from its name. The slug is
/// assigned here once and never rewritten afterwards.
pub async fn create_product(orm: &OrmConn, input: NewProduct) -> AppResult<ProductModel> {
    let slug = unique_slug(orm, &input.name).await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        slug: Set(slug),
        image: Set(input.image),
        description: Set(input.description),
        price: Set(input.price),
        category: Set(input.category.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    for reference in input.extra_images {
        ProductImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            image: Set(reference),
        }
        .insert(orm)
        .await?;
    }

    Ok(product)
}

async fn unique_slug(orm: &OrmConn, name: &str) -> AppResult<String> {
    let base = slugify(name);
    let mut counter = 0u32;
    loop {
        let candidate = with_suffix(&base, counter);
        let taken = Products::find()
            .filter(Column::Slug.eq(candidate.as_str()))
            .count(orm)
            .await?
            > 0;
        if !taken {
            return Ok(candidate);
        }
        counter += 1;
    }
}

async fn build_views(state: &AppState, models: Vec<ProductModel>) -> AppResult<Vec<Product>> {
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

    let mut images_by_product: HashMap<Uuid, Vec<(Uuid, String)>> = HashMap::new();
    if !ids.is_empty() {
        let images = ProductImages::find()
            .filter(ImageCol::ProductId.is_in(ids))
            .all(&state.orm)
            .await?;
        for image in images {
            images_by_product
                .entry(image.product_id)
                .or_default()
                .push((image.id, image.image));
        }
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let extra = images_by_product.remove(&model.id).unwrap_or_default();
            Product::build(record_from_entity(model), extra, &state.media)
        })
        .collect())
}

pub(crate) fn record_from_entity(model: ProductModel) -> ProductRecord {
    ProductRecord {
        id: model.id,
        name: model.name,
        slug: model.slug,
        image: model.image,
        description: model.description,
        price: model.price,
        category: model.category,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
