use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use shopnow_api::{
    config::AppConfig,
    db::{OrmConn, create_orm_conn, create_pool},
    entity::products::{Column as ProductCol, Entity as Products},
    models::Category,
    services::product_service::{self, NewProduct},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_id = ensure_user(&pool, "dammy", "dammy@example.com", "shopnow123").await?;
    seed_products(&orm).await?;

    println!("Seed completed. Demo user ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, city, state, address, phone)
        VALUES ($1, $2, $3, $4, 'Lagos', 'Lagos', '1 Marina Road', '+2348000000000')
        ON CONFLICT (username) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If the user already exists, fetch its id.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {username}");
    Ok(user_id)
}

async fn seed_products(orm: &OrmConn) -> anyhow::Result<()> {
    let products = vec![
        (
            "Wireless Headphones",
            "Over-ear, 30h battery",
            Decimal::new(45_000_00, 2),
            Category::Electronics,
        ),
        (
            "Smartphone X2",
            "128GB, dual SIM",
            Decimal::new(320_000_00, 2),
            Category::Phones,
        ),
        (
            "Leather Sneakers",
            "Handmade, sizes 39-46",
            Decimal::new(28_500_00, 2),
            Category::Clothings,
        ),
        (
            "Rice 10kg",
            "Long grain parboiled",
            Decimal::new(12_000_00, 2),
            Category::Groceries,
        ),
        (
            "Phone Case",
            "Shockproof, clear",
            Decimal::new(3_500_00, 2),
            Category::Accessory,
        ),
    ];

    for (name, desc, price, category) in products {
        let exists = Products::find()
            .filter(ProductCol::Name.eq(name))
            .count(orm)
            .await?
            > 0;
        if exists {
            continue;
        }

        product_service::create_product(
            orm,
            NewProduct {
                name: name.to_string(),
                description: Some(desc.to_string()),
                price,
                category,
                image: None,
                extra_images: Vec::new(),
            },
        )
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
