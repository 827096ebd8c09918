use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::media::MediaResolver;

/// Fixed catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Electronics,
    Groceries,
    Clothings,
    Cars,
    Accessory,
    Phones,
    Others,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Electronics,
        Category::Groceries,
        Category::Clothings,
        Category::Cars,
        Category::Accessory,
        Category::Phones,
        Category::Others,
    ];

    /// Stored database value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "ELECTRONICS",
            Category::Groceries => "GROCERIES",
            Category::Clothings => "CLOTHINGS",
            Category::Cars => "CARS",
            Category::Accessory => "ACCESSORY",
            Category::Phones => "PHONES",
            Category::Others => "OTHERS",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Groceries => "Groceries",
            Category::Clothings => "Clothings",
            Category::Cars => "Cars",
            Category::Accessory => "Accessory",
            Category::Phones => "Phones",
            Category::Others => "Others",
        }
    }

    /// Parse a stored value; anything unrecognized lands in `Others`.
    pub fn from_db(value: &str) -> Category {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .unwrap_or(Category::Others)
    }
}

/// A product row as stored, shared between the sqlx and SeaORM read paths.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub image: String,
}

/// Catalog view of a product: media references resolved, price formatted,
/// category expanded to its display label.
#[derive(Debug, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub formatted_price: String,
    pub category: Category,
    pub category_display: String,
    pub extra_images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn build(
        record: ProductRecord,
        extra_images: Vec<(Uuid, String)>,
        media: &MediaResolver,
    ) -> Self {
        let category = Category::from_db(&record.category);
        Self {
            id: record.id,
            name: record.name,
            slug: record.slug,
            image: media.url(record.image.as_deref()),
            description: record.description,
            formatted_price: format_amount(record.price),
            price: record.price,
            category,
            category_display: category.label().to_string(),
            extra_images: extra_images
                .into_iter()
                .map(|(id, reference)| ProductImage {
                    id,
                    image: media.url(Some(&reference)),
                })
                .collect(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemView {
    pub id: Uuid,
    pub quantity: i32,
    pub product: Product,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub id: Uuid,
    pub cart_code: String,
    pub items: Vec<CartItemView>,
    pub sum_total: Decimal,
    pub num_of_items: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CartView {
    pub fn assemble(
        id: Uuid,
        cart_code: String,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
        items: Vec<CartItemView>,
    ) -> Self {
        let sum_total = items.iter().map(|i| i.total).sum();
        let num_of_items = items.iter().map(|i| i64::from(i.quantity)).sum();
        Self {
            id,
            cart_code,
            items,
            sum_total,
            num_of_items,
            created_at,
            modified_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartStat {
    pub id: Uuid,
    pub cart_code: String,
    pub num_of_items: i64,
}

/// A previously purchased cart line, surfaced in the account's history.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchasedItem {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
    pub order_id: String,
    pub order_date: DateTime<Utc>,
}

/// A user row as stored. Never serialized directly; responses go through
/// [`UserProfile`] so the password hash cannot leak.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            city: user.city,
            state: user.state,
            address: user.address,
            phone: user.phone,
        }
    }
}

/// Format an amount with comma grouping and two decimal places, e.g.
/// `67000000` becomes `67,000,000.00`.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let raw = rounded.abs().to_string();
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i.to_string(), format!("{f:0<2}")),
        None => (raw, "00".to_string()),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_grouping_and_two_decimals() {
        assert_eq!(format_amount(Decimal::new(6_700_000_000, 2)), "67,000,000.00");
        assert_eq!(format_amount(Decimal::new(249_999, 2)), "2,499.99");
        assert_eq!(format_amount(Decimal::from(1000)), "1,000.00");
        assert_eq!(format_amount(Decimal::new(5, 1)), "0.50");
    }

    #[test]
    fn unknown_category_values_fall_back_to_others() {
        assert_eq!(Category::from_db("ELECTRONICS"), Category::Electronics);
        assert_eq!(Category::from_db("VINTAGE"), Category::Others);
    }

    #[test]
    fn category_display_labels() {
        assert_eq!(Category::Phones.label(), "Phones");
        assert_eq!(Category::Phones.as_str(), "PHONES");
    }
}
