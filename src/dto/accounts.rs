use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{PurchasedItem, UserProfile};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsernameResponse {
    pub username: String,
}

/// Profile plus the caller's most recent purchases.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub items: Vec<PurchasedItem>,
}
