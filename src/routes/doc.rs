use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        accounts::{LoginRequest, LoginResponse, RegisterRequest, UserInfo, UsernameResponse},
        cart::{AddItemRequest, ExistsResponse, UpdateQuantityRequest},
        payments::{
            FlutterwaveCallbackQuery, InitiatePaymentRequest, PaymentInitiated,
            PaypalCallbackParams,
        },
        products::{ProductDetail, ProductList},
    },
    models::{
        CartItemView, CartStat, CartView, Category, Product, ProductImage, PurchasedItem,
        UserProfile,
    },
    response::{ApiResponse, Meta},
    routes::{auth, cart, health, params, payments, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::product_detail,
        cart::add_item,
        cart::check_item_in_cart,
        cart::get_cart,
        cart::get_cart_stat,
        cart::update_quantity,
        cart::delete_item,
        auth::register,
        auth::login,
        auth::username,
        auth::me,
        payments::initiate_flutterwave,
        payments::flutterwave_callback,
        payments::initiate_paypal,
        payments::paypal_callback
    ),
    components(
        schemas(
            Category,
            Product,
            ProductImage,
            ProductList,
            ProductDetail,
            CartView,
            CartItemView,
            CartStat,
            PurchasedItem,
            UserProfile,
            UserInfo,
            UsernameResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddItemRequest,
            UpdateQuantityRequest,
            ExistsResponse,
            InitiatePaymentRequest,
            PaymentInitiated,
            FlutterwaveCallbackQuery,
            PaypalCallbackParams,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<CartView>,
            ApiResponse<CartStat>,
            ApiResponse<UserInfo>,
            ApiResponse<PaymentInitiated>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Auth", description = "Account endpoints"),
        (name = "Payments", description = "Checkout and payment gateway endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
