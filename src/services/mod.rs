pub mod account_service;
pub mod cart_service;
pub mod checkout_service;
pub mod product_service;
