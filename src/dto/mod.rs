pub mod accounts;
pub mod cart;
pub mod payments;
pub mod products;
