pub mod audit_logs;
pub mod cart_items;
pub mod carts;
pub mod product_images;
pub mod products;
pub mod transactions;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
pub use transactions::Entity as Transactions;
pub use users::Entity as Users;
