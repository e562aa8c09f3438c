//! Root of the SeaORM entity modules for the storefront: the catalog,
//! orders with their lines, and the back-office accounts.

pub mod admin_user;
pub mod order;
pub mod order_item;
pub mod product;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::admin_user::Entity as AdminUser;
    pub use super::order::Entity as Order;
    pub use super::order_item::Entity as OrderItem;
    pub use super::product::Entity as Product;
}
