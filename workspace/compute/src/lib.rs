//! Storefront domain logic kept independent of the HTTP layer.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod favorites;
pub mod invoice;
pub mod money;

#[cfg(test)]
mod testing;

pub use cart::{Cart, CartKey, CartLine};
pub use catalog::{CategorySlug, Facets, ProductFilter, SortOrder};
pub use error::{ComputeError, Result};
pub use favorites::Favorites;
pub use invoice::Invoice;
