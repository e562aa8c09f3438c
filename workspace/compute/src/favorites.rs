//! Favorites list, keyed by product.

use model::entities::product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub product_id: i32,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
}

impl From<&product::Model> for FavoriteItem {
    fn from(product: &product::Model) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.images.as_slice().first().cloned(),
        }
    }
}

/// Favorites in the order they were added. A product appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Favorites {
    items: Vec<FavoriteItem>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the product was already a favorite.
    pub fn add(&mut self, product: &product::Model) -> bool {
        if self.contains(product.id) {
            return false;
        }
        self.items.push(FavoriteItem::from(product));
        true
    }

    pub fn remove(&mut self, product_id: i32) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.items.len() != before
    }

    /// Flips the favorite state and returns the new one.
    pub fn toggle(&mut self, product: &product::Model) -> bool {
        if self.remove(product.id) {
            false
        } else {
            self.add(product)
        }
    }

    pub fn contains(&self, product_id: i32) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }

    pub fn items(&self) -> &[FavoriteItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::catalog;

    #[test]
    fn test_add_is_idempotent() {
        let products = catalog();
        let mut favorites = Favorites::new();

        assert!(favorites.add(&products[0]));
        assert!(!favorites.add(&products[0]));
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites.items()[0].name, products[0].name);
    }

    #[test]
    fn test_toggle() {
        let products = catalog();
        let mut favorites = Favorites::new();

        assert!(favorites.toggle(&products[1]));
        assert!(favorites.contains(products[1].id));
        assert!(!favorites.toggle(&products[1]));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_keeps_insertion_order() {
        let products = catalog();
        let mut favorites = Favorites::new();
        favorites.add(&products[3]);
        favorites.add(&products[0]);
        favorites.add(&products[5]);
        assert!(favorites.remove(products[0].id));
        assert!(!favorites.remove(products[0].id));

        let ids: Vec<i32> = favorites.items().iter().map(|f| f.product_id).collect();
        assert_eq!(ids, vec![products[3].id, products[5].id]);
    }
}
