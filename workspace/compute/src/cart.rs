//! Shopping cart: a flat list of lines keyed by product and variant.
//!
//! The cart is an owned value. The storefront keeps one per visitor and
//! checkout builds one from the submitted items to price the order.

use std::fmt;

use model::entities::product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ComputeError, Result};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Identifies a cart line: the same product in another size or color is another line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartKey {
    pub product_id: i32,
    pub size: String,
    pub color: String,
}

impl CartKey {
    pub fn new(product_id: i32, size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            product_id,
            size: size.into(),
            color: color.into(),
        }
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.product_id, self.size, self.color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub key: CartKey,
    pub name: String,
    pub unit_price: Decimal,
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

/// Resolves `requested` against the product's offered values, returning the
/// product's own spelling. Products offering nothing accept any value.
fn resolve_option(
    product_id: i32,
    kind: &'static str,
    offered: &product::StringList,
    requested: &str,
) -> Result<String> {
    if offered.is_empty() {
        return Ok(requested.to_string());
    }
    offered
        .as_slice()
        .iter()
        .find(|v| v.eq_ignore_ascii_case(requested))
        .cloned()
        .ok_or_else(|| ComputeError::UnavailableOption {
            product_id,
            kind,
            value: requested.to_string(),
        })
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of a product variant, merging into an existing line.
    pub fn add(
        &mut self,
        product: &product::Model,
        size: &str,
        color: &str,
        quantity: u32,
    ) -> Result<&CartLine> {
        if quantity == 0 || quantity > MAX_LINE_QUANTITY {
            return Err(ComputeError::InvalidQuantity {
                product_id: product.id,
                quantity: i64::from(quantity),
            });
        }
        let size = resolve_option(product.id, "size", &product.sizes, size)?;
        let color = resolve_option(product.id, "color", &product.colors, color)?;
        let key = CartKey::new(product.id, size, color);

        let index = match self.lines.iter().position(|line| line.key == key) {
            Some(index) => {
                let line = &mut self.lines[index];
                let merged = line
                    .quantity
                    .checked_add(quantity)
                    .filter(|q| *q <= MAX_LINE_QUANTITY)
                    .ok_or(ComputeError::InvalidQuantity {
                        product_id: product.id,
                        quantity: i64::from(line.quantity) + i64::from(quantity),
                    })?;
                line.quantity = merged;
                index
            }
            None => {
                self.lines.push(CartLine {
                    key,
                    name: product.name.clone(),
                    unit_price: product.price,
                    image: product.images.as_slice().first().cloned(),
                    quantity,
                });
                self.lines.len() - 1
            }
        };
        Ok(&self.lines[index])
    }

    /// Sets a line's quantity, clamped to `1..=MAX_LINE_QUANTITY`; use
    /// [`Cart::remove`] to take a line out. Returns false for an unknown key.
    pub fn update_quantity(&mut self, key: &CartKey, quantity: i64) -> bool {
        match self.lines.iter_mut().find(|line| &line.key == key) {
            Some(line) => {
                line.quantity = u32::try_from(quantity.clamp(1, i64::from(MAX_LINE_QUANTITY)))
                    .unwrap_or(MAX_LINE_QUANTITY);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &CartKey) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| &line.key == key)?;
        Some(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn get(&self, key: &CartKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.key == key)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of units across all lines.
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::product;
    use model::entities::product::Gender;

    fn tee() -> product::Model {
        product(1, "T-Shirt Classique", 35_000, Gender::Homme, &["S", "M", "L"], &["Noir", "Blanc"])
    }

    #[test]
    fn test_add_merges_same_variant() {
        let mut cart = Cart::new();
        let tee = tee();

        cart.add(&tee, "M", "Noir", 1).unwrap();
        cart.add(&tee, "m", "noir", 2).unwrap();
        cart.add(&tee, "L", "Noir", 1).unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.lines()[0].key.to_string(), "1-M-Noir");
        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.total_price(), Decimal::new(140, 0));
    }

    #[test]
    fn test_add_rejects_unoffered_variant() {
        let mut cart = Cart::new();
        let err = cart.add(&tee(), "XXL", "Noir", 1).unwrap_err();
        assert!(matches!(err, ComputeError::UnavailableOption { kind: "size", .. }));

        let err = cart.add(&tee(), "M", "Rose", 1).unwrap_err();
        assert!(matches!(err, ComputeError::UnavailableOption { kind: "color", .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let mut cart = Cart::new();
        let err = cart.add(&tee(), "M", "Noir", 0).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_line_quantity_is_bounded() {
        let mut cart = Cart::new();
        let tee = tee();

        let err = cart.add(&tee, "M", "Noir", 3_000_000_000).unwrap_err();
        assert!(err.is_client_error());
        assert!(cart.is_empty());

        cart.add(&tee, "M", "Noir", MAX_LINE_QUANTITY).unwrap();
        let err = cart.add(&tee, "M", "Noir", 1).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InvalidQuantity { quantity, .. } if quantity == i64::from(MAX_LINE_QUANTITY) + 1
        ));
        assert_eq!(cart.lines()[0].quantity, MAX_LINE_QUANTITY);

        let key = cart.lines()[0].key.clone();
        assert!(cart.update_quantity(&key, i64::MAX));
        assert_eq!(cart.get(&key).unwrap().quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_quantity_never_goes_below_one() {
        let mut cart = Cart::new();
        let key = cart.add(&tee(), "S", "Blanc", 2).unwrap().key.clone();

        assert!(cart.update_quantity(&key, 1));
        assert!(cart.update_quantity(&key, 0));
        assert_eq!(cart.get(&key).unwrap().quantity, 1);

        assert!(cart.update_quantity(&key, -5));
        assert_eq!(cart.get(&key).unwrap().quantity, 1);

        assert!(cart.update_quantity(&key, 4));
        assert_eq!(cart.get(&key).unwrap().quantity, 4);
    }

    #[test]
    fn test_update_unknown_line() {
        let mut cart = Cart::new();
        assert!(!cart.update_quantity(&CartKey::new(42, "M", "Noir"), 3));
    }

    #[test]
    fn test_removing_last_item_empties_cart() {
        let mut cart = Cart::new();
        let key = cart.add(&tee(), "M", "Noir", 2).unwrap().key.clone();

        let removed = cart.remove(&key).unwrap();
        assert_eq!(removed.quantity, 2);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert!(cart.remove(&key).is_none());
    }

    #[test]
    fn test_products_without_options_accept_any_variant() {
        let plain = product(7, "Plain", 10_000, Gender::Unisexe, &[], &[]);
        let mut cart = Cart::new();
        cart.add(&plain, "", "", 1).unwrap();
        assert_eq!(cart.lines()[0].key, CartKey::new(7, "", ""));
    }

    #[test]
    fn test_cart_survives_serialization() {
        let mut cart = Cart::new();
        cart.add(&tee(), "M", "Noir", 2).unwrap();
        let stored = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&tee(), "M", "Noir", 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
    }
}
