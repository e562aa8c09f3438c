//! Category browsing: filtering and sorting of the catalog.
//!
//! Filters are plain values recomputed on every request. A product is kept
//! only when it passes every active filter, so combining filters always
//! narrows the result to their intersection.

use std::cmp::Ordering;
use std::str::FromStr;

use model::entities::product::{self, Gender};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};

/// Storefront category route segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySlug {
    Homme,
    Femme,
    Enfant,
}

impl CategorySlug {
    /// Parses a route segment. Unknown slugs browse the whole catalog, so they yield `None`.
    pub fn parse(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "homme" => Some(Self::Homme),
            "femme" => Some(Self::Femme),
            "enfant" => Some(Self::Enfant),
            _ => None,
        }
    }

    /// Kids' t-shirts are catalogued as unisex.
    pub fn gender(&self) -> Gender {
        match self {
            Self::Homme => Gender::Homme,
            Self::Femme => Gender::Femme,
            Self::Enfant => Gender::Unisexe,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Homme => "T-Shirts Homme",
            Self::Femme => "T-Shirts Femme",
            Self::Enfant => "T-Shirts Enfant",
        }
    }
}

/// Page title for a category, or the catch-all title when browsing everything.
pub fn category_title(category: Option<CategorySlug>) -> &'static str {
    category.map_or("Tous les T-Shirts", |c| c.title())
}

/// Active catalog filters. Empty lists and `None` bounds are inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<CategorySlug>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Keep products offering at least one of these colors.
    pub colors: Vec<String>,
    /// Keep products offering at least one of these sizes.
    pub sizes: Vec<String>,
    pub featured: Option<bool>,
}

impl ProductFilter {
    pub fn matches_category(&self, product: &product::Model) -> bool {
        self.category
            .is_none_or(|category| product.gender == category.gender())
    }

    pub fn matches(&self, product: &product::Model) -> bool {
        let price_in_range = self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max);
        let color_match = self.colors.is_empty()
            || self
                .colors
                .iter()
                .any(|c| product.colors.contains_ignore_case(c));
        let size_match = self.sizes.is_empty()
            || self
                .sizes
                .iter()
                .any(|s| product.sizes.contains_ignore_case(s));
        let featured_match = self
            .featured
            .is_none_or(|featured| product.is_featured == featured);

        self.matches_category(product) && price_in_range && color_match && size_match && featured_match
    }

    /// Returns the products passing every active filter, in input order.
    pub fn apply(&self, products: &[product::Model]) -> Vec<product::Model> {
        products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect()
    }
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Alphabetical by name, ignoring case.
    #[default]
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "price-low")]
    PriceLow,
    #[serde(rename = "price-high")]
    PriceHigh,
    #[serde(rename = "newest")]
    Newest,
}

impl FromStr for SortOrder {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(Self::Name),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "newest" => Ok(Self::Newest),
            other => Err(ComputeError::UnknownSortOrder(other.to_string())),
        }
    }
}

impl SortOrder {
    fn compare(&self, a: &product::Model, b: &product::Model) -> Ordering {
        let primary = match self {
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::PriceLow => a.price.cmp(&b.price),
            Self::PriceHigh => b.price.cmp(&a.price),
            Self::Newest => b.created_at.cmp(&a.created_at),
        };
        // Ties keep a stable, deterministic order
        primary.then_with(|| a.id.cmp(&b.id))
    }

    pub fn sort(&self, products: &mut [product::Model]) {
        products.sort_by(|a, b| self.compare(a, b));
    }
}

/// Filters then sorts a catalog snapshot.
#[instrument(skip(products), fields(num_products = products.len()))]
pub fn browse(
    products: &[product::Model],
    filter: &ProductFilter,
    sort: SortOrder,
) -> Vec<product::Model> {
    let mut selected = filter.apply(products);
    sort.sort(&mut selected);
    debug!("Selected {} of {} products", selected.len(), products.len());
    selected
}

/// Distinct colors and sizes offered, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

/// Facets of the products in `category` (or the whole catalog).
pub fn facets(products: &[product::Model], category: Option<CategorySlug>) -> Facets {
    let scope = ProductFilter {
        category,
        ..Default::default()
    };
    let mut facets = Facets::default();
    for product in products.iter().filter(|p| scope.matches_category(p)) {
        for color in product.colors.as_slice() {
            if !facets.colors.contains(color) {
                facets.colors.push(color.clone());
            }
        }
        for size in product.sizes.as_slice() {
            if !facets.sizes.contains(size) {
                facets.sizes.push(size.clone());
            }
        }
    }
    facets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::catalog;

    fn ids(products: &[product::Model]) -> Vec<i32> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_slug_parsing() {
        assert_eq!(CategorySlug::parse("homme"), Some(CategorySlug::Homme));
        assert_eq!(CategorySlug::parse("FEMME"), Some(CategorySlug::Femme));
        assert_eq!(CategorySlug::parse("enfant"), Some(CategorySlug::Enfant));
        assert_eq!(CategorySlug::parse("accessoires"), None);
        assert_eq!(category_title(None), "Tous les T-Shirts");
    }

    #[test]
    fn test_enfant_maps_to_unisex_products() {
        let filter = ProductFilter {
            category: Some(CategorySlug::Enfant),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&catalog())), vec![9, 10]);
    }

    #[test]
    fn test_no_filters_returns_everything() {
        let products = catalog();
        assert_eq!(ProductFilter::default().apply(&products).len(), products.len());
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let filter = ProductFilter {
            min_price: Some(Decimal::new(28, 0)),
            max_price: Some(Decimal::new(35, 0)),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&catalog())), vec![1, 5, 6]);
    }

    #[test]
    fn test_color_filter_matches_any_selected_color() {
        let filter = ProductFilter {
            colors: vec!["Rose".to_string(), "Bordeaux".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&catalog())), vec![3, 5, 6]);
    }

    #[test]
    fn test_combined_filters_return_intersection() {
        let products = catalog();
        let filter = ProductFilter {
            category: Some(CategorySlug::Homme),
            min_price: Some(Decimal::new(30, 0)),
            max_price: Some(Decimal::new(50, 0)),
            colors: vec!["noir".to_string()],
            sizes: vec!["XXL".to_string()],
            featured: None,
        };

        let combined = ids(&filter.apply(&products));

        // Each filter on its own, intersected by hand
        let singles = [
            ProductFilter { category: filter.category, ..Default::default() },
            ProductFilter { min_price: filter.min_price, max_price: filter.max_price, ..Default::default() },
            ProductFilter { colors: filter.colors.clone(), ..Default::default() },
            ProductFilter { sizes: filter.sizes.clone(), ..Default::default() },
        ];
        let expected: Vec<i32> = products
            .iter()
            .filter(|p| singles.iter().all(|f| f.matches(p)))
            .map(|p| p.id)
            .collect();

        assert_eq!(combined, expected);
        assert_eq!(combined, vec![1]);
    }

    #[test]
    fn test_featured_filter() {
        let filter = ProductFilter {
            featured: Some(true),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&catalog())), vec![1]);
    }

    #[test]
    fn test_sort_orders() {
        let products = catalog();

        let by_price = browse(&products, &ProductFilter::default(), SortOrder::PriceLow);
        assert_eq!(ids(&by_price), vec![9, 10, 6, 5, 1, 2, 3]);

        let by_price_desc = browse(&products, &ProductFilter::default(), SortOrder::PriceHigh);
        assert_eq!(ids(&by_price_desc), vec![3, 2, 1, 5, 6, 10, 9]);

        let newest = browse(&products, &ProductFilter::default(), SortOrder::Newest);
        assert_eq!(newest[0].id, 10);

        let by_name = browse(&products, &ProductFilter::default(), SortOrder::Name);
        assert_eq!(by_name[0].name, "T-Shirt Classique Homme Noir");
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("price-low".parse::<SortOrder>().unwrap(), SortOrder::PriceLow);
        assert_eq!("newest".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert!(matches!(
            "cheapest".parse::<SortOrder>(),
            Err(ComputeError::UnknownSortOrder(_))
        ));
    }

    #[test]
    fn test_facets_are_unique_and_ordered() {
        let facets = facets(&catalog(), Some(CategorySlug::Enfant));
        assert_eq!(facets.colors, vec!["Rouge", "Bleu", "Jaune", "Vert", "Noir"]);
        assert_eq!(facets.sizes, vec!["2-3 ans", "4-5 ans", "6-7 ans"]);
    }
}
