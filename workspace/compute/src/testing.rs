//! Product fixtures shared by the compute unit tests.

use chrono::{TimeZone, Utc};
use model::entities::product::{self, Gender, StringList};
use rust_decimal::Decimal;

fn list(values: &[&str]) -> StringList {
    StringList(values.iter().map(|v| v.to_string()).collect())
}

/// Builds an in-memory product; `price_millimes` is the price in thousandths of a dinar.
pub fn product(
    id: i32,
    name: &str,
    price_millimes: i64,
    gender: Gender,
    sizes: &[&str],
    colors: &[&str],
) -> product::Model {
    product::Model {
        id,
        name: name.to_string(),
        description: format!("{name} description"),
        price: Decimal::new(price_millimes, 3),
        category: "T-Shirts".to_string(),
        gender,
        images: list(&[&format!("https://img.example/{id}.jpeg")]),
        sizes: list(sizes),
        colors: list(colors),
        stock_quantity: 10,
        is_featured: false,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::days(id as i64),
    }
}

/// A small catalog mirroring the launch collection.
pub fn catalog() -> Vec<product::Model> {
    let mut featured = product(
        1,
        "T-Shirt Classique Homme Noir",
        35_000,
        Gender::Homme,
        &["S", "M", "L", "XL", "XXL"],
        &["Noir", "Blanc", "Gris", "Marine"],
    );
    featured.is_featured = true;

    vec![
        featured,
        product(2, "T-Shirt Graphique Homme Sport", 42_000, Gender::Homme, &["S", "M", "L", "XL"], &["Blanc", "Noir", "Rouge", "Bleu"]),
        product(3, "T-Shirt Polo Homme Élégant", 55_000, Gender::Homme, &["S", "M", "L", "XL", "XXL"], &["Marine", "Blanc", "Gris", "Bordeaux"]),
        product(5, "T-Shirt Femme Basique Coton", 32_000, Gender::Femme, &["XS", "S", "M", "L", "XL"], &["Rose", "Blanc", "Noir", "Lavande"]),
        product(6, "T-Shirt Femme Crop Top", 28_000, Gender::Femme, &["XS", "S", "M", "L"], &["Blanc", "Rose", "Jaune", "Menthe"]),
        product(9, "T-Shirt Enfant Coloré", 22_000, Gender::Unisexe, &["2-3 ans", "4-5 ans", "6-7 ans"], &["Rouge", "Bleu", "Jaune", "Vert"]),
        product(10, "T-Shirt Enfant Superhéros", 25_000, Gender::Unisexe, &["2-3 ans", "4-5 ans"], &["Bleu", "Rouge", "Noir"]),
    ]
}
