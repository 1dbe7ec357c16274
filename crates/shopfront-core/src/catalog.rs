//! # Catalog
//!
//! Client-side search and sort over a product list fetched from the backend.
//!
//! ## Matching
//! The query is trimmed and lowercased. A product matches when its name or
//! description contains the query, or when the query parses as a price equal
//! to the product's price (`"10"` matches $10.00). An empty query matches
//! every product.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;

/// Sort orders offered by the catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// Backend order.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 5] = [
        SortOption::Default,
        SortOption::PriceAsc,
        SortOption::PriceDesc,
        SortOption::NameAsc,
        SortOption::NameDesc,
    ];

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortOption::Default => Ordering::Equal,
            SortOption::PriceAsc => a.price.cmp(&b.price),
            SortOption::PriceDesc => b.price.cmp(&a.price),
            SortOption::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortOption::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOption::Default => "default",
            SortOption::PriceAsc => "price-asc",
            SortOption::PriceDesc => "price-desc",
            SortOption::NameAsc => "name-asc",
            SortOption::NameDesc => "name-desc",
        };
        f.write_str(name)
    }
}

impl FromStr for SortOption {
    type Err = ValidationError;

    /// Accepts `price-asc`, `price_asc` and `priceAsc` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "" | "default" => Ok(SortOption::Default),
            "priceasc" => Ok(SortOption::PriceAsc),
            "pricedesc" => Ok(SortOption::PriceDesc),
            "nameasc" => Ok(SortOption::NameAsc),
            "namedesc" => Ok(SortOption::NameDesc),
            _ => Err(ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: SortOption::ALL.iter().map(ToString::to_string).collect(),
            }),
        }
    }
}

/// Checks a single product against an already-normalized query.
fn matches(product: &Product, needle: &str, price: Option<Money>) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || price.is_some_and(|p| p == product.price)
}

/// Reads the query as an exact price. More than two decimals can never
/// equal a price in cents, so such queries match no price at all.
fn query_price(needle: &str) -> Option<Money> {
    match needle.split_once('.') {
        Some((_, frac)) if frac.len() > 2 => None,
        _ => Money::parse_decimal(needle),
    }
}

/// Filters products by a free-text query.
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }

    let price = query_price(&needle);
    products
        .iter()
        .filter(|p| matches(p, &needle, price))
        .collect()
}

/// Sorts products in place. The sort is stable, so `Default` keeps backend order.
pub fn sort(products: &mut [Product], option: SortOption) {
    products.sort_by(|a, b| option.compare(a, b));
}

/// Search, then sort: what the catalog view shows.
pub fn browse(products: &[Product], query: &str, option: SortOption) -> Vec<Product> {
    let mut found: Vec<Product> = search(products, query).into_iter().cloned().collect();
    sort(&mut found, option);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, description: &str, cents: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: description.to_string(),
            price: Money::from_cents(cents),
            stock: 1,
            is_active: true,
            created_at: None,
            updated_at: None,
            updated_by_email: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Desk Lamp", "Warm LED light", 2499),
            product(2, "coffee mug", "Ceramic, 300ml", 1000),
            product(3, "Notebook", "A5 dotted", 450),
        ]
    }

    #[test]
    fn test_search_by_name_description_and_price() {
        let products = catalog();

        let by_name: Vec<i64> = search(&products, "  LAMP ").iter().map(|p| p.id).collect();
        assert_eq!(by_name, vec![1]);

        let by_description: Vec<i64> = search(&products, "ceramic").iter().map(|p| p.id).collect();
        assert_eq!(by_description, vec![2]);

        let by_price: Vec<i64> = search(&products, "10").iter().map(|p| p.id).collect();
        assert_eq!(by_price, vec![2]);

        assert_eq!(search(&products, "").len(), 3);
        assert!(search(&products, "sofa").is_empty());
    }

    #[test]
    fn test_price_query_must_be_exact() {
        let products = catalog();

        assert_eq!(search(&products, "10.00").len(), 1);
        assert_eq!(search(&products, "24.99")[0].id, 1);
        assert!(search(&products, "10.004").is_empty());
        assert!(search(&products, "24.989").is_empty());
    }

    #[test]
    fn test_sort_options() {
        let ids = |option| -> Vec<i64> { browse(&catalog(), "", option).iter().map(|p| p.id).collect() };

        assert_eq!(ids(SortOption::Default), vec![1, 2, 3]);
        assert_eq!(ids(SortOption::PriceAsc), vec![3, 2, 1]);
        assert_eq!(ids(SortOption::PriceDesc), vec![1, 2, 3]);
        assert_eq!(ids(SortOption::NameAsc), vec![2, 1, 3]);
        assert_eq!(ids(SortOption::NameDesc), vec![3, 1, 2]);
    }

    #[test]
    fn test_sort_option_parsing() {
        assert_eq!("priceAsc".parse::<SortOption>().unwrap(), SortOption::PriceAsc);
        assert_eq!("name-desc".parse::<SortOption>().unwrap(), SortOption::NameDesc);
        assert_eq!("".parse::<SortOption>().unwrap(), SortOption::Default);
        assert!("newest".parse::<SortOption>().is_err());
    }
}
