//! Dashboard figures computed over both collections.

use crate::domain::model::{Category, Product};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryCount {
    pub id: i64,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CatalogStats {
    pub total_products: usize,
    pub total_categories: usize,
    /// Rounded to two decimals; 0 when there are no products.
    pub average_price: f64,
    pub total_value: f64,
    /// Every category in store order, including empty ones.
    pub products_by_category: Vec<CategoryCount>,
    /// Products whose `categoryid` matches no category, keyed by that raw id.
    pub uncategorized: BTreeMap<i64, usize>,
}

impl CatalogStats {
    pub fn compute(categories: &[Category], products: &[Product]) -> Self {
        let total_value: f64 = products.iter().map(|p| p.price).sum();
        let average_price = if products.is_empty() {
            0.0
        } else {
            total_value / products.len() as f64
        };

        let products_by_category = categories
            .iter()
            .map(|c| CategoryCount {
                id: c.id,
                name: c.name.clone(),
                count: products.iter().filter(|p| p.categoryid == c.id).count(),
            })
            .collect();

        let known: HashSet<i64> = categories.iter().map(|c| c.id).collect();
        let mut uncategorized = BTreeMap::new();
        for p in products.iter().filter(|p| !known.contains(&p.categoryid)) {
            *uncategorized.entry(p.categoryid).or_insert(0) += 1;
        }

        Self {
            total_products: products.len(),
            total_categories: categories.len(),
            average_price: round2(average_price),
            total_value: round2(total_value),
            products_by_category,
            uncategorized,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, categoryid: i64, price: f64) -> Product {
        Product {
            id,
            name: format!("p{}", id),
            categoryid,
            price,
        }
    }

    #[test]
    fn empty_catalog_has_zero_average() {
        let stats = CatalogStats::compute(&[], &[]);
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.average_price, 0.0);
        assert_eq!(stats.total_value, 0.0);
        assert!(stats.products_by_category.is_empty());
    }

    #[test]
    fn counts_per_category_and_dangling_references() {
        let categories = vec![
            Category { id: 1, name: "Books".into() },
            Category { id: 2, name: "Games".into() },
        ];
        let products = vec![
            product(1, 1, 10.0),
            product(2, 1, 5.5),
            product(3, 9, 1.0),
            product(4, 9, 2.0),
        ];

        let stats = CatalogStats::compute(&categories, &products);
        assert_eq!(stats.total_products, 4);
        assert_eq!(stats.total_categories, 2);
        assert_eq!(stats.total_value, 18.5);
        assert_eq!(stats.average_price, 4.63);
        assert_eq!(stats.products_by_category[0].count, 2);
        assert_eq!(stats.products_by_category[1].count, 0);
        assert_eq!(stats.uncategorized.get(&9), Some(&2));
    }
}
