use serde::{Deserialize, Serialize};
use shared::{CategorySummary, ProductSummary};

/// Catalog category row.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

/// Catalog product row.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Product {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category_id: u32,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
        }
    }
}
