use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::de::DeserializeOwned;
use shared::SearchResults;

use super::model::{Category, Product};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only catalog shared by the search endpoints and the result resolver.
/// Loaded once at startup; lookups never mutate it.
pub struct CatalogRegistry {
    categories: Vec<Category>,
    products: Vec<Product>,
}

impl CatalogRegistry {
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            categories,
            products,
        }
    }

    /// Loads the catalog from `categories.json` and `products.json` in the
    /// given directory. A missing or unparsable file leaves that part of
    /// the catalog empty; startup continues either way.
    pub fn load_from_dir(dir: &Path) -> Self {
        let categories = load_rows(&dir.join("categories.json")).unwrap_or_else(|e| {
            warn!("Skipping category import: {}", e);
            Vec::new()
        });
        let products = load_rows(&dir.join("products.json")).unwrap_or_else(|e| {
            warn!("Skipping product import: {}", e);
            Vec::new()
        });
        info!(
            "Catalog loaded - {} categories, {} products",
            categories.len(),
            products.len()
        );
        Self::new(categories, products)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Upper bound of the label domain shared with the inference engine.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Categories and products for a set of predicted labels. Labels with no
    /// catalog row are ignored.
    pub fn resolve_labels(&self, labels: &[u32]) -> SearchResults {
        SearchResults {
            categories: self
                .categories
                .iter()
                .filter(|c| labels.contains(&c.id))
                .map(|c| c.name.clone())
                .collect(),
            products: self
                .products
                .iter()
                .filter(|p| labels.contains(&p.category_id))
                .map(Into::into)
                .collect(),
        }
    }

    /// Categories whose name occurs in the lowercased query, with their
    /// products.
    pub fn search_text(&self, query: &str) -> SearchResults {
        let query = query.to_lowercase();
        let matched: Vec<u32> = self
            .categories
            .iter()
            .filter(|c| !query.is_empty() && query.contains(&c.name.to_lowercase()))
            .map(|c| c.id)
            .collect();
        self.resolve_labels(&matched)
    }
}

fn load_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
