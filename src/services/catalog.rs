//! Read-only snapshot of the food-composition table and resolver vocabulary.
//!
//! A [`FoodCatalog`] never changes once built. [`CatalogHandle`] hands out
//! `Arc` snapshots; a refresh swaps in a new catalog without touching the
//! ones requests are already using.

use std::path::Path;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::db::food_queries;
use crate::models::food::CanonicalFood;
use crate::services::normalize::normalize;
use crate::services::resolver::{resolve_normalized, Resolution};

/// Header text that some exports repeat inside the data rows.
const CSV_HEADER_MARKER: &str = "descrição dos alimentos";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Database error while loading foods: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to read food names file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Food catalog is empty")]
    Empty,
}

#[derive(Debug, Clone)]
struct IndexedName {
    name: String,
    normalized: String,
}

#[derive(Debug, Clone)]
struct IndexedFood {
    food: CanonicalFood,
    normalized: String,
}

/// Resolver vocabulary plus the nutrient records it is looked up against.
#[derive(Debug, Clone, Default)]
pub struct FoodCatalog {
    names: Vec<IndexedName>,
    foods: Vec<IndexedFood>,
}

impl FoodCatalog {
    /// Build a catalog whose vocabulary is exactly the food names.
    pub fn from_foods(foods: Vec<CanonicalFood>) -> Self {
        let names = foods.iter().map(|f| f.name.clone()).collect();
        Self::new(names, foods)
    }

    /// Build a catalog with a separate vocabulary, kept in the given order.
    pub fn new(names: Vec<String>, foods: Vec<CanonicalFood>) -> Self {
        let names = names
            .into_iter()
            .map(|name| IndexedName {
                normalized: normalize(&name),
                name,
            })
            .collect();
        let foods = foods
            .into_iter()
            .map(|food| IndexedFood {
                normalized: normalize(&food.name),
                food,
            })
            .collect();
        Self { names, foods }
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.name.as_str())
    }

    pub fn vocabulary_len(&self) -> usize {
        self.names.len()
    }

    pub fn food_count(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() || self.foods.is_empty()
    }

    /// Best vocabulary match for a candidate name.
    pub fn resolve(&self, candidate: &str) -> Resolution<'_> {
        let entries = self
            .names
            .iter()
            .map(|n| (n.name.as_str(), n.normalized.as_str()));
        resolve_normalized(&normalize(candidate), entries)
    }

    /// Food named exactly `fragment`, else the first food whose name contains
    /// it. Both comparisons ignore case and accents.
    pub fn find_by_name_fragment(&self, fragment: &str) -> Option<&CanonicalFood> {
        let needle = normalize(fragment);
        self.foods
            .iter()
            .find(|f| f.normalized == needle)
            .or_else(|| self.foods.iter().find(|f| f.normalized.contains(&needle)))
            .map(|f| &f.food)
    }
}

/// Shared, swappable pointer to the current catalog.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<FoodCatalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: FoodCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Consistent view for the duration of one request.
    pub async fn snapshot(&self) -> Arc<FoodCatalog> {
        self.current.read().await.clone()
    }

    pub async fn replace(&self, catalog: FoodCatalog) {
        *self.current.write().await = Arc::new(catalog);
    }
}

/// Load foods from PostgreSQL and, optionally, the vocabulary from a CSV file.
pub async fn load_catalog(
    pool: &PgPool,
    names_csv: Option<&Path>,
) -> Result<FoodCatalog, CatalogError> {
    let foods = food_queries::list_foods(pool).await?;

    let catalog = match names_csv {
        Some(path) => {
            let names = read_food_names(path)?;
            info!(path = %path.display(), names = names.len(), "Loaded food vocabulary from CSV");
            FoodCatalog::new(names, foods)
        }
        None => FoodCatalog::from_foods(foods),
    };

    if catalog.is_empty() {
        return Err(CatalogError::Empty);
    }

    info!(
        vocabulary = catalog.vocabulary_len(),
        foods = catalog.food_count(),
        "Food catalog loaded"
    );
    Ok(catalog)
}

/// Reload the catalog into `handle`. A failed reload keeps the previous one.
pub async fn refresh_catalog(handle: &CatalogHandle, pool: &PgPool, names_csv: Option<&Path>) {
    match load_catalog(pool, names_csv).await {
        Ok(catalog) => handle.replace(catalog).await,
        Err(e) => warn!(error = %e, "Catalog refresh failed, keeping previous snapshot"),
    }
}

/// Read the first column of a `;`-separated food table export.
pub fn read_food_names(path: &Path) -> Result<Vec<String>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(first) = record.get(0) else {
            continue;
        };
        let name = first.trim();
        if name.is_empty() || name.to_lowercase().contains(CSV_HEADER_MARKER) {
            continue;
        }
        names.push(name.to_string());
    }
    Ok(names)
}
