use serde::{Deserialize, Serialize};

/// Quantity assumed when the extractor gives none, or an unusable one.
pub const DEFAULT_QUANTITY_GRAMS: f64 = 100.0;

/// One row of the food-composition table. Values are per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CanonicalFood {
    #[sqlx(rename = "nome_alimento")]
    pub name: String,
    #[sqlx(rename = "calorias")]
    pub calories_per_100g: f64,
    #[sqlx(rename = "proteina")]
    pub protein_per_100g: f64,
    #[sqlx(rename = "carboidrato")]
    pub carbs_per_100g: f64,
    #[sqlx(rename = "gordura")]
    pub fat_per_100g: f64,
}

/// A food named by the extraction step, not yet matched against the table.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateItem {
    pub raw_name: String,
    pub quantity_grams: f64,
}

impl CandidateItem {
    /// Build a candidate, falling back to 100 g for missing, negative or
    /// non-finite quantities.
    pub fn new(raw_name: impl Into<String>, quantity_grams: Option<f64>) -> Self {
        Self {
            raw_name: raw_name.into(),
            quantity_grams: sanitize_quantity(quantity_grams),
        }
    }
}

/// Clamp an optional gram quantity to something usable for scaling.
pub fn sanitize_quantity(quantity_grams: Option<f64>) -> f64 {
    match quantity_grams {
        Some(q) if q.is_finite() && q >= 0.0 => q,
        _ => DEFAULT_QUANTITY_GRAMS,
    }
}
