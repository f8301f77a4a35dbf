//! Shared test data: a small food table and a scripted extractor.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use meal_nutrition::models::food::CanonicalFood;
use meal_nutrition::services::catalog::FoodCatalog;
use meal_nutrition::services::extraction::{CandidateExtractor, ExtractionError};

/// (name, kcal, protein, carbs, fat) per 100 g.
pub const FOODS: &[(&str, f64, f64, f64, f64)] = &[
    ("Arroz, integral, cozido", 124.0, 2.6, 25.8, 1.0),
    ("Arroz, tipo 1, cozido", 128.0, 2.5, 28.1, 0.2),
    ("Aveia, flocos, crua", 394.0, 13.9, 66.6, 8.5),
    ("Banana, nanica, crua", 92.0, 1.4, 23.8, 0.1),
    ("Banana, prata, crua", 98.0, 1.3, 26.0, 0.1),
    ("Feijão, carioca, cozido", 76.0, 4.8, 13.6, 0.5),
    ("Leite, de vaca, integral", 61.0, 3.2, 4.7, 3.3),
    ("Ovo, galinha, cozido", 155.0, 13.3, 0.6, 9.5),
    ("Pão, trigo, francês", 300.0, 8.0, 58.6, 3.1),
];

pub fn sample_foods() -> Vec<CanonicalFood> {
    FOODS
        .iter()
        .map(|&(name, kcal, protein, carbs, fat)| CanonicalFood {
            name: name.to_string(),
            calories_per_100g: kcal,
            protein_per_100g: protein,
            carbs_per_100g: carbs,
            fat_per_100g: fat,
        })
        .collect()
}

pub fn sample_catalog() -> FoodCatalog {
    FoodCatalog::from_foods(sample_foods())
}

pub fn food(name: &str) -> CanonicalFood {
    sample_foods()
        .into_iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no fixture food named {name}"))
}

/// Extractor that replays a fixed response and records how it was called.
pub struct ScriptedExtractor {
    response: Option<String>,
    calls: AtomicUsize,
    last_vocabulary_len: Mutex<Option<usize>>,
}

impl ScriptedExtractor {
    pub fn replying(raw: &str) -> Self {
        Self {
            response: Some(raw.to_string()),
            calls: AtomicUsize::new(0),
            last_vocabulary_len: Mutex::new(None),
        }
    }

    /// Always fails with [`ExtractionError::EmptyResponse`].
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
            last_vocabulary_len: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_vocabulary_len(&self) -> Option<usize> {
        *self.last_vocabulary_len.lock().unwrap()
    }
}

#[async_trait]
impl CandidateExtractor for ScriptedExtractor {
    async fn extract(&self, _meal_text: &str, vocabulary: &[&str]) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_vocabulary_len.lock().unwrap() = Some(vocabulary.len());
        self.response.clone().ok_or(ExtractionError::EmptyResponse)
    }
}

/// Serialize `(name, grams)` pairs the way the model is asked to answer.
pub fn extraction_json(items: &[(&str, f64)]) -> String {
    let records: Vec<serde_json::Value> = items
        .iter()
        .map(|(name, grams)| serde_json::json!({ "alimento": name, "quantidade": grams }))
        .collect();
    serde_json::to_string_pretty(&records).unwrap()
}
