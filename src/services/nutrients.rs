//! Quantity scaling and meal totals.

use crate::models::food::{sanitize_quantity, CanonicalFood};
use crate::models::meal::{MealTotals, NutrientValues, ResolvedItem};

/// Scale a food's per-100 g profile to `quantity_grams`. No rounding.
pub fn project(food: &CanonicalFood, quantity_grams: f64) -> NutrientValues {
    let q = sanitize_quantity(Some(quantity_grams));
    NutrientValues {
        kcal: food.calories_per_100g * q / 100.0,
        protein: food.protein_per_100g * q / 100.0,
        carbs: food.carbs_per_100g * q / 100.0,
        fat: food.fat_per_100g * q / 100.0,
    }
}

/// Running sum of every item, in order. Unresolved rows add zero.
pub fn aggregate(items: &[ResolvedItem]) -> MealTotals {
    items.iter().fold(MealTotals::default(), |acc, item| MealTotals {
        kcal: acc.kcal + item.nutrients.kcal,
        protein: acc.protein + item.nutrients.protein,
        carbs: acc.carbs + item.nutrients.carbs,
        fat: acc.fat + item.nutrients.fat,
    })
}
