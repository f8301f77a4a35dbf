use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize};

/// Marker attached to rows whose food could not be matched.
pub const UNRESOLVED_NOTICE: &str = "Alimento não encontrado no banco";

/// Body of `POST /analisar-refeicao`.
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeMealRequest {
    /// Free-text meal description. Absent and `null` both read as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    #[garde(length(max = 4000), custom(not_blank))]
    pub texto: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("meal description must not be empty"));
    }
    Ok(())
}

/// Macronutrients for a given quantity of food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientValues {
    pub kcal: f64,
    #[serde(rename = "proteina")]
    pub protein: f64,
    #[serde(rename = "carbo")]
    pub carbs: f64,
    #[serde(rename = "gordura")]
    pub fat: f64,
}

/// One output row: a candidate after resolution and scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedItem {
    #[serde(rename = "alimento")]
    pub display_name: String,
    #[serde(rename = "quantidade")]
    pub quantity_grams: f64,
    #[serde(flatten)]
    pub nutrients: NutrientValues,
    /// Best similarity seen while resolving, whether or not it was accepted.
    #[serde(rename = "similaridade")]
    pub match_score: f64,
    #[serde(rename = "aviso", skip_serializing_if = "Option::is_none", default)]
    pub notice: Option<String>,
}

impl ResolvedItem {
    pub fn resolved(
        canonical_name: impl Into<String>,
        quantity_grams: f64,
        nutrients: NutrientValues,
        match_score: f64,
    ) -> Self {
        Self {
            display_name: canonical_name.into(),
            quantity_grams,
            nutrients,
            match_score,
            notice: None,
        }
    }

    /// Placeholder row for a candidate with no usable match. Nutrients are zero.
    pub fn unresolved(raw_name: impl Into<String>, quantity_grams: f64, match_score: f64) -> Self {
        Self {
            display_name: raw_name.into(),
            quantity_grams,
            nutrients: NutrientValues::default(),
            match_score,
            notice: Some(UNRESOLVED_NOTICE.to_string()),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.notice.is_some()
    }
}

/// Sum of every row's nutrients for one meal.
pub type MealTotals = NutrientValues;

/// Response payload for a meal analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealAnalysis {
    #[serde(rename = "itens")]
    pub items: Vec<ResolvedItem>,
    #[serde(rename = "totais")]
    pub totals: MealTotals,
    /// Non-fatal issues, such as extraction output that only parsed leniently.
    #[serde(rename = "avisos", skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_rejected() {
        let req = AnalyzeMealRequest { texto: "   \n".to_string() };
        assert!(req.validate().is_err());

        let req = AnalyzeMealRequest { texto: String::new() };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_text_accepted() {
        let req = AnalyzeMealRequest { texto: "2 ovos cozidos".to_string() };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_missing_field_deserializes_empty() {
        let req: AnalyzeMealRequest = serde_json::from_str("{}").unwrap();
        assert!(req.texto.is_empty());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_null_field_deserializes_empty() {
        let req: AnalyzeMealRequest = serde_json::from_str(r#"{"texto": null}"#).unwrap();
        assert!(req.texto.is_empty());
        assert!(req.validate().is_err());

        // Other wrong types are still rejected by the deserializer.
        assert!(serde_json::from_str::<AnalyzeMealRequest>(r#"{"texto": 42}"#).is_err());
    }

    #[test]
    fn test_unresolved_item_serialization() {
        let item = ResolvedItem::unresolved("xyzxyz", 50.0, 0.1);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["alimento"], "xyzxyz");
        assert_eq!(json["quantidade"], 50.0);
        assert_eq!(json["kcal"], 0.0);
        assert_eq!(json["proteina"], 0.0);
        assert_eq!(json["carbo"], 0.0);
        assert_eq!(json["gordura"], 0.0);
        assert_eq!(json["aviso"], UNRESOLVED_NOTICE);
    }

    #[test]
    fn test_resolved_item_has_no_notice() {
        let item = ResolvedItem::resolved("Banana, prata, crua", 70.0, NutrientValues::default(), 0.9);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("aviso").is_none());
        assert!(!item.is_unresolved());
    }
}
