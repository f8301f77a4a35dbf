use tracing::{debug, info, warn};

use crate::models::food::CandidateItem;
use crate::models::meal::{MealAnalysis, ResolvedItem};
use crate::services::candidates::{self, ParseError};
use crate::services::catalog::FoodCatalog;
use crate::services::extraction::{CandidateExtractor, ExtractionError};
use crate::services::normalize::normalize;
use crate::services::nutrients::{aggregate, project};

/// Per-deployment switches for the analysis pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Try lossy recovery when extraction output breaks the JSON contract.
    pub lenient_parsing: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Meal description is empty")]
    EmptyInput,

    #[error("Food extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Invalid extraction output: {source}")]
    MalformedExtraction {
        raw: String,
        #[source]
        source: ParseError,
    },
}

/// Analyze one meal description against a catalog snapshot.
///
/// Blank text is rejected before the extractor is called. The extractor runs
/// exactly once. Candidates that do not resolve become zeroed rows and never
/// fail the request.
pub async fn run_pipeline(
    meal_text: &str,
    catalog: &FoodCatalog,
    extractor: &dyn CandidateExtractor,
    options: PipelineOptions,
) -> Result<MealAnalysis, PipelineError> {
    if meal_text.trim().is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let vocabulary: Vec<&str> = catalog.vocabulary().collect();
    let raw = extractor.extract(meal_text, &vocabulary).await?;
    debug!(raw = %raw, "Extraction output received");

    let parsed = if options.lenient_parsing {
        candidates::parse_candidates_lenient(&raw)
    } else {
        candidates::parse_candidates(&raw)
    };
    let parsed = match parsed {
        Ok(p) => p,
        Err(source) => {
            warn!(raw = %raw, error = %source, "Extraction output could not be parsed");
            return Err(PipelineError::MalformedExtraction { raw, source });
        }
    };

    let mut warnings = Vec::new();
    if parsed.strategy.is_fallback() {
        warn!(strategy = %parsed.strategy, raw = %raw, "Extraction output broke the JSON contract, recovered leniently");
        metrics::counter!("extraction_lenient_parses_total", "strategy" => parsed.strategy.as_ref().to_string())
            .increment(1);
        warnings.push(format!(
            "Extraction output was not a valid JSON list; items were recovered with {} parsing and may be incomplete",
            parsed.strategy
        ));
    }

    let items: Vec<ResolvedItem> = parsed
        .items
        .iter()
        .map(|candidate| resolve_candidate(candidate, catalog))
        .collect();
    let totals = aggregate(&items);

    let unresolved = items.iter().filter(|i| i.is_unresolved()).count();
    metrics::counter!("meal_items_resolved_total").increment((items.len() - unresolved) as u64);
    metrics::counter!("meal_items_unresolved_total").increment(unresolved as u64);

    info!(
        items = items.len(),
        unresolved,
        kcal = totals.kcal,
        "Meal analysis complete"
    );

    Ok(MealAnalysis {
        items,
        totals,
        warnings,
    })
}

/// Match one candidate and scale its nutrients, or emit a zeroed row.
pub fn resolve_candidate(candidate: &CandidateItem, catalog: &FoodCatalog) -> ResolvedItem {
    let resolution = catalog.resolve(&candidate.raw_name);
    let food = resolution
        .best_match
        .and_then(|name| catalog.find_by_name_fragment(&normalize(name)));

    debug!(
        candidate = %candidate.raw_name,
        best_match = resolution.best_match.unwrap_or("-"),
        score = resolution.score,
        found = food.is_some(),
        "Resolved candidate"
    );

    match food {
        Some(food) => ResolvedItem::resolved(
            food.name.clone(),
            candidate.quantity_grams,
            project(food, candidate.quantity_grams),
            resolution.score,
        ),
        None => ResolvedItem::unresolved(
            candidate.raw_name.clone(),
            candidate.quantity_grams,
            resolution.score,
        ),
    }
}
