use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;
use serde::Serialize;
use tracing::{error, Instrument};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::meal::{AnalyzeMealRequest, MealAnalysis};
use crate::services::extraction::ExtractionError;
use crate::services::pipeline::{run_pipeline, PipelineError};

/// JSON error body: `{"erro": "...", "raw": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub erro: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Request-level failure of a meal analysis.
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    Pipeline(PipelineError),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::EmptyInput) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Extraction(ExtractionError::Timeout)) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ApiError::Pipeline(PipelineError::Extraction(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(PipelineError::MalformedExtraction { .. }) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::InvalidInput(detail) => ErrorBody {
                erro: format!("Texto inválido: {detail}"),
                raw: None,
            },
            ApiError::Pipeline(PipelineError::EmptyInput) => ErrorBody {
                erro: "Texto obrigatório".to_string(),
                raw: None,
            },
            ApiError::Pipeline(PipelineError::MalformedExtraction { raw, source }) => ErrorBody {
                erro: format!("JSON inválido retornado pela IA: {source}"),
                raw: Some(raw),
            },
            ApiError::Pipeline(e @ PipelineError::Extraction(_)) => ErrorBody {
                erro: e.to_string(),
                raw: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// POST /analisar-refeicao — Break a meal description into foods and macros.
pub async fn analyze_meal(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeMealRequest>,
) -> Result<Json<MealAnalysis>, ApiError> {
    // Validation runs before anything external is touched.
    if let Err(report) = request.validate() {
        metrics::counter!("meal_analyses_rejected_total").increment(1);
        return Err(ApiError::InvalidInput(report.to_string()));
    }

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("analyze_meal", %request_id);

    async move {
        metrics::counter!("meal_analyses_total").increment(1);
        let start = std::time::Instant::now();

        let catalog = state.catalog.snapshot().await;
        let result = run_pipeline(&request.texto, &catalog, state.extractor.as_ref(), state.pipeline).await;

        metrics::histogram!("meal_analysis_seconds").record(start.elapsed().as_secs_f64());

        match result {
            Ok(analysis) => Ok(Json(analysis)),
            Err(e) => {
                metrics::counter!("meal_analyses_failed_total").increment(1);
                error!(error = %e, "Meal analysis failed");
                Err(ApiError::from(e))
            }
        }
    }
    .instrument(span)
    .await
}
