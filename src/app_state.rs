use sqlx::PgPool;
use std::sync::Arc;

use crate::services::{
    catalog::CatalogHandle,
    extraction::CandidateExtractor,
    pipeline::PipelineOptions,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub catalog: Arc<CatalogHandle>,
    pub extractor: Arc<dyn CandidateExtractor>,
    pub pipeline: PipelineOptions,
}

impl AppState {
    pub fn new(
        db: PgPool,
        catalog: CatalogHandle,
        extractor: impl CandidateExtractor + 'static,
        pipeline: PipelineOptions,
    ) -> Self {
        Self {
            db,
            catalog: Arc::new(catalog),
            extractor: Arc::new(extractor),
            pipeline,
        }
    }
}
