use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use meal_nutrition::app_state::AppState;
use meal_nutrition::config::AppConfig;
use meal_nutrition::db;
use meal_nutrition::routes;
use meal_nutrition::services::{
    catalog::{self, CatalogHandle},
    extraction::GeminiClient,
    pipeline::PipelineOptions,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing meal-nutrition server");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);
    routes::metrics::describe_metrics();

    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Loading food catalog");
    let food_catalog = catalog::load_catalog(&db_pool, config.food_names_csv.as_deref())
        .await
        .expect("Failed to load food catalog");

    tracing::info!(model = %config.gemini_model, "Initializing Gemini client");
    let extractor = GeminiClient::new(
        &config.gemini_api_key,
        &config.gemini_model,
        &config.gemini_base_url,
        config.extraction_timeout(),
    )
    .expect("Failed to initialize Gemini client");

    let state = AppState::new(
        db_pool,
        CatalogHandle::new(food_catalog),
        extractor,
        PipelineOptions {
            lenient_parsing: config.lenient_extraction,
        },
    );

    if let Some(period) = config.catalog_refresh_interval() {
        tracing::info!(seconds = period.as_secs(), "Scheduling catalog refresh");
        let handle = state.catalog.clone();
        let pool = state.db.clone();
        let names_csv = config.food_names_csv.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick fires immediately; the catalog was just loaded.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                catalog::refresh_catalog(&handle, &pool, names_csv.as_deref()).await;
            }
        });
    }

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/analisar-refeicao", post(routes::meal::analyze_meal))
        .route("/api/v1/meals/analyze", post(routes::meal::analyze_meal))
        .with_state(state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
