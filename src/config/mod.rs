use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::extraction::DEFAULT_GEMINI_BASE_URL;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3001").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string for the `alimentos` table
    pub database_url: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini model id
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Gemini REST base URL
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Upper bound on a single extraction call, in seconds
    #[serde(default = "default_extraction_timeout_secs")]
    pub extraction_timeout_secs: u64,

    /// Optional `;`-separated export whose first column is the resolver vocabulary
    #[serde(default)]
    pub food_names_csv: Option<PathBuf>,

    /// Reload the food catalog every N seconds (disabled when unset)
    #[serde(default)]
    pub catalog_refresh_secs: Option<u64>,

    /// Recover items from extraction output that is not a JSON list
    #[serde(default)]
    pub lenient_extraction: bool,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_extraction_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Refresh period, ignoring a zero value.
    pub fn catalog_refresh_interval(&self) -> Option<Duration> {
        self.catalog_refresh_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = envy::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/foods"),
            ("GEMINI_API_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.extraction_timeout(), Duration::from_secs(30));
        assert!(config.food_names_csv.is_none());
        assert!(config.catalog_refresh_interval().is_none());
        assert!(!config.lenient_extraction);
    }

    #[test]
    fn test_overrides() {
        let config: AppConfig = envy::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/foods"),
            ("GEMINI_API_KEY", "secret"),
            ("FOOD_NAMES_CSV", "/data/alimentos_filtrados.csv"),
            ("CATALOG_REFRESH_SECS", "0"),
            ("LENIENT_EXTRACTION", "true"),
            ("EXTRACTION_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.food_names_csv, Some(PathBuf::from("/data/alimentos_filtrados.csv")));
        assert!(config.catalog_refresh_interval().is_none());
        assert!(config.lenient_extraction);
        assert_eq!(config.extraction_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_api_key() {
        let result: Result<AppConfig, _> =
            envy::from_iter(vars(&[("DATABASE_URL", "postgres://localhost/foods")]));
        assert!(result.is_err());
    }
}
