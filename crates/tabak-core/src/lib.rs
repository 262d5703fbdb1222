pub mod app_config;
pub mod config;
pub mod known_brands;
pub mod records;
pub mod scrape_config;
pub mod slug;

use thiserror::Error;

pub use app_config::{AppConfig, BrowserSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use known_brands::{load_known_brands, parse_known_brands, KnownBrand, KnownBrandsFile};
pub use records::{BrandRecord, TobaccoMetadata, TobaccoRecord};
pub use scrape_config::ScrapeConfig;
pub use slug::slugify;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read known brands file {path}: {source}")]
    KnownBrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse known brands file: {0}")]
    KnownBrandsFileParse(#[from] serde_yaml::Error),

    #[error("known brands validation failed: {0}")]
    Validation(String),
}
