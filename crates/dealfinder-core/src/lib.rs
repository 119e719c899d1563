pub mod app_config;
pub mod config;
pub mod products;
pub mod regions;

pub use app_config::{AppConfig, CloudinarySettings, JudgeSettings, ScanSettings, VisionSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    DataSource, ImageScanResult, Product, SearchRequest, SearchResponse, DEFAULT_AVAILABILITY,
    MAX_PRODUCTS,
};
pub use regions::{load_region_table, RegionCode, RegionDescriptor, RegionTable, GLOBAL_REGION};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read regions file {path}: {source}")]
    RegionsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse regions file: {0}")]
    RegionsFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
