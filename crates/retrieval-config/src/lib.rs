//! Typed configuration for the engine, indexing and retrieval layers
//! (spec §6 "Configuration inputs"), loaded with env > file > defaults
//! precedence via `figment`.

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{default_config_path, load_config, ConfigError, ENV_PREFIX};
pub use models::{AppConfig, EngineConfig, IndexingConfig, RetrievalConfig};
