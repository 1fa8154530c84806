use crate::models::AppConfig;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::{Path, PathBuf};

/// Errors raised while assembling configuration from layered sources.
/// Kept distinct from [`retrieval_core::RetrievalError`] because these are
/// failures of the *loading mechanics* (bad file, bad env var), not of the
/// domain values those sources produce — `AppConfig::validate` reports the
/// latter.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("configuration parse error: {0}")]
    ParseError(String),
}

/// Environment variable prefix recognized by the loader (e.g.
/// `RETRIEVAL_ENGINE.PORT=8080`).
pub const ENV_PREFIX: &str = "RETRIEVAL_";

/// Load configuration with precedence env > file > defaults, mirroring the
/// teacher's `ConfigResolver`. `file_path` is optional; when given but
/// missing, returns [`ConfigError::FileNotFound`] rather than silently
/// skipping it (the caller asked for a specific file).
pub fn load_config(file_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let figment = Figment::from(Serialized::defaults(AppConfig::default()));

    let figment = match file_path {
        None => figment,
        Some(path) if !path.exists() => {
            return Err(ConfigError::FileNotFound(path.display().to_string()))
        }
        Some(path) => match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => figment.merge(Json::file(path)),
            Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
            _ => figment.merge(Toml::file(path)),
        },
    };

    let figment = figment.merge(Env::prefixed(ENV_PREFIX).split("_"));

    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Search a handful of conventional locations for a config file, the way
/// the teacher's `FileConfigLoader::with_default_locations` does.
pub fn default_config_path() -> Option<PathBuf> {
    for candidate in ["retrieval.toml", "config/retrieval.toml", "retrieval.yaml"] {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.engine.port, 8080);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/retrieval.toml")));
        assert!(matches!(err, Err(ConfigError::FileNotFound(_))));
    }
}
