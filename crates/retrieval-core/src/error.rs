use thiserror::Error;

/// Error taxonomy for the indexing/retrieval pipeline (see spec §7).
///
/// `Transient`/`ExternalService` failures are the ones the engine adapter
/// retries internally; by the time one escapes to a caller the retry budget
/// has already been spent.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("engine error ({service}): {message}")]
    ExternalService { service: String, message: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Consistency failure: a pre-existing document's chunks could not be
    /// torn down before replacement. Fatal to the indexing batch (spec §7).
    #[error("consistency failure for document {document_id}: {message}")]
    Consistency {
        document_id: String,
        message: String,
    },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl RetrievalError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn consistency(document_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Consistency {
            document_id: document_id.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type used across the pipeline crates.
pub type Result<T> = std::result::Result<T, RetrievalError>;

impl From<serde_json::Error> for RetrievalError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string())
    }
}

impl From<std::io::Error> for RetrievalError {
    fn from(error: std::io::Error) -> Self {
        Self::network(error.to_string())
    }
}

impl From<String> for RetrievalError {
    fn from(error: String) -> Self {
        Self::internal(error)
    }
}
