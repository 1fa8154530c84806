use crate::models::{AppConfig, EngineConfig, IndexingConfig, RetrievalConfig};
use retrieval_core::{Result, RetrievalError};

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(RetrievalError::validation("engine.host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(RetrievalError::validation("engine.port", "must be nonzero"));
        }
        if self.tenant_port == 0 {
            return Err(RetrievalError::validation(
                "engine.tenant_port",
                "must be nonzero",
            ));
        }
        if self.index_name.is_empty() {
            return Err(RetrievalError::validation(
                "engine.index_name",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

impl IndexingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RetrievalError::validation(
                "indexing.chunk_size",
                "must be greater than 0",
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RetrievalError::validation(
                "indexing.chunk_overlap",
                "must be smaller than chunk_size",
            ));
        }
        if self.blurb_size == 0 {
            return Err(RetrievalError::validation(
                "indexing.blurb_size",
                "must be greater than 0",
            ));
        }
        if self.batch_size == 0 {
            return Err(RetrievalError::validation(
                "indexing.batch_size",
                "must be greater than 0",
            ));
        }
        if self.n_workers == 0 {
            return Err(RetrievalError::validation(
                "indexing.n_workers",
                "must be greater than 0",
            ));
        }
        if self.max_summary_len == 0 {
            return Err(RetrievalError::validation(
                "indexing.max_summary_len",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.doc_time_decay < 0.0 {
            return Err(RetrievalError::validation(
                "retrieval.doc_time_decay",
                "must be non-negative",
            ));
        }
        if self.num_returned_hits == 0 {
            return Err(RetrievalError::validation(
                "retrieval.num_returned_hits",
                "must be greater than 0",
            ));
        }
        if self.untimed_doc_cutoff_days < 0 {
            return Err(RetrievalError::validation(
                "retrieval.untimed_doc_cutoff_days",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.indexing.validate()?;
        self.retrieval.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = AppConfig::default();
        config.engine.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let mut config = AppConfig::default();
        config.indexing.chunk_overlap = config.indexing.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_returned_hits_is_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.num_returned_hits = 0;
        assert!(config.validate().is_err());
    }
}
