use std::path::PathBuf;

use thiserror::Error;

use crate::evidence::Category;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid policy document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("duplicate policy category: {category}")]
    DuplicateCategory { category: Category },

    #[error("policy store has no source file to reload")]
    NoSource,
}

pub type PolicyResult<T> = Result<T, PolicyError>;
