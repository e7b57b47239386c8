use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no value at `{0}`")]
    NotFound(String),

    #[error("value at `{path}` is not {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
    },

    #[error("could not parse document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("document root is not a mapping")]
    RootNotMapping,

    #[error("could not serialize document: {0}")]
    Serialize(serde_yaml::Error),

    #[error("could not access `{}`: {source}", path.to_string_lossy())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("tag `{tag}` nests deeper than {max} levels")]
    ExpansionTooDeep { tag: String, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
