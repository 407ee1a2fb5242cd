//! Error types for kmsprint

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no usable DRM card found")]
    NoDevice,

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("DRM query failed ({context}): {source}")]
    Drm {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn drm(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Drm {
            context: context.into(),
            source,
        }
    }
}
