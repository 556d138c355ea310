use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::LayerId;

// ---------------------------------------------------------------------------
// Ingestion errors (file-scoped, abort the import)
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}' not found in header of {path}")]
    MissingColumn { path: PathBuf, column: String },
}

// ---------------------------------------------------------------------------
// Vector source errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GeoJSON in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("layer '{layer}' not found in {path}")]
    MissingLayer { path: PathBuf, layer: String },

    #[error("unsupported vector format: {path}")]
    Unsupported { path: PathBuf },

    #[cfg(feature = "gdal")]
    #[error("GDAL error reading {path}: {source}")]
    Gdal {
        path: PathBuf,
        #[source]
        source: gdal::errors::GdalError,
    },
}

// ---------------------------------------------------------------------------
// Imagery token errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("imagery credentials are not configured ({0} missing)")]
    MissingCredentials(&'static str),

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("token response has no access_token")]
    NoToken,
}

// ---------------------------------------------------------------------------
// Layer store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReorderError {
    #[error("new order has {got} layers, store holds {expected}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("layer {0} is not in the store")]
    UnknownLayer(LayerId),

    #[error("layer {0} appears more than once")]
    DuplicateLayer(LayerId),
}

// ---------------------------------------------------------------------------
// Map composition errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("imagery authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("rendering map document: {0}")]
    Render(#[from] tera::Error),

    #[error("serializing map document: {0}")]
    Serialize(#[from] serde_json::Error),
}
