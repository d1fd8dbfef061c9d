//! Error types surfaced by the loaders.
//!
//! The per-frame pipeline itself is infallible: degenerate or out-of-range
//! primitives are skipped, never reported.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to build a mesh or texture from external data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read OBJ file {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("OBJ file {0} contains no geometry")]
    EmptyObj(PathBuf),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("texture data has {actual} pixels, expected {width}x{height}")]
    TextureSize {
        width: u32,
        height: u32,
        actual: usize,
    },
}

/// Failure to read a render configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
