use std::path::{Path, PathBuf};

use thiserror::Error;

pub type MapnikResult<T> = Result<T, MapnikError>;

#[derive(Debug, Error)]
pub enum MapnikError {
    #[error("invalid map size: width={width}, height={height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to allocate {bytes} bytes for a {width}x{height} image")]
    Allocation { width: u32, height: u32, bytes: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("i/o error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stylesheet error: {0}")]
    Stylesheet(String),

    #[error("xml parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("datasource error: {0}")]
    Datasource(String),

    #[error("failed to initialize projection with: '{0}'")]
    Projection(String),

    #[error("unknown file type: {0}")]
    UnknownFormat(String),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("font registration failed: {0}")]
    Font(String),

    #[error("{0}")]
    Extent(String),
}

impl MapnikError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Directory-walk failure, attributed to the entry that failed or to `root`.
    pub(crate) fn walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        Self::io(path, source)
    }
}
