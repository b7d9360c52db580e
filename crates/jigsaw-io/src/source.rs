//! Where source images come from.

use std::path::PathBuf;

use jigsaw_export::{ExportError, parse_data_url};

/// Source image to cut into a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded image bytes already in memory.
    Bytes(Vec<u8>),
    /// Encoded image file on disk.
    Path(PathBuf),
    /// `data:` URL carrying an encoded image.
    DataUrl(String),
}

/// Errors that can occur while loading a source image.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The image file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The data URL is malformed.
    #[error(transparent)]
    DataUrl(#[from] ExportError),
}

impl ImageSource {
    /// Fetch the encoded image bytes.
    ///
    /// Files are read with `tokio::fs`; in-memory bytes and data URLs
    /// resolve without suspending.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when a file cannot be read and
    /// [`LoadError::DataUrl`] when a data URL cannot be parsed.
    pub async fn load(self) -> Result<Vec<u8>, LoadError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Path(path) => {
                log::debug!("loading image from {}", path.display());
                tokio::fs::read(&path)
                    .await
                    .map_err(|source| LoadError::Io { path, source })
            }
            Self::DataUrl(url) => Ok(parse_data_url(&url)?.bytes),
        }
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}
