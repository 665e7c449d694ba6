use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading a markdown post off disk.
///
/// The sync scan logs these and moves on to the next file.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
