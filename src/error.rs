use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read image directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("cannot read movie list {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Conditions that end the session.
#[derive(Debug, Error)]
pub enum SodiumError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("no home directory for the default movie list, pass --movie-list")]
    NoHomeDir,

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
