use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the roadcost library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a node id is not present in the road network.
    #[error("unknown node id: {id}")]
    UnknownNode { id: i64 },

    /// Raised when an operation needs a populated road network but the
    /// network has no nodes.
    #[error("road network is empty")]
    EmptyNetwork,

    /// Raised when the matrix builder is asked for zero worker threads.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    /// Raised when the memory-bounded search is given a zero frontier cap.
    #[error("frontier capacity must be at least 1")]
    InvalidFrontierCapacity,

    /// Raised when a matched-location list does not line up with the
    /// instance it is meant to serve.
    #[error("matched {matched} locations but the instance has {expected}")]
    MatchedLocationMismatch { matched: usize, expected: usize },

    /// Raised when a distance-matrix file does not have the expected shape.
    #[error("malformed distance matrix in {}: {message}", path.display())]
    MalformedMatrix { path: PathBuf, message: String },

    /// Raised when a matrix of one size is attached to an instance that
    /// needs another.
    #[error("matrix of size {size} cannot serve an instance with {expected} locations")]
    MatrixSizeMismatch { size: usize, expected: usize },

    /// Raised when a solver cannot reach a delivery from any feasible
    /// predecessor.
    #[error("delivery at location index {index} is unreachable in the distance matrix")]
    UnreachableDelivery { index: usize },

    /// Raised when a single delivery is larger than the vehicle capacity,
    /// which makes the instance unsolvable.
    #[error("delivery at location index {index} exceeds the vehicle capacity")]
    DeliveryTooLarge { index: usize },

    /// Raised when a worker thread could not be spawned.
    #[error("failed to spawn matrix worker thread")]
    WorkerSpawn(#[source] std::io::Error),

    /// Raised when a worker thread panicked before finishing its rows.
    #[error("matrix worker thread panicked")]
    WorkerPanicked,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for OSM PBF decoding errors.
    #[error(transparent)]
    Pbf(#[from] osmpbf::Error),
}
