//! Error types for tilefill.
//!
//! Configuration problems are caught before any tile is generated.
//! Geometry failures come from the clipping engine and abort the fill
//! unchanged; a degenerate boundary is not an error at all.

use thiserror::Error;

/// Errors raised while configuring or running a fill.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FillError {
    #[error("Invalid tiling parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("Tiling parameters must be set before filling")]
    NotConfigured,

    #[error("Fill cancelled after visiting {visited} tiles")]
    Cancelled { visited: usize },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl FillError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        FillError::InvalidParameters { reason: reason.into() }
    }
}

/// Failures reported by a [`crate::clip::GeometryEngine`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Polygon has a non-finite coordinate at vertex {index}")]
    NonFinite { index: usize },

    #[error("Boundary is self-intersecting: edge {first_edge} crosses edge {second_edge}")]
    SelfIntersecting { first_edge: usize, second_edge: usize },

    #[error("Geometry engine failure: {0}")]
    Engine(String),
}

pub type Result<T, E = FillError> = std::result::Result<T, E>;
