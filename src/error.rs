use thiserror::Error;

use crate::AxisGroup;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between loading layers and handing meshes to the renderer.
#[derive(Error, Debug)]
pub enum Error {
    /// Layers disagree in size, a dimension is zero, or an axis group name is unknown. Raised before any thread starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The accumulated mesh needs more vertices than the renderer accepts. The partial buffers are discarded.
    #[error("mesh needs {vertices} vertices but the limit is {limit}")]
    MeshTooLarge { vertices: usize, limit: usize },

    /// The worker observed an interrupt and produced no geometry.
    #[error("mesh generation was cancelled")]
    Cancelled,

    /// The worker was detached during shutdown.
    #[error("mesh worker was aborted")]
    Aborted,

    #[error("mesh worker panicked")]
    WorkerPanicked,

    #[error("material id {0} does not fit in an RGB color")]
    MaterialOutOfRange(u32),

    #[error("invalid task state: {0}")]
    InvalidState(&'static str),

    #[error("failed to spawn worker thread")]
    Spawn(#[source] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// At least one axis group of a pass did not produce a mesh, so nothing was assembled.
    #[error("{} of 3 axis groups failed to mesh", .0.len())]
    PassFailed(Vec<(AxisGroup, Error)>),
}

impl Error {
    /// `true` when the error only means "no mesh was produced" and need not be surfaced loudly.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::Aborted)
    }
}
