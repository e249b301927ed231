use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};

use crate::{
    greedy_quads, AxisGroup, CancelToken, Error, FaceVisibilityIndex, MeshAccumulator, MeshConfig, MeshData, Result,
    Task, TaskState, VoxelGrid,
};

/// Meshes the faces of one [`AxisGroup`] on its own thread.
///
/// The host drives a worker through `configure → precompute → start`, then calls
/// [`poll_until_done`](Self::poll_until_done) once per tick until it reports `true`. The finished [`MeshData`] (or the
/// reason there is none) is handed to the callback on the polling thread.
///
/// A worker only reads the grid. Its [`FaceVisibilityIndex`] and vertex buffers are its own, so workers for different
/// groups never contend.
pub struct MeshWorker {
    grid: Arc<VoxelGrid>,
    group: AxisGroup,
    config: Arc<MeshConfig>,
    index: Option<FaceVisibilityIndex>,
    task: Task<Result<MeshData>>,
}

impl MeshWorker {
    /// A worker with the default [`MeshConfig`].
    pub fn configure(grid: Arc<VoxelGrid>, group: AxisGroup) -> Self {
        Self::with_config(grid, group, Arc::new(MeshConfig::default()))
    }

    pub fn with_config(grid: Arc<VoxelGrid>, group: AxisGroup, config: Arc<MeshConfig>) -> Self {
        Self {
            grid,
            group,
            config,
            index: None,
            task: Task::new(format!("mesh-{group}")),
        }
    }

    #[inline]
    pub fn group(&self) -> AxisGroup {
        self.group
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        self.task.state()
    }

    #[inline]
    pub fn grid(&self) -> &Arc<VoxelGrid> {
        &self.grid
    }

    /// Allocates the drawn-state and slice index for the configured grid. The index is filled on the worker thread.
    pub fn precompute(&mut self) {
        self.index = Some(FaceVisibilityIndex::new(&self.grid, self.group));
    }

    #[inline]
    pub fn is_precomputed(&self) -> bool {
        self.index.is_some()
    }

    /// Launches meshing and returns immediately. Each start consumes the index built by
    /// [`precompute`](Self::precompute).
    pub fn start(&mut self) -> Result<()> {
        if self.task.state() != TaskState::Idle {
            return Err(Error::InvalidState("a mesh worker can only be started when idle"));
        }
        let index = self.index.take().ok_or_else(|| {
            Error::InvalidConfiguration(format!("{}: precompute must run before start", self.group))
        })?;

        let grid = Arc::clone(&self.grid);
        let config = Arc::clone(&self.config);
        self.task
            .start(move |cancel| mesh_group(&grid, index, &config, cancel))
    }

    /// Thread-safe read of the completion flag.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.task.is_done()
    }

    /// Non-blocking. Returns `true` once the worker is done; `on_finished` runs on this thread, exactly once.
    ///
    /// A cancelled worker reports [`Error::Cancelled`] and never any geometry.
    pub fn poll_until_done(&mut self, on_finished: impl FnOnce(Result<MeshData>)) -> bool {
        let group = self.group;
        self.task.poll_until_done(|outcome| {
            let outcome = outcome.and_then(|meshed| meshed);
            match &outcome {
                Err(Error::Cancelled) => debug!("{group}: meshing cancelled"),
                Err(e) => warn!("{group}: meshing failed: {e}"),
                Ok(_) => {}
            }
            on_finished(outcome)
        })
    }

    /// Asks the mesher to stop at its next checkpoint.
    pub fn interrupt(&self) {
        self.task.interrupt();
    }

    /// Shutdown only. See [`Task::abort`].
    pub fn abort(&mut self) {
        self.task.abort();
    }

    /// Back to idle. [`precompute`](Self::precompute) has to run again before the next start.
    pub fn reset(&mut self) {
        self.task.reset();
        self.index = None;
    }
}

/// The job run on the worker thread. Every early return drops the partial quads and buffers with it.
fn mesh_group(
    grid: &VoxelGrid,
    mut index: FaceVisibilityIndex,
    config: &MeshConfig,
    cancel: &CancelToken,
) -> Result<MeshData> {
    let group = index.group();
    let started = Instant::now();

    index.scan(grid)?;
    cancel.checkpoint()?;

    let mut quads = Vec::new();
    greedy_quads(grid, &mut index, cancel, &mut quads)?;

    let mut mesh = MeshAccumulator::new(group, config);
    for quad in &quads {
        mesh.push_quad(quad);
    }
    let data = mesh.finish()?;

    debug!(
        "{group}: {} quads, {} vertices in {:?}",
        data.quad_count,
        data.num_vertices(),
        started.elapsed()
    );

    Ok(data)
}
