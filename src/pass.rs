use std::sync::Arc;
use std::task::Poll;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::{AxisGroup, Error, MeshConfig, MeshData, MeshWorker, Result, VoxelGrid};

/// The three partial meshes of a finished pass, one per [`AxisGroup`] in [`AxisGroup::ALL`] order.
///
/// The meshes are disjoint: each holds the two face orientations of its group, and only together do they cover the
/// surface.
#[derive(Clone, Debug, PartialEq)]
pub struct PassMesh {
    meshes: Vec<MeshData>,
}

impl PassMesh {
    #[inline]
    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn get(&self, group: AxisGroup) -> Option<&MeshData> {
        self.meshes.iter().find(|m| m.group == group)
    }

    pub fn total_quads(&self) -> usize {
        self.meshes.iter().map(|m| m.quad_count).sum()
    }

    pub fn into_meshes(self) -> Vec<MeshData> {
        self.meshes
    }
}

/// One meshing pass over a grid: three [`MeshWorker`]s running concurrently, assembled all-or-nothing.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use std::task::Poll;
/// # use strata_mesh::{MeshConfig, MeshPass, VoxelGrid};
/// # fn tick() {}
/// let grid = Arc::new(VoxelGrid::new(64, 64, 4)?);
/// let mut pass = MeshPass::start(grid, MeshConfig::default())?;
/// let meshes = loop {
///     if let Poll::Ready(result) = pass.poll() {
///         break result?;
///     }
///     tick();
/// };
/// # Ok::<_, strata_mesh::Error>(())
/// ```
pub struct MeshPass {
    workers: Vec<MeshWorker>,
    outcomes: Vec<Option<Result<MeshData>>>,
    started: Instant,
    delivered: bool,
}

impl MeshPass {
    /// Configures, precomputes and starts a worker per axis group. Nothing keeps running if any of them fails to
    /// start.
    pub fn start(grid: Arc<VoxelGrid>, config: MeshConfig) -> Result<Self> {
        let config = Arc::new(config);
        let mut workers = Vec::with_capacity(AxisGroup::ALL.len());
        for group in AxisGroup::ALL {
            let mut worker = MeshWorker::with_config(Arc::clone(&grid), group, Arc::clone(&config));
            worker.precompute();
            // Dropping the workers started so far cancels them.
            worker.start()?;
            workers.push(worker);
        }

        Ok(Self {
            outcomes: workers.iter().map(|_| None).collect(),
            workers,
            started: Instant::now(),
            delivered: false,
        })
    }

    /// Starts a pass and polls it every `tick` until it is ready.
    pub fn run_blocking(grid: Arc<VoxelGrid>, config: MeshConfig, tick: Duration) -> Result<PassMesh> {
        let mut pass = Self::start(grid, config)?;
        loop {
            if let Poll::Ready(result) = pass.poll() {
                return result;
            }
            thread::sleep(tick);
        }
    }

    /// Number of workers whose completion flag is set.
    pub fn workers_done(&self) -> usize {
        self.workers.iter().filter(|w| w.is_done()).count()
    }

    /// Call once per host tick. Ready exactly once, when every worker has finished; the meshes are only assembled if
    /// all of them succeeded.
    pub fn poll(&mut self) -> Poll<Result<PassMesh>> {
        if self.delivered {
            return Poll::Ready(Err(Error::InvalidState("mesh pass already delivered its result")));
        }

        for (worker, outcome) in self.workers.iter_mut().zip(self.outcomes.iter_mut()) {
            worker.poll_until_done(|result| *outcome = Some(result));
        }
        if self.outcomes.iter().any(Option::is_none) {
            return Poll::Pending;
        }
        self.delivered = true;

        let mut meshes = Vec::with_capacity(self.workers.len());
        let mut failures = Vec::new();
        for (worker, outcome) in self.workers.iter().zip(self.outcomes.iter_mut()) {
            match outcome.take() {
                Some(Ok(mesh)) => meshes.push(mesh),
                Some(Err(e)) => failures.push((worker.group(), e)),
                None => {}
            }
        }

        if !failures.is_empty() {
            warn!(
                "mesh pass failed after {:?}: {}",
                self.started.elapsed(),
                failures
                    .iter()
                    .map(|(group, e)| format!("{group}: {e}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            return Poll::Ready(Err(Error::PassFailed(failures)));
        }

        let mesh = PassMesh { meshes };
        info!(
            "mesh pass finished: {} quads in {:?}",
            mesh.total_quads(),
            self.started.elapsed()
        );
        Poll::Ready(Ok(mesh))
    }

    pub fn interrupt(&self) {
        for worker in &self.workers {
            worker.interrupt();
        }
    }

    /// Shutdown only. See [`MeshWorker::abort`].
    pub fn abort(&mut self) {
        for worker in &mut self.workers {
            worker.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greedy_group_quads;

    const TICK: Duration = Duration::from_millis(1);

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn hill() -> VoxelGrid {
        VoxelGrid::from_fn([12, 10, 4], |p| {
            let (dx, dy) = (p.x - 6, p.y - 5);
            if dx * dx + dy * dy + 4 * p.z * p.z < 30 {
                1 + p.z as u32
            } else {
                0
            }
        })
        .unwrap()
    }

    #[test]
    fn assembles_all_three_groups() {
        init_logger();
        let grid = Arc::new(hill());
        let pass = MeshPass::run_blocking(Arc::clone(&grid), MeshConfig::default(), TICK).unwrap();

        let groups: Vec<_> = pass.meshes().iter().map(|m| m.group).collect();
        assert_eq!(groups, AxisGroup::ALL.to_vec());

        let expected: usize = AxisGroup::ALL
            .iter()
            .map(|g| greedy_group_quads(&grid, *g).len())
            .sum();
        assert_eq!(pass.total_quads(), expected);
        assert_eq!(
            pass.get(AxisGroup::Xz).map(|m| m.quad_count),
            Some(greedy_group_quads(&grid, AxisGroup::Xz).len())
        );
    }

    #[test]
    fn ready_exactly_once() {
        let grid = Arc::new(hill());
        let mut pass = MeshPass::start(grid, MeshConfig::default()).unwrap();
        let result = loop {
            if let Poll::Ready(result) = pass.poll() {
                break result;
            }
            thread::sleep(TICK);
        };
        assert!(result.is_ok());
        assert_eq!(pass.workers_done(), 3);
        assert!(matches!(pass.poll(), Poll::Ready(Err(Error::InvalidState(_)))));
    }

    #[test]
    fn vertex_limit_is_inclusive() {
        // One voxel gives two quads, so eight vertices, in every group.
        let grid = Arc::new(VoxelGrid::from_fn([1, 1, 1], |_| 1).unwrap());
        let exact = MeshConfig {
            vertex_limit: 8,
            ..MeshConfig::default()
        };
        let pass = MeshPass::run_blocking(Arc::clone(&grid), exact, TICK).unwrap();
        assert_eq!(pass.total_quads(), 6);

        let tight = MeshConfig {
            vertex_limit: 7,
            ..MeshConfig::default()
        };
        match MeshPass::run_blocking(grid, tight, TICK) {
            Err(Error::PassFailed(failures)) => {
                let groups: Vec<_> = failures.iter().map(|(g, _)| *g).collect();
                assert_eq!(groups, AxisGroup::ALL.to_vec());
                assert!(failures
                    .iter()
                    .all(|(_, e)| matches!(e, Error::MeshTooLarge { vertices: 8, limit: 7 })));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn one_failed_group_fails_the_pass() {
        // A checkerboard slab: xy needs a quad per voxel and side, 12800 vertices, while the side groups only see the
        // rim.
        let grid = Arc::new(VoxelGrid::from_fn([40, 40, 1], |p| 1 + ((p.x + p.y) % 2) as u32).unwrap());
        let config = MeshConfig {
            vertex_limit: 12_799,
            ..MeshConfig::default()
        };
        match MeshPass::run_blocking(grid, config, TICK) {
            Err(Error::PassFailed(failures)) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].0, AxisGroup::Xy);
                assert!(matches!(
                    failures[0].1,
                    Error::MeshTooLarge { vertices: 12_800, limit: 12_799 }
                ));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn interrupted_pass_reports_cancellation() {
        init_logger();
        let grid = Arc::new(VoxelGrid::from_fn([256, 256, 16], |p| 1 + (p.x + p.y + p.z) as u32 % 3).unwrap());
        let mut pass = MeshPass::start(grid, MeshConfig::default()).unwrap();
        pass.interrupt();

        let result = loop {
            if let Poll::Ready(result) = pass.poll() {
                break result;
            }
            thread::sleep(TICK);
        };
        match result {
            Err(Error::PassFailed(failures)) => {
                assert_eq!(failures.len(), 3);
                assert!(failures.iter().all(|(_, e)| e.is_cancellation()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
