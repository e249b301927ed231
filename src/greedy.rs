use log::debug;

use crate::{
    AxisGroup, CancelToken, DrawnFaces, Face, FaceVisibilityIndex, Quad, Result, VoxelCoordinate, VoxelGrid,
};

/// Greedy rectangle growing over the faces of one [`AxisGroup`].
///
/// Materials are visited one at a time, and within a material every indexed voxel is tried as a seed for each of the
/// group's two faces. A seed whose face is already drawn, occluded, or of another material is skipped. Otherwise a 1x1
/// quad is started there and grown alternately by one full column (width) and one full row (height) until neither can
/// grow. A column or row is accepted only when every cell in it is in bounds, of the seed's material, not yet drawn and
/// not occluded; a rejected direction is never retried for that quad.
///
/// Every face of the group that is visible in `grid` ends up in exactly one quad, and no quad spans two materials.
///
/// `cancel` is checked before each seed. On cancellation this returns [`Error::Cancelled`](crate::Error::Cancelled)
/// and `output` may hold a partial result that the caller must discard.
pub fn greedy_quads(
    grid: &VoxelGrid,
    index: &mut FaceVisibilityIndex,
    cancel: &CancelToken,
    output: &mut Vec<Quad>,
) -> Result<()> {
    let group = index.group();
    let (drawn, slices) = index.split_mut();
    let first_quad = output.len();

    // Reused between strips to avoid reallocating.
    let mut strip = Vec::new();

    for (material, seeds) in slices.iter() {
        for &seed in seeds {
            cancel.checkpoint()?;

            for face in group.faces() {
                if drawn.is_face_drawn(seed, face)
                    || grid.is_face_occluded(seed, face)
                    || grid.get(seed) != material
                {
                    continue;
                }
                output.push(grow_quad(grid, drawn, seed, face, material, &mut strip));
            }
        }
    }

    debug!(
        "{group}: {} quads over {} faces",
        output.len() - first_quad,
        drawn.count()
    );

    Ok(())
}

/// Builds a fresh index for `group` and meshes it without cancellation.
pub fn greedy_group_quads(grid: &VoxelGrid, group: AxisGroup) -> Vec<Quad> {
    let mut index = FaceVisibilityIndex::build(grid, group);
    let mut quads = Vec::new();
    if let Err(e) = greedy_quads(grid, &mut index, &CancelToken::new(), &mut quads) {
        debug!("{group}: meshing stopped early: {e}");
    }
    quads
}

fn grow_quad(
    grid: &VoxelGrid,
    drawn: &mut DrawnFaces,
    seed: VoxelCoordinate,
    face: Face,
    material: u32,
    strip: &mut Vec<VoxelCoordinate>,
) -> Quad {
    drawn.mark_face_drawn(seed, face);

    let [du, dv] = face.tangents();
    let mut width = 1;
    let mut height = 1;
    let mut growing_width = true;
    let mut growing_height = true;

    while growing_width || growing_height {
        if growing_width {
            if strip_is_open(grid, drawn, material, face, seed + du * width, dv, height, strip) {
                for &p in strip.iter() {
                    drawn.mark_face_drawn(p, face);
                }
                width += 1;
            } else {
                growing_width = false;
            }
        }

        if growing_height {
            if strip_is_open(grid, drawn, material, face, seed + dv * height, du, width, strip) {
                for &p in strip.iter() {
                    drawn.mark_face_drawn(p, face);
                }
                height += 1;
            } else {
                growing_height = false;
            }
        }
    }

    Quad {
        minimum: seed.as_uvec3().to_array(),
        width: width as u32,
        height: height as u32,
        face,
        material,
    }
}

/// Collects the `len` cells `start + step * i` into `strip` and returns `true` iff every one of them could join the
/// quad. Nothing is marked here; the caller commits the whole strip or none of it.
#[allow(clippy::too_many_arguments)]
fn strip_is_open(
    grid: &VoxelGrid,
    drawn: &DrawnFaces,
    material: u32,
    face: Face,
    start: VoxelCoordinate,
    step: VoxelCoordinate,
    len: i32,
    strip: &mut Vec<VoxelCoordinate>,
) -> bool {
    strip.clear();
    for i in 0..len {
        let p = start + step * i;
        if !grid.in_bounds(p)
            || grid.get(p) != material
            || drawn.is_face_drawn(p, face)
            || grid.is_face_occluded(p, face)
        {
            return false;
        }
        strip.push(p);
    }
    true
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use ilattice::glam::IVec3;

    use super::*;
    use crate::codec::EMPTY;
    use crate::Error;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn random_grid(seed: u64, dims: [u32; 3], fill: f32, materials: u32) -> VoxelGrid {
        let mut rng = fastrand::Rng::with_seed(seed);
        VoxelGrid::from_fn(dims, |_| {
            if rng.f32() < fill {
                rng.u32(1..=materials)
            } else {
                EMPTY
            }
        })
        .unwrap()
    }

    fn sorted(mut quads: Vec<Quad>) -> Vec<Quad> {
        quads.sort_by_key(|q| (q.face, q.minimum, q.width, q.height, q.material));
        quads
    }

    #[test]
    fn single_voxel_has_one_quad_per_face() {
        init_logger();
        let grid = VoxelGrid::from_fn([3, 3, 3], |p| u32::from(p == IVec3::ONE)).unwrap();
        let quads = greedy_group_quads(&grid, AxisGroup::Xy);
        assert_eq!(
            sorted(quads),
            vec![
                Quad { minimum: [1, 1, 1], width: 1, height: 1, face: Face::Top, material: 1 },
                Quad { minimum: [1, 1, 1], width: 1, height: 1, face: Face::Bottom, material: 1 },
            ]
        );
    }

    #[test]
    fn full_layer_merges_into_two_quads() {
        let grid = VoxelGrid::from_fn([64, 64, 1], |_| 3).unwrap();
        let quads = greedy_group_quads(&grid, AxisGroup::Xy);
        assert_eq!(
            sorted(quads),
            vec![
                Quad { minimum: [0, 0, 0], width: 64, height: 64, face: Face::Top, material: 3 },
                Quad { minimum: [0, 0, 0], width: 64, height: 64, face: Face::Bottom, material: 3 },
            ]
        );
    }

    #[test]
    fn checkerboard_never_merges_across_materials() {
        let grid = VoxelGrid::from_fn([2, 2, 1], |p| 1 + ((p.x + p.y) % 2) as u32).unwrap();
        let quads = greedy_group_quads(&grid, AxisGroup::Xy);
        assert_eq!(quads.len(), 8);
        for face in [Face::Top, Face::Bottom] {
            let of_face: Vec<_> = quads.iter().filter(|q| q.face == face).collect();
            assert_eq!(of_face.len(), 4);
            assert!(of_face.iter().all(|q| q.area() == 1));
        }
    }

    #[test]
    fn side_faces_merge_along_their_own_axes() {
        // A 3 wide, 1 deep, 2 tall wall.
        let grid = VoxelGrid::from_fn([3, 1, 2], |_| 4).unwrap();

        let front_back = sorted(greedy_group_quads(&grid, AxisGroup::Xz));
        assert_eq!(
            front_back,
            vec![
                Quad { minimum: [0, 0, 0], width: 3, height: 2, face: Face::Front, material: 4 },
                Quad { minimum: [0, 0, 0], width: 3, height: 2, face: Face::Back, material: 4 },
            ]
        );

        let left_right = sorted(greedy_group_quads(&grid, AxisGroup::Yz));
        assert_eq!(
            left_right,
            vec![
                Quad { minimum: [0, 0, 0], width: 1, height: 2, face: Face::Left, material: 4 },
                Quad { minimum: [2, 0, 0], width: 1, height: 2, face: Face::Right, material: 4 },
            ]
        );
    }

    #[test]
    fn rejected_strip_leaves_no_drawn_bits() {
        // Row y=1 is only half filled, so growing the first quad's width into x=2 fails on (2, 1).
        let grid = VoxelGrid::from_fn([4, 2, 1], |p| u32::from(p.y == 0 || p.x < 2)).unwrap();
        let mut index = FaceVisibilityIndex::build(&grid, AxisGroup::Xy);
        let mut quads = Vec::new();
        greedy_quads(&grid, &mut index, &CancelToken::new(), &mut quads).unwrap();

        let visible = grid.visible_faces(AxisGroup::Xy);
        assert_eq!(visible.len(), 12);
        assert_eq!(index.drawn().count(), visible.len());
        assert!(visible.iter().all(|(p, face)| index.is_face_drawn(*p, *face)));
        assert_eq!(quads.iter().map(Quad::area).sum::<u32>() as usize, visible.len());

        for x in 2..4 {
            assert!(index.drawn().get(IVec3::new(x, 1, 0)).is_empty());
        }
        let tops = quads.iter().filter(|q| q.face == Face::Top).count();
        assert_eq!(tops, 2);
    }

    #[test]
    fn covers_every_visible_face_exactly_once() {
        init_logger();
        for seed in 0..8 {
            let grid = random_grid(seed, [9, 7, 4], 0.6, 3);
            for group in AxisGroup::ALL {
                let quads = greedy_group_quads(&grid, group);

                let mut covered = HashSet::new();
                for quad in &quads {
                    assert_eq!(quad.face.group(), group);
                    for p in quad.voxels() {
                        assert!(covered.insert((p, quad.face)), "{p} {:?} covered twice", quad.face);
                    }
                }
                let expected: HashSet<_> = grid.visible_faces(group).into_iter().collect();
                assert_eq!(covered, expected, "seed {seed} group {group}");
            }
        }
    }

    #[test]
    fn quads_are_material_pure() {
        for seed in 0..8 {
            let grid = random_grid(seed, [8, 8, 4], 0.8, 4);
            for group in AxisGroup::ALL {
                for quad in greedy_group_quads(&grid, group) {
                    assert!(quad.voxels().all(|p| grid.get(p) == quad.material));
                }
            }
        }
    }

    #[test]
    fn hidden_voxels_never_appear() {
        let grid = VoxelGrid::from_fn([5, 5, 4], |_| 2).unwrap();
        let hidden: HashSet<_> = grid
            .extent()
            .iter3()
            .map(|p| p.as_ivec3())
            .filter(|p| grid.is_hidden(*p))
            .collect();
        assert_eq!(hidden.len(), 3 * 3 * 2);

        for group in AxisGroup::ALL {
            for quad in greedy_group_quads(&grid, group) {
                assert!(quad.voxels().all(|p| !hidden.contains(&p)));
            }
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let grid = random_grid(42, [16, 16, 4], 0.7, 5);
        for group in AxisGroup::ALL {
            let first = greedy_group_quads(&grid, group);
            for _ in 0..3 {
                assert_eq!(greedy_group_quads(&grid, group), first);
            }
        }
    }

    #[test]
    fn material_order_does_not_change_coverage() {
        // Swapping material IDs changes the order materials are visited in, but each material's quads stay the same.
        let grid = random_grid(7, [10, 10, 3], 0.9, 2);
        let swapped = VoxelGrid::from_fn(grid.dims(), |p| match grid.get(p) {
            1 => 2,
            2 => 1,
            m => m,
        })
        .unwrap();

        let by_material = |quads: Vec<Quad>, relabel: &HashMap<u32, u32>| {
            sorted(
                quads
                    .into_iter()
                    .map(|q| Quad { material: relabel[&q.material], ..q })
                    .collect(),
            )
        };
        let identity = HashMap::from([(1, 1), (2, 2)]);
        let swap = HashMap::from([(1, 2), (2, 1)]);

        for group in AxisGroup::ALL {
            assert_eq!(
                by_material(greedy_group_quads(&grid, group), &identity),
                by_material(greedy_group_quads(&swapped, group), &swap),
            );
        }
    }

    #[test]
    fn stops_at_the_next_checkpoint_when_cancelled() {
        let grid = VoxelGrid::from_fn([8, 8, 2], |_| 1).unwrap();
        let mut index = FaceVisibilityIndex::build(&grid, AxisGroup::Xy);
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut quads = Vec::new();
        let result = greedy_quads(&grid, &mut index, &cancel, &mut quads);
        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(quads.is_empty());
    }

    #[test]
    fn empty_grid_has_no_quads() {
        let grid = VoxelGrid::new(4, 4, 4).unwrap();
        for group in AxisGroup::ALL {
            assert!(greedy_group_quads(&grid, group).is_empty());
        }
    }
}
