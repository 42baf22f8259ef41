//! Edge affinity export for runs without seeds.

use fuzzy_affinity::{AffinityEvaluator, EdgeSample};
use fuzzy_types::{AdjacencyScales, Axis, Direction, ExportAxes, FuzzyResult, StrengthMap, Volume};

const FORWARD: [Direction; 3] = [Direction::PosX, Direction::PosY, Direction::PosZ];

/// Writes, for every voxel, the largest affinity of its forward edges along
/// the enabled axes. Voxels on the far face of an axis have no edge along
/// it. Background voxels stay 0.
pub(crate) fn export_affinities<E: AffinityEvaluator>(
    volume: &Volume,
    evaluator: &mut E,
    scales: AdjacencyScales,
    axes: ExportAxes,
    background: Option<&[bool]>,
) -> FuzzyResult<StrengthMap> {
    let dims = volume.dims();
    let mut out = StrengthMap::new(dims)?;
    let excluded = |i: usize| background.is_some_and(|mask| mask[i]);
    for direction in FORWARD {
        let axis: Axis = direction.axis();
        if !axes.includes(axis) {
            continue;
        }
        for (index, coord) in dims.iter().enumerate() {
            let neighbor = coord.step(direction);
            let Some(n) = dims.index(neighbor) else {
                continue;
            };
            if excluded(index) || excluded(n) {
                continue;
            }
            let edge = EdgeSample::new(volume.value(index), volume.value(n), coord, neighbor)
                .with_adjacency(scales.along(axis));
            let affinity = evaluator.affinity(&edge);
            if affinity > out.get(index) {
                out.set(index, affinity);
            }
        }
    }
    Ok(out)
}
