use bevy::math::{IVec3, Vec3};

use crate::voxel::{VoxelKind, WorldGrid, floor_pos};

/// Marching increment used when none is configured.
pub const DEFAULT_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelHit {
    pub pos: IVec3,
    pub kind: VoxelKind,
    /// Distance along the ray of the first sample inside `pos`.
    pub distance: f32,
    /// Last empty in-bounds cell sampled before the hit. Blocks are placed here.
    pub previous: Option<IVec3>,
}

/// Unit view direction for the given pitch and yaw (radians).
/// Positive pitch looks down; yaw 0 faces +Z.
pub fn look_direction(pitch: f32, yaw: f32) -> Vec3 {
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Vec3::new(sin_yaw * cos_pitch, -sin_pitch, cos_yaw * cos_pitch)
}

/// Stepped ray march
///
/// Samples the grid at `origin + direction * i * step` for every `i` with
/// `i * step < max_distance` and returns the first non-air cell. Cheap but
/// inexact: thin geometry can be skipped with a large `step`, so callers
/// should keep it at or below 0.1 blocks.
pub fn cast(
    grid: &WorldGrid,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    step: f32,
) -> Option<VoxelHit> {
    if !(step > 0.0 && step.is_finite()) || !max_distance.is_finite() || !origin.is_finite() {
        return None;
    }
    let dir = direction.try_normalize()?;

    // Past the farthest corner of the grid every sample is empty.
    let extent = Vec3::new(grid.size() as f32, grid.height() as f32, grid.size() as f32);
    let reach = origin.distance(extent * 0.5) + extent.length() * 0.5;
    let limit = max_distance.min(reach + step);
    let samples = (limit as f64 / step as f64).ceil() as u64;

    let mut previous = None;
    for i in 0..samples {
        let distance = i as f32 * step;
        if distance >= max_distance {
            break;
        }
        let sample = origin + dir * distance;
        if let Some(pos) = floor_pos(sample.x, sample.y, sample.z) {
            let kind = grid.get_voxel(pos);
            if kind != VoxelKind::Air {
                return Some(VoxelHit {
                    pos,
                    kind,
                    distance,
                    previous,
                });
            }
            if grid.contains(pos) {
                previous = Some(pos);
            }
        }
    }
    None
}
