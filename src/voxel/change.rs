//! 方块变更记录
//!
//! `WorldGrid::set` 成功时返回，由统计、粒子、音效等观察者消费
use bevy::math::{IVec3, Vec3};

use super::voxel_kind::VoxelKind;

/// 单个方块的变更
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockChange {
    /// 方块的世界坐标（已取整）
    pub pos: IVec3,
    pub old: VoxelKind,
    pub new: VoxelKind,
}

impl BlockChange {
    /// 变更后为空气，即挖掘
    pub fn is_break(&self) -> bool {
        self.new == VoxelKind::Air
    }

    /// 放置了非空气方块
    pub fn is_place(&self) -> bool {
        self.new != VoxelKind::Air
    }

    /// 方块中心点，粒子从这里生成
    pub fn center(&self) -> Vec3 {
        self.pos.as_vec3() + Vec3::splat(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_kind() {
        let change = BlockChange {
            pos: IVec3::new(1, 2, 3),
            old: VoxelKind::Stone,
            new: VoxelKind::Air,
        };
        assert!(change.is_break());
        assert!(!change.is_place());

        let change = BlockChange {
            pos: IVec3::ZERO,
            old: VoxelKind::Air,
            new: VoxelKind::Wood,
        };
        assert!(change.is_place());
    }

    #[test]
    fn test_center() {
        let change = BlockChange {
            pos: IVec3::new(5, 33, 5),
            old: VoxelKind::Air,
            new: VoxelKind::Wood,
        };
        assert_eq!(change.center(), Vec3::new(5.5, 33.5, 5.5));
    }
}
