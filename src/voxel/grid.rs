//! 世界网格 - 整个世界的方块数据
//!
//! 世界整体保存在内存中，不分区块加载。
//! 所有三维坐标通过 `index()` 线性化到一维数组。

use bevy::math::IVec3;

use crate::voxel::change::BlockChange;
use crate::voxel::constants::{MAX_WORLD_HEIGHT, MAX_WORLD_SIZE};
use crate::voxel::voxel_kind::VoxelKind;

/// 世界网格 - 尺寸为 `size × height × size`，创建后不再改变
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldGrid {
    size: i32,
    height: i32,
    /// 体素数组，使用 X-Z-Y 顺序线性化（同一列的方块在内存中连续）
    voxels: Vec<VoxelKind>,
}

impl WorldGrid {
    /// 创建一个空的世界，所有体素初始化为空气
    ///
    /// 尺寸被限制在 `1..=MAX_WORLD_SIZE` 与 `1..=MAX_WORLD_HEIGHT` 内
    pub fn new(size: i32, height: i32) -> Self {
        let size = size.clamp(1, MAX_WORLD_SIZE);
        let height = height.clamp(1, MAX_WORLD_HEIGHT);
        let cells = (size as usize) * (size as usize) * (height as usize);
        Self {
            size,
            height,
            voxels: vec![VoxelKind::Air; cells],
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// 原始体素数据，供外部快照与比较
    pub fn voxels(&self) -> &[VoxelKind] {
        &self.voxels
    }

    /// 坐标是否在世界范围内
    #[inline]
    pub fn contains(&self, pos: IVec3) -> bool {
        (0..self.size).contains(&pos.x)
            && (0..self.height).contains(&pos.y)
            && (0..self.size).contains(&pos.z)
    }

    /// 将三维坐标转换为一维数组索引，越界返回 None
    #[inline]
    fn index(&self, pos: IVec3) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        Some((pos.x * self.height * self.size + pos.z * self.height + pos.y) as usize)
    }

    /// 获取指定位置的体素类型（浮点坐标先向下取整）
    /// 如果坐标超出边界，返回空气
    pub fn get(&self, x: f32, y: f32, z: f32) -> VoxelKind {
        floor_pos(x, y, z)
            .map(|pos| self.get_voxel(pos))
            .unwrap_or(VoxelKind::Air)
    }

    /// 设置指定位置的体素类型（浮点坐标先向下取整）
    /// 越界时不执行任何操作并返回 None
    pub fn set(&mut self, x: f32, y: f32, z: f32, kind: VoxelKind) -> Option<BlockChange> {
        self.set_voxel(floor_pos(x, y, z)?, kind)
    }

    pub fn get_voxel(&self, pos: IVec3) -> VoxelKind {
        self.index(pos)
            .map(|idx| self.voxels[idx])
            .unwrap_or(VoxelKind::Air)
    }

    pub fn set_voxel(&mut self, pos: IVec3, kind: VoxelKind) -> Option<BlockChange> {
        let idx = self.index(pos)?;
        let old = std::mem::replace(&mut self.voxels[idx], kind);
        Some(BlockChange { pos, old, new: kind })
    }

    /// 仅在目标位置为空气时写入，返回是否写入
    pub fn fill_if_empty(&mut self, pos: IVec3, kind: VoxelKind) -> bool {
        match self.index(pos) {
            Some(idx) if self.voxels[idx] == VoxelKind::Air => {
                self.voxels[idx] = kind;
                true
            }
            _ => false,
        }
    }

    /// 指定列最高实心方块之上的第一个 y（整列为空时返回 0）
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        (0..self.height)
            .rev()
            .find(|&y| self.get_voxel(IVec3::new(x, y, z)).is_solid())
            .map(|y| y + 1)
            .unwrap_or(0)
    }

    /// 统计某种方块的数量
    pub fn count(&self, kind: VoxelKind) -> usize {
        self.voxels.iter().filter(|&&k| k == kind).count()
    }

    /// 检查世界是否完全为空气
    pub fn is_empty(&self) -> bool {
        self.voxels.iter().all(|&kind| kind == VoxelKind::Air)
    }
}

/// 连续坐标向下取整为格子坐标，非有限值（NaN、无穷）返回 None
#[inline]
pub fn floor_pos(x: f32, y: f32, z: f32) -> Option<IVec3> {
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return None;
    }
    Some(IVec3::new(x.floor() as i32, y.floor() as i32, z.floor() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> WorldGrid {
        WorldGrid::new(32, 64)
    }

    #[test]
    fn test_new_is_air() {
        let grid = grid();
        assert!(grid.is_empty());
        assert_eq!(grid.voxels().len(), 32 * 32 * 64);
    }

    #[test]
    fn test_new_clamps_extents() {
        let tall = WorldGrid::new(0, 100_000);
        assert_eq!((tall.size(), tall.height()), (1, MAX_WORLD_HEIGHT));
        assert_eq!(tall.voxels().len(), MAX_WORLD_HEIGHT as usize);

        let wide = WorldGrid::new(100_000, -3);
        assert_eq!((wide.size(), wide.height()), (MAX_WORLD_SIZE, 1));
        assert_eq!(wide.voxels().len(), (MAX_WORLD_SIZE * MAX_WORLD_SIZE) as usize);
    }

    #[test]
    fn test_round_trip() {
        let mut grid = grid();
        for (i, kind) in VoxelKind::ALL.iter().enumerate() {
            let (x, y, z) = (i as f32, (i * 5) as f32, 31.0 - i as f32);
            grid.set(x, y, z, *kind);
            assert_eq!(grid.get(x, y, z), *kind);
        }
        // 分数坐标取整到同一格
        grid.set(3.7, 10.2, 4.99, VoxelKind::Glass);
        assert_eq!(grid.get(3.0, 10.0, 4.0), VoxelKind::Glass);
        assert_eq!(grid.get_voxel(IVec3::new(3, 10, 4)), VoxelKind::Glass);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = grid();
        let before = grid.clone();
        let outside = [
            (-1.0, 0.0, 0.0),
            (-0.01, 5.0, 5.0),
            (32.0, 5.0, 5.0),
            (5.0, 64.0, 5.0),
            (5.0, -3.0, 5.0),
            (5.0, 5.0, 32.5),
            (1e9, 1e9, 1e9),
            (f32::NAN, 0.0, 0.0),
            (0.0, f32::INFINITY, 0.0),
        ];
        for (x, y, z) in outside {
            assert_eq!(grid.get(x, y, z), VoxelKind::Air);
            assert_eq!(grid.set(x, y, z, VoxelKind::Stone), None);
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn test_set_reports_change() {
        let mut grid = grid();
        let change = grid.set(5.0, 33.0, 5.0, VoxelKind::Wood);
        assert_eq!(
            change,
            Some(BlockChange {
                pos: IVec3::new(5, 33, 5),
                old: VoxelKind::Air,
                new: VoxelKind::Wood,
            })
        );
        assert_eq!(grid.get(5.0, 33.0, 5.0), VoxelKind::Wood);

        let change = grid.set(5.0, 33.0, 5.0, VoxelKind::Air).unwrap();
        assert_eq!(change.old, VoxelKind::Wood);
        assert!(change.is_break());
    }

    #[test]
    fn test_fill_if_empty() {
        let mut grid = grid();
        let pos = IVec3::new(1, 1, 1);
        assert!(grid.fill_if_empty(pos, VoxelKind::Leaves));
        assert!(!grid.fill_if_empty(pos, VoxelKind::Stone));
        assert_eq!(grid.get_voxel(pos), VoxelKind::Leaves);
        assert!(!grid.fill_if_empty(IVec3::new(-1, 0, 0), VoxelKind::Stone));
    }

    #[test]
    fn test_surface_height() {
        let mut grid = grid();
        assert_eq!(grid.surface_height(4, 4), 0);
        grid.set_voxel(IVec3::new(4, 10, 4), VoxelKind::Stone);
        grid.set_voxel(IVec3::new(4, 11, 4), VoxelKind::Water);
        assert_eq!(grid.surface_height(4, 4), 11);
        assert_eq!(grid.count(VoxelKind::Stone), 1);
    }
}
