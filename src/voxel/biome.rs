//! 生物群系定义（仅用于大型生物群系世界）

use crate::voxel::voxel_kind::VoxelKind;

/// 地表装饰物
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Tree,
    Cactus,
}

/// 生物群系类型 - 决定地形的表面方块和植被
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Biome {
    Forest,
    Plains,
    Desert,
}

impl Biome {
    /// 沿 X 轴排列的顺序
    pub const BANDS: [Biome; 3] = [Biome::Forest, Biome::Plains, Biome::Desert];

    /// 根据 X 坐标确定所在的生物群系，世界沿 X 轴被均分为连续的三段
    pub fn for_column(x: i32, world_size: i32) -> Biome {
        let bands = Self::BANDS.len() as i32;
        let idx = (x.max(0) * bands / world_size.max(1)).min(bands - 1);
        Self::BANDS[idx as usize]
    }

    /// 获取该生物群系的表面方块类型（地表最顶层的方块）
    pub fn surface_block(self) -> VoxelKind {
        match self {
            Biome::Forest | Biome::Plains => VoxelKind::Grass,
            Biome::Desert => VoxelKind::Sand,
        }
    }

    /// 获取该生物群系的次表层方块类型（表层下方的方块）
    pub fn subsurface_block(self) -> VoxelKind {
        match self {
            Biome::Forest | Biome::Plains => VoxelKind::Dirt,
            Biome::Desert => VoxelKind::Sand,
        }
    }

    /// 装饰物种类及每列的生成概率
    pub fn feature(self) -> (Feature, f64) {
        match self {
            Biome::Forest => (Feature::Tree, 0.06),
            Biome::Plains => (Feature::Tree, 0.005),
            Biome::Desert => (Feature::Cactus, 0.02),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_are_contiguous() {
        let biomes: Vec<Biome> = (0..32).map(|x| Biome::for_column(x, 32)).collect();
        assert_eq!(biomes[0], Biome::Forest);
        assert_eq!(biomes[10], Biome::Forest);
        assert_eq!(biomes[11], Biome::Plains);
        assert_eq!(biomes[21], Biome::Plains);
        assert_eq!(biomes[22], Biome::Desert);
        assert_eq!(biomes[31], Biome::Desert);
        // 每次切换只会前进到下一个生物群系
        let switches = biomes.windows(2).filter(|w| w[0] != w[1]).count();
        assert_eq!(switches, 2);
    }

    #[test]
    fn test_surface_blocks() {
        assert_eq!(Biome::Desert.surface_block(), VoxelKind::Sand);
        assert_eq!(Biome::Forest.subsurface_block(), VoxelKind::Dirt);
        assert_eq!(Biome::Desert.feature().0, Feature::Cactus);
    }
}
