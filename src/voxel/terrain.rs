//! 地形生成器

use std::fmt;
use std::str::FromStr;

use bevy::math::IVec3;
use bevy::prelude::*;
use rand::Rng;
use rand::rngs::StdRng;
use serde::Deserialize;
use thiserror::Error;

use crate::config::WorldConfig;
use crate::voxel::biome::{Biome, Feature};
use crate::voxel::grid::WorldGrid;
use crate::voxel::seed::WorldSeed;
use crate::voxel::voxel_kind::VoxelKind;

/// 地形随机数流编号
const TERRAIN_STREAM: u64 = 0;

/// 默认世界中每列生成树木的概率
const TREE_CHANCE: f64 = 0.02;

/// 树冠半径
const LEAF_RADIUS: i32 = 2;

/// 最高树干
const MAX_TRUNK: i32 = 6;

/// 地表以上完整容纳一棵树所需的格数
const TREE_CLEARANCE: i32 = MAX_TRUNK + LEAF_RADIUS;

/// 世界类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorldType {
    #[default]
    Default,
    Flat,
    Amplified,
    LargeBiomes,
}

impl WorldType {
    pub fn as_str(self) -> &'static str {
        match self {
            WorldType::Default => "default",
            WorldType::Flat => "flat",
            WorldType::Amplified => "amplified",
            WorldType::LargeBiomes => "large_biomes",
        }
    }
}

impl fmt::Display for WorldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown world type `{0}`")]
pub struct UnknownWorldType(pub String);

impl FromStr for WorldType {
    type Err = UnknownWorldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "normal" => Ok(WorldType::Default),
            "flat" | "superflat" => Ok(WorldType::Flat),
            "amplified" => Ok(WorldType::Amplified),
            "large_biomes" | "large-biomes" | "largebiomes" => Ok(WorldType::LargeBiomes),
            _ => Err(UnknownWorldType(s.to_string())),
        }
    }
}

/// 高度函数参数 - 多层正弦叠加（分形）
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainProfile {
    /// 第一层的频率
    pub base_frequency: f64,
    /// 叠加层数，每层频率翻倍、振幅减半
    pub octaves: u32,
    /// 叠加结果乘以该系数后取整，作为相对海平面的高度偏移
    pub elevation_scale: f64,
}

impl TerrainProfile {
    pub const DEFAULT: Self = Self {
        base_frequency: 0.1,
        octaves: 4,
        elevation_scale: 10.0,
    };

    /// 放大化世界：同样的叠加方式，起伏加倍
    pub const AMPLIFIED: Self = Self {
        elevation_scale: 20.0,
        ..Self::DEFAULT
    };

    /// 计算某一列的高程（未取整）
    pub fn elevation(&self, x: i32, z: i32, phase: f64) -> f64 {
        let mut elevation = 0.0;
        let mut frequency = self.base_frequency;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            elevation += (x as f64 * frequency + phase).sin()
                * (z as f64 * frequency + phase).cos()
                * amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        elevation * self.elevation_scale
    }
}

impl Default for TerrainProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// 地形生成器 - 由种子和世界类型确定性地生成整个世界
pub struct TerrainGenerator<'a> {
    seed: &'a WorldSeed,
    world: &'a WorldConfig,
}

impl<'a> TerrainGenerator<'a> {
    /// 创建新的地形生成器
    pub fn new(seed: &'a WorldSeed, world: &'a WorldConfig) -> Self {
        Self { seed, world }
    }

    /// 世界类型对应的高度函数参数
    pub fn profile(&self, world_type: WorldType) -> TerrainProfile {
        match world_type {
            WorldType::Amplified => self.world.amplified_profile,
            _ => self.world.default_profile,
        }
    }

    /// 计算指定列的地表高度（草方块位于 height - 1）
    pub fn column_height(&self, x: i32, z: i32, profile: &TerrainProfile) -> i32 {
        let offset = profile.elevation(x, z, self.seed.phase()).floor() as i32;
        (self.world.sea_level + offset).clamp(1, self.world.height - 1)
    }

    /// 能种下完整树木的最高地表高度
    pub fn tree_line(&self) -> i32 {
        (self.world.height - 1 - TREE_CLEARANCE).max(1)
    }

    /// 生成完整的世界
    pub fn generate(&self, world_type: WorldType) -> WorldGrid {
        info!(
            "Generating {} world ({}x{}x{}) with seed {}",
            world_type, self.world.size, self.world.height, self.world.size, self.seed
        );
        let mut grid = WorldGrid::new(self.world.size, self.world.height);
        let mut rng = self.seed.rng(TERRAIN_STREAM);

        match world_type {
            WorldType::Flat => self.generate_flat(&mut grid),
            WorldType::Default => {
                let ceiling = self.world.height - 1;
                self.generate_hills(&mut grid, &mut rng, &self.profile(world_type), ceiling)
            }
            // 放大化世界的起伏压在树线以下，山顶的树不会被世界顶部截断
            WorldType::Amplified => {
                let ceiling = self.tree_line();
                self.generate_hills(&mut grid, &mut rng, &self.profile(world_type), ceiling)
            }
            WorldType::LargeBiomes => self.generate_biomes(&mut grid, &mut rng),
        }

        debug!(
            "World generation complete: {} air cells",
            grid.count(VoxelKind::Air)
        );
        grid
    }

    /// 平坦世界：石头 → 4 层泥土 → 1 层草
    fn generate_flat(&self, grid: &mut WorldGrid) {
        let ground = self.world.flat_ground_height.clamp(0, self.world.height - 1);
        for x in 0..self.world.size {
            for z in 0..self.world.size {
                for y in 0..=ground {
                    let kind = if y < ground - 4 {
                        VoxelKind::Stone
                    } else if y < ground {
                        VoxelKind::Dirt
                    } else {
                        VoxelKind::Grass
                    };
                    grid.set_voxel(IVec3::new(x, y, z), kind);
                }
            }
        }
    }

    /// 默认 / 放大化世界
    /// 每列：分层填充 → 树木 → 海平面附近的沙子
    fn generate_hills(
        &self,
        grid: &mut WorldGrid,
        rng: &mut StdRng,
        profile: &TerrainProfile,
        ceiling: i32,
    ) {
        let sea = self.world.sea_level;
        let tree_line = self.tree_line();
        for x in 0..self.world.size {
            for z in 0..self.world.size {
                let height = self.column_height(x, z, profile).min(ceiling);
                self.fill_column(grid, x, z, height, VoxelKind::Grass, VoxelKind::Dirt);

                // 每列都消耗一次随机数，保证序列与列的顺序一一对应
                if rng.gen_bool(TREE_CHANCE) && height > sea + 2 && height <= tree_line {
                    generate_tree(grid, rng, IVec3::new(x, height, z));
                }

                if (height - sea).abs() <= 2 {
                    grid.set_voxel(IVec3::new(x, height - 1, z), VoxelKind::Sand);
                }
            }
        }
    }

    /// 大型生物群系世界：沿 X 轴分为森林、平原、沙漠三段
    fn generate_biomes(&self, grid: &mut WorldGrid, rng: &mut StdRng) {
        let sea = self.world.sea_level;
        let tree_line = self.tree_line();
        let profile = self.world.default_profile;
        for x in 0..self.world.size {
            let biome = Biome::for_column(x, self.world.size);
            let (feature, chance) = biome.feature();
            for z in 0..self.world.size {
                let height = self.column_height(x, z, &profile);
                self.fill_column(
                    grid,
                    x,
                    z,
                    height,
                    biome.surface_block(),
                    biome.subsurface_block(),
                );

                if rng.gen_bool(chance) && height > sea {
                    let base = IVec3::new(x, height, z);
                    match feature {
                        Feature::Tree if height <= tree_line => generate_tree(grid, rng, base),
                        Feature::Tree => {}
                        Feature::Cactus => generate_cactus(grid, rng, base),
                    }
                }

                if (height - sea).abs() <= 2 {
                    grid.set_voxel(IVec3::new(x, height - 1, z), VoxelKind::Sand);
                }
            }
        }
    }

    /// 从下到上填充一列
    /// - 深层：石头
    /// - 次表层（地表下 1-4 层）：次表层方块
    /// - 地表：表层方块
    /// - 地表以上、海平面以下的空位：水
    fn fill_column(
        &self,
        grid: &mut WorldGrid,
        x: i32,
        z: i32,
        height: i32,
        surface: VoxelKind,
        subsurface: VoxelKind,
    ) {
        for y in 0..self.world.height {
            let pos = IVec3::new(x, y, z);
            if y < height - 5 {
                grid.set_voxel(pos, VoxelKind::Stone);
            } else if y < height - 1 {
                grid.set_voxel(pos, subsurface);
            } else if y == height - 1 {
                grid.set_voxel(pos, surface);
            } else if y < self.world.sea_level {
                grid.fill_if_empty(pos, VoxelKind::Water);
            }
        }
    }
}

/// 在指定位置生成一棵树
/// 树干高 4-6 格，顶部是半径为 2 的球形树冠（只填充空气）
pub fn generate_tree(grid: &mut WorldGrid, rng: &mut StdRng, base: IVec3) {
    let trunk_height = MAX_TRUNK - 2 + rng.gen_range(0..3);
    for dy in 0..trunk_height {
        grid.set_voxel(base + IVec3::Y * dy, VoxelKind::Wood);
    }

    let top = base + IVec3::Y * trunk_height;
    let r2 = LEAF_RADIUS * LEAF_RADIUS;
    for dx in -LEAF_RADIUS..=LEAF_RADIUS {
        for dy in -LEAF_RADIUS..=LEAF_RADIUS {
            for dz in -LEAF_RADIUS..=LEAF_RADIUS {
                if dx * dx + dy * dy + dz * dz <= r2 {
                    grid.fill_if_empty(top + IVec3::new(dx, dy, dz), VoxelKind::Leaves);
                }
            }
        }
    }
}

/// 仙人掌：1-3 格高的柱子
pub fn generate_cactus(grid: &mut WorldGrid, rng: &mut StdRng, base: IVec3) {
    let height = 1 + rng.gen_range(0..3);
    for dy in 0..height {
        grid.fill_if_empty(base + IVec3::Y * dy, VoxelKind::Cactus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: f64, world_type: WorldType) -> WorldGrid {
        let seed = WorldSeed::new(seed);
        let world = WorldConfig::default();
        TerrainGenerator::new(&seed, &world).generate(world_type)
    }

    fn column(grid: &WorldGrid, x: i32, z: i32, ys: std::ops::Range<i32>) -> Vec<VoxelKind> {
        ys.map(|y| grid.get_voxel(IVec3::new(x, y, z))).collect()
    }

    #[test]
    fn test_flat_layers() {
        let grid = generate(1.0, WorldType::Flat);
        assert_eq!(grid.get(5.0, 31.0, 5.0), VoxelKind::Dirt);
        assert_eq!(grid.get(5.0, 32.0, 5.0), VoxelKind::Grass);
        assert_eq!(grid.get(5.0, 33.0, 5.0), VoxelKind::Air);
        assert_eq!(grid.get(5.0, 28.0, 5.0), VoxelKind::Dirt);
        assert_eq!(grid.get(5.0, 27.0, 5.0), VoxelKind::Stone);
        assert_eq!(grid.get(0.0, 0.0, 0.0), VoxelKind::Stone);
        assert_eq!(grid.surface_height(17, 9), 33);
    }

    #[test]
    fn test_default_golden_column() {
        let seed = WorldSeed::new(42.0);
        let world = WorldConfig::default();
        let generator = TerrainGenerator::new(&seed, &world);
        assert_eq!(generator.column_height(16, 16, &TerrainProfile::DEFAULT), 31);
        assert_eq!(generator.column_height(0, 0, &TerrainProfile::DEFAULT), 38);
        assert_eq!(generator.column_height(5, 5, &TerrainProfile::DEFAULT), 28);

        let grid = generator.generate(WorldType::Default);
        let mut expected = vec![VoxelKind::Stone; 26];
        expected.extend([VoxelKind::Dirt; 4]);
        // 高度 31 距海平面 1 格，顶层的草被沙子替换
        expected.push(VoxelKind::Sand);
        expected.push(VoxelKind::Water);
        expected.extend([VoxelKind::Air; 5]);
        assert_eq!(column(&grid, 16, 16, 0..37), expected);
    }

    #[test]
    fn test_default_is_deterministic() {
        for world_type in [
            WorldType::Default,
            WorldType::Flat,
            WorldType::Amplified,
            WorldType::LargeBiomes,
        ] {
            assert_eq!(generate(42.0, world_type), generate(42.0, world_type));
        }
        assert_ne!(generate(42.0, WorldType::Default), generate(43.0, WorldType::Default));
    }

    #[test]
    fn test_amplified_differs_from_default() {
        let seed = WorldSeed::new(42.0);
        let world = WorldConfig::default();
        let generator = TerrainGenerator::new(&seed, &world);
        let amplified = generator.profile(WorldType::Amplified);
        assert_eq!(generator.column_height(16, 16, &amplified), 30);
        assert_eq!(generator.column_height(0, 0, &amplified), 45);
        assert_ne!(generate(42.0, WorldType::Amplified), generate(42.0, WorldType::Default));
    }

    #[test]
    fn test_amplified_peaks_leave_room_for_trees() {
        let seed = WorldSeed::new(42.0);
        let mut world = WorldConfig::default();
        world.amplified_profile.elevation_scale = 200.0;
        let generator = TerrainGenerator::new(&seed, &world);
        let amplified = generator.profile(WorldType::Amplified);
        let tree_line = generator.tree_line();
        assert_eq!(tree_line, 64 - 1 - 8);

        let peaks: Vec<(i32, i32)> = (0..32)
            .flat_map(|x| (0..32).map(move |z| (x, z)))
            .filter(|&(x, z)| generator.column_height(x, z, &amplified) > tree_line)
            .collect();
        assert!(!peaks.is_empty());

        let grid = generator.generate(WorldType::Amplified);
        for &(x, z) in &peaks {
            assert_eq!(grid.get_voxel(IVec3::new(x, tree_line - 1, z)), VoxelKind::Grass);
            for y in tree_line..64 {
                let kind = grid.get_voxel(IVec3::new(x, y, z));
                assert!(matches!(kind, VoxelKind::Air | VoxelKind::Wood | VoxelKind::Leaves));
            }
        }

        // 每棵树的树冠顶端都完整地留在世界内
        let mut trees = 0;
        for x in 0..32 {
            for z in 0..32 {
                let Some(wood_top) = (0..64)
                    .rev()
                    .find(|&y| grid.get_voxel(IVec3::new(x, y, z)) == VoxelKind::Wood)
                else {
                    continue;
                };
                trees += 1;
                assert!(wood_top + 1 + LEAF_RADIUS < 64);
                let crown = IVec3::new(x, wood_top + 1 + LEAF_RADIUS, z);
                assert_eq!(grid.get_voxel(crown), VoxelKind::Leaves);
            }
        }
        assert!(trees > 0);
    }

    #[test]
    fn test_water_fills_below_sea_level() {
        let grid = generate(42.0, WorldType::Default);
        // (5,5) 高度 28：地表在 27，28..32 为水
        assert_eq!(grid.get_voxel(IVec3::new(5, 27, 5)), VoxelKind::Grass);
        assert_eq!(column(&grid, 5, 5, 28..32), vec![VoxelKind::Water; 4]);
        assert_eq!(grid.get_voxel(IVec3::new(5, 32, 5)), VoxelKind::Air);
    }

    #[test]
    fn test_large_biomes_surface() {
        let grid = generate(42.0, WorldType::LargeBiomes);
        // 森林段 (0,0) 高度 38
        assert_eq!(grid.get_voxel(IVec3::new(0, 37, 0)), VoxelKind::Grass);
        assert_eq!(grid.get_voxel(IVec3::new(0, 36, 0)), VoxelKind::Dirt);
        // 沙漠段 (28,24) 高度 40
        assert_eq!(grid.get_voxel(IVec3::new(28, 39, 24)), VoxelKind::Sand);
        assert_eq!(grid.get_voxel(IVec3::new(28, 38, 24)), VoxelKind::Sand);
        assert_eq!(grid.get_voxel(IVec3::new(28, 34, 24)), VoxelKind::Stone);
    }

    #[test]
    fn test_tree_shape() {
        let mut grid = WorldGrid::new(16, 32);
        let mut rng = WorldSeed::new(7.0).rng(99);
        let base = IVec3::new(8, 4, 8);
        generate_tree(&mut grid, &mut rng, base);

        let trunk = (4..32)
            .take_while(|&y| grid.get_voxel(IVec3::new(8, y, 8)) == VoxelKind::Wood)
            .count() as i32;
        assert!((4..=6).contains(&trunk));

        let top = base + IVec3::Y * trunk;
        assert_eq!(grid.get_voxel(top), VoxelKind::Leaves);
        assert_eq!(grid.get_voxel(top + IVec3::new(2, 0, 0)), VoxelKind::Leaves);
        assert_eq!(grid.get_voxel(top + IVec3::new(0, 2, 0)), VoxelKind::Leaves);
        assert_eq!(grid.get_voxel(top + IVec3::new(2, 2, 0)), VoxelKind::Air);
        // 球体内但被树干占据的格子保持为木头
        assert_eq!(grid.get_voxel(top - IVec3::Y), VoxelKind::Wood);
        assert_eq!(grid.count(VoxelKind::Wood), trunk as usize);
    }

    #[test]
    fn test_tree_near_edge_is_clipped() {
        let mut grid = WorldGrid::new(8, 8);
        let mut rng = WorldSeed::new(1.0).rng(0);
        generate_tree(&mut grid, &mut rng, IVec3::new(0, 5, 0));
        assert!(grid.count(VoxelKind::Wood) >= 1);
        assert_eq!(grid.get_voxel(IVec3::new(-1, 7, 0)), VoxelKind::Air);
    }

    #[test]
    fn test_parse_world_type() {
        assert_eq!("large_biomes".parse::<WorldType>(), Ok(WorldType::LargeBiomes));
        assert_eq!("FLAT".parse::<WorldType>(), Ok(WorldType::Flat));
        assert!("nether".parse::<WorldType>().is_err());
        assert_eq!(WorldType::Amplified.to_string(), "amplified");
    }
}
