//! 体素世界模块
//!
//! 这个模块包含了世界数据的核心部分：
//!
//! - **constants**: 常量定义（世界尺寸、海平面等）
//! - **flags**: 方块属性标志位
//! - **voxel_kind**: 方块注册表（种类、属性、颜色）
//! - **change**: 方块变更记录
//! - **grid**: 世界网格（整个世界的体素存储）
//! - **seed**: 世界种子与确定性随机数
//! - **biome**: 生物群系（森林、平原、沙漠）
//! - **terrain**: 地形生成器（平坦、丘陵、放大、大型生物群系、树木）

pub mod biome;
pub mod change;
pub mod constants;
pub mod flags;
pub mod grid;
pub mod seed;
pub mod terrain;
pub mod voxel_kind;

// 重新导出常用类型，方便外部使用
pub use biome::{Biome, Feature};
pub use change::BlockChange;
pub use constants::{
    FLAT_GROUND_HEIGHT, MAX_WORLD_HEIGHT, MAX_WORLD_SIZE, SEA_LEVEL, WORLD_HEIGHT, WORLD_SIZE,
};
pub use flags::BlockFlags;
pub use grid::{WorldGrid, floor_pos};
pub use seed::WorldSeed;
pub use terrain::{TerrainGenerator, TerrainProfile, UnknownWorldType, WorldType};
pub use voxel_kind::{UnknownBlockId, UnknownBlockName, VoxelDef, VoxelKind};
