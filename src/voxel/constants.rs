//! 体素世界常量定义

/// 世界水平尺寸（单位：体素）- X 和 Z 方向相同
pub const WORLD_SIZE: i32 = 32;

/// 世界高度（单位：体素）
pub const WORLD_HEIGHT: i32 = 64;

/// 海平面高度 - 低于该高度的空位会被水填充
pub const SEA_LEVEL: i32 = 32;

/// 平坦世界的地表高度（草方块所在的层）
pub const FLAT_GROUND_HEIGHT: i32 = 32;

/// 世界水平尺寸上限，整个世界常驻内存
pub const MAX_WORLD_SIZE: i32 = 512;

/// 世界高度上限
pub const MAX_WORLD_HEIGHT: i32 = 256;
