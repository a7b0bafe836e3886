//! 方块属性标志位
//!
//! 使用 bitflags 存储方块类型的静态属性，由方块注册表（`VoxelDef`）持有
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u8 {
        const NONE = 0;

        /// 实心 - 参与碰撞检测
        const SOLID = 1 << 0;
        /// 透明 - 可以看到后面的方块
        const TRANSPARENT = 1 << 1;
        /// 不可破坏（基岩）
        const UNBREAKABLE = 1 << 2;
    }
}

impl Default for BlockFlags {
    fn default() -> Self {
        Self::NONE
    }
}
