//! 体素（方块）类型定义 - 方块注册表

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::voxel::flags::BlockFlags;

/// 体素种类枚举 - 定义游戏中所有可用的方块类型
///
/// 判别值即方块 id，`VoxelKind::Air` (0) 永远存在
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(u8)]
pub enum VoxelKind {
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    Wood = 4,
    Leaves = 5,
    Water = 6,
    Sand = 7,
    Glass = 8,
    Cobblestone = 9,
    Bedrock = 10,
    Cactus = 11,
}

/// 体素定义 - 包含体素的所有基础信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelDef {
    /// 方块名称
    pub name: &'static str,
    /// 方块颜色（sRGB，0.0-1.0），也用作破坏粒子的颜色
    pub color: [f32; 3],
    /// 属性标志位
    pub flags: BlockFlags,
    /// 半透明方块的不透明度，None 表示完全不透明
    pub alpha: Option<f32>,
}

const fn rgb(r: u8, g: u8, b: u8) -> [f32; 3] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}

/// 静态属性表，按方块 id 索引
static DEFS: [VoxelDef; VoxelKind::COUNT] = [
    VoxelDef {
        name: "Air",
        color: rgb(255, 255, 255),
        flags: BlockFlags::TRANSPARENT,
        alpha: None,
    },
    VoxelDef {
        name: "Grass",
        color: rgb(124, 252, 0),
        flags: BlockFlags::SOLID,
        alpha: None,
    },
    VoxelDef {
        name: "Dirt",
        color: rgb(139, 69, 19),
        flags: BlockFlags::SOLID,
        alpha: None,
    },
    VoxelDef {
        name: "Stone",
        color: rgb(128, 128, 128),
        flags: BlockFlags::SOLID,
        alpha: None,
    },
    VoxelDef {
        name: "Wood",
        color: rgb(222, 184, 135),
        flags: BlockFlags::SOLID,
        alpha: None,
    },
    VoxelDef {
        name: "Leaves",
        color: rgb(34, 139, 34),
        flags: BlockFlags::SOLID,
        alpha: None,
    },
    VoxelDef {
        name: "Water",
        color: rgb(30, 144, 255),
        flags: BlockFlags::TRANSPARENT,
        alpha: Some(0.7),
    },
    VoxelDef {
        name: "Sand",
        color: rgb(244, 224, 77),
        flags: BlockFlags::SOLID,
        alpha: None,
    },
    VoxelDef {
        name: "Glass",
        color: rgb(135, 206, 235),
        flags: BlockFlags::SOLID.union(BlockFlags::TRANSPARENT),
        alpha: Some(0.5),
    },
    VoxelDef {
        name: "Cobblestone",
        color: rgb(105, 105, 105),
        flags: BlockFlags::SOLID,
        alpha: None,
    },
    VoxelDef {
        name: "Bedrock",
        color: rgb(44, 44, 44),
        flags: BlockFlags::SOLID.union(BlockFlags::UNBREAKABLE),
        alpha: None,
    },
    VoxelDef {
        name: "Cactus",
        color: rgb(83, 140, 46),
        flags: BlockFlags::SOLID,
        alpha: None,
    },
];

/// 注册表中不存在的方块 id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown block id {0}")]
pub struct UnknownBlockId(pub u8);

impl VoxelKind {
    /// 注册的方块种类数量
    pub const COUNT: usize = 12;

    /// 所有方块种类，按 id 排序
    pub const ALL: [VoxelKind; Self::COUNT] = [
        VoxelKind::Air,
        VoxelKind::Grass,
        VoxelKind::Dirt,
        VoxelKind::Stone,
        VoxelKind::Wood,
        VoxelKind::Leaves,
        VoxelKind::Water,
        VoxelKind::Sand,
        VoxelKind::Glass,
        VoxelKind::Cobblestone,
        VoxelKind::Bedrock,
        VoxelKind::Cactus,
    ];

    /// 获取当前体素种类的完整定义信息（数组索引，不做哈希查找）
    #[inline]
    pub fn def(self) -> &'static VoxelDef {
        &DEFS[self as usize]
    }

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn color(self) -> [f32; 3] {
        self.def().color
    }

    /// 是否参与碰撞
    #[inline]
    pub fn is_solid(self) -> bool {
        self.def().flags.contains(BlockFlags::SOLID)
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.def().flags.contains(BlockFlags::TRANSPARENT)
    }

    pub fn is_unbreakable(self) -> bool {
        self.def().flags.contains(BlockFlags::UNBREAKABLE)
    }

    pub fn alpha(self) -> Option<f32> {
        self.def().alpha
    }

    /// 宽松转换：未知 id 在调试构建中直接断言失败，发布构建中退化为空气
    ///
    /// 仅用于注册表与外部数据必须一致的场合
    pub fn from_id_lossy(id: u8) -> Self {
        match Self::try_from(id) {
            Ok(kind) => kind,
            Err(err) => {
                debug_assert!(false, "{err}");
                VoxelKind::Air
            }
        }
    }
}

impl TryFrom<u8> for VoxelKind {
    type Error = UnknownBlockId;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(UnknownBlockId(id))
    }
}

impl fmt::Display for VoxelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VoxelKind {
    type Err = UnknownBlockName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownBlockName(s.to_string()))
    }
}

/// 注册表中不存在的方块名称
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown block name `{0}`")]
pub struct UnknownBlockName(pub String);
