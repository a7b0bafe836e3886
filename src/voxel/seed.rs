//! 世界种子

use std::fmt;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// 世界种子 - 使用相同的种子和世界类型可以生成完全相同的世界
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WorldSeed {
    /// 主种子值，直接作为高度函数的相位，始终是有限值
    pub seed: f64,
}

impl WorldSeed {
    /// 缺省种子：未提供或无法解析时使用
    pub const DEFAULT: f64 = 12345.0;

    /// 非有限值（NaN、无穷）退化为缺省种子
    pub fn new(seed: f64) -> Self {
        if seed.is_finite() {
            // -0.0 与 0.0 视为同一个种子
            Self { seed: seed + 0.0 }
        } else {
            Self { seed: Self::DEFAULT }
        }
    }

    /// 从文本解析种子
    /// 任何有限数字（负数、小数、超出 u32 的整数）都是独立的种子；
    /// 缺失或非数字的文本退化为缺省种子，保证确定性
    pub fn parse(text: Option<&str>) -> Self {
        let Some(raw) = text.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match raw.parse::<f64>() {
            Ok(seed) if seed.is_finite() => Self::new(seed),
            _ => {
                warn!(
                    "Seed `{}` is not numeric, falling back to default seed {}",
                    raw,
                    Self::DEFAULT
                );
                Self::default()
            }
        }
    }

    /// 地形噪声使用的相位偏移
    pub fn phase(&self) -> f64 {
        self.seed
    }

    /// 随机数生成器的键：整数种子取其整数值，小数种子取其位模式
    fn key(&self) -> u64 {
        if self.seed.fract() == 0.0 && self.seed.abs() < 9.0e18 {
            self.seed as i64 as u64
        } else {
            self.seed.to_bits()
        }
    }

    /// 创建由种子决定的随机数生成器
    /// `stream` 用于区分不同用途（地形、粒子……），彼此独立
    pub fn rng(&self, stream: u64) -> StdRng {
        StdRng::seed_from_u64(self.key().rotate_left(32) ^ stream)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for WorldSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_parse_numeric() {
        assert_eq!(WorldSeed::parse(Some("42")).seed, 42.0);
        assert_eq!(WorldSeed::parse(Some("  7 ")).seed, 7.0);
        assert_eq!(WorldSeed::parse(Some("-5")).seed, -5.0);
        assert_eq!(WorldSeed::parse(Some("3.5")).seed, 3.5);
        assert_eq!(WorldSeed::parse(Some("5000000000")).seed, 5.0e9);
    }

    #[test]
    fn test_parse_fallback() {
        assert_eq!(WorldSeed::parse(None).seed, WorldSeed::DEFAULT);
        assert_eq!(WorldSeed::parse(Some("")).seed, WorldSeed::DEFAULT);
        assert_eq!(WorldSeed::parse(Some("mountains")).seed, WorldSeed::DEFAULT);
        assert_eq!(WorldSeed::parse(Some("NaN")).seed, WorldSeed::DEFAULT);
        assert_eq!(WorldSeed::parse(Some("inf")).seed, WorldSeed::DEFAULT);
    }

    #[test]
    fn test_numeric_seeds_stay_distinct() {
        let seeds = ["-5", "3.5", "5000000000", "12345"].map(|raw| WorldSeed::parse(Some(raw)));
        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
                assert_ne!(a.rng(0).gen_range(0..u64::MAX), b.rng(0).gen_range(0..u64::MAX));
            }
        }
        assert_eq!(WorldSeed::new(-0.0), WorldSeed::new(0.0));
        assert_eq!(WorldSeed::new(f64::NAN), WorldSeed::default());
    }

    #[test]
    fn test_rng_is_reproducible() {
        let seed = WorldSeed::new(42.0);
        let mut a = seed.rng(0);
        let mut b = seed.rng(0);
        for _ in 0..8 {
            assert_eq!(a.gen_range(0..1000u32), b.gen_range(0..1000u32));
        }
    }
}
