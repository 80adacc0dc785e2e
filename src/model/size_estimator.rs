//! 体积估算：UTF-8字节长度与大文档阈值判定

/// 估算原文的UTF-8字节数（&str 的 len 即编码后字节长度，多字节文本不会被低估）
pub fn estimate_bytes(text: &str) -> usize {
    text.len()
}

/// 字节数换算为MB
pub fn bytes_to_mb(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// 大文档阈值配置（阈值是配置而非常量）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeThresholds {
    /// 大文档阈值（MB）
    pub large_mb: f64,
    /// 超大文档阈值（MB），构造时钳制为不小于 large_mb
    pub very_large_mb: f64,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            large_mb: 5.0,
            very_large_mb: 50.0,
        }
    }
}

impl SizeThresholds {
    /// 新建阈值配置；very_large 被钳制为不小于 large，保证 is_very_large ⇒ is_large
    pub fn new(large_mb: f64, very_large_mb: f64) -> Self {
        Self {
            large_mb,
            very_large_mb: very_large_mb.max(large_mb),
        }
    }

    pub fn is_large(&self, bytes: usize) -> bool {
        bytes_to_mb(bytes) > self.large_mb
    }

    pub fn is_very_large(&self, bytes: usize) -> bool {
        bytes_to_mb(bytes) > self.very_large_mb
    }
}
