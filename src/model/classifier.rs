//! 结构分类：运行时类型判别与文档复杂度分级

use serde::Serialize;
use serde_json::Value;

/// JSON 节点类型（与 UI 展示解耦）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

/// 判别值的运行时类型
pub fn kind_of(v: &Value) -> NodeKind {
    match v {
        Value::Object(_) => NodeKind::Object,
        Value::Array(_) => NodeKind::Array,
        Value::String(_) => NodeKind::String,
        Value::Number(_) => NodeKind::Number,
        Value::Bool(_) => NodeKind::Bool,
        Value::Null => NodeKind::Null,
    }
}

/// 文档复杂度分级（粗粒度，供持久化索引与渲染提示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ComplexityTier {
    Low,
    Moderate,
    Complex,
    VeryComplex,
}

/// 复杂度画像：节点总数、最大深度与分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplexityProfile {
    pub node_count: u64,
    pub max_depth: u32,
    pub tier: ComplexityTier,
}

/// 全量遍历计算复杂度画像
///
/// 分级阈值：≤100 Low，≤1000 Moderate，≤10000 Complex，其余 VeryComplex
pub fn classify_complexity(root: &Value) -> ComplexityProfile {
    fn walk(v: &Value, depth: u32, count: &mut u64, max_depth: &mut u32) {
        *count += 1;
        if depth > *max_depth {
            *max_depth = depth;
        }
        match v {
            Value::Object(map) => {
                for child in map.values() {
                    walk(child, depth + 1, count, max_depth);
                }
            }
            Value::Array(arr) => {
                for child in arr {
                    walk(child, depth + 1, count, max_depth);
                }
            }
            _ => {}
        }
    }

    let mut count = 0u64;
    let mut max_depth = 0u32;
    walk(root, 0, &mut count, &mut max_depth);

    let tier = match count {
        0..=100 => ComplexityTier::Low,
        101..=1_000 => ComplexityTier::Moderate,
        1_001..=10_000 => ComplexityTier::Complex,
        _ => ComplexityTier::VeryComplex,
    };

    ComplexityProfile {
        node_count: count,
        max_depth,
        tier,
    }
}
