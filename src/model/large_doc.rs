//! 大文档处理：按体积在直接解析/分块预览/限深降级三种策略间选择
//!
//! 处理器实例一次只持有一份在途文档的分块缓存与元数据，
//! 解析新文档前由 `parse` 整体重置（或调用方显式 `clear`）

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use serde_json::{json, Map, Value};

use crate::model::classifier::{kind_of, NodeKind};
use crate::model::data_core::AppError;
use crate::model::size_estimator::{bytes_to_mb, estimate_bytes};

/// 截断标记在值树中的哨兵键
pub const TRUNCATION_KEY: &str = "__truncated__";

/// 宽集合的采样窗口（超出部分按采样比例外推）
const WIDE_COLLECTION_SAMPLE: usize = 100;

/// 处理器配置：所有上限都是配置而非常量
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerConfig {
    /// 内存预算（MB），超出仅告警并继续降级处理
    pub max_memory_mb: f64,
    /// 分块阈值与分块大小（MB）；不超过该值的文档走直接解析
    pub chunk_size_mb: f64,
    /// 限深解析的深度上限
    pub max_depth: u32,
    /// 单个数组保留的最大元素数
    pub max_array_items: usize,
    /// 单个对象保留的最大属性数
    pub max_object_props: usize,
    /// 虚拟滚动建议阈值（估算节点数）
    pub virtual_scroll_threshold: u64,
    /// 懒加载建议阈值（估算节点数）
    pub lazy_load_threshold: u64,
    /// 节点数估算的硬上限，保证病态输入下的有界耗时
    pub node_estimate_cap: u64,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            max_memory_mb: 100.0,
            chunk_size_mb: 10.0,
            max_depth: 50,
            max_array_items: 1_000,
            max_object_props: 500,
            virtual_scroll_threshold: 500,
            lazy_load_threshold: 5_000,
            node_estimate_cap: 10_000,
        }
    }
}

/// 被截断的内容种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationKind {
    Array,
    Object,
    Depth,
}

impl TruncationKind {
    fn as_str(&self) -> &'static str {
        match self {
            TruncationKind::Array => "array",
            TruncationKind::Object => "object",
            TruncationKind::Depth => "depth",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "array" => Some(TruncationKind::Array),
            "object" => Some(TruncationKind::Object),
            "depth" => Some(TruncationKind::Depth),
            _ => None,
        }
    }
}

/// 截断标记：替换超限子树/集合的哨兵，携带总量与已载入量
///
/// 截断单调且不静默丢数据：每一处被移除的内容恰好对应一个标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationMarker {
    pub kind: TruncationKind,
    pub total_count: u64,
    pub loaded_count: u64,
    pub load_more: bool,
}

impl TruncationMarker {
    /// 编码为嵌入值树的哨兵对象
    pub fn to_value(&self) -> Value {
        json!({
            (TRUNCATION_KEY): true,
            "kind": self.kind.as_str(),
            "totalCount": self.total_count,
            "loadedCount": self.loaded_count,
            "loadMore": self.load_more,
        })
    }

    /// 从哨兵对象还原标记
    pub fn from_value(v: &Value) -> Option<Self> {
        let map = v.as_object()?;
        if map.get(TRUNCATION_KEY)?.as_bool() != Some(true) {
            return None;
        }
        Some(Self {
            kind: TruncationKind::from_str(map.get("kind")?.as_str()?)?,
            total_count: map.get("totalCount")?.as_u64()?,
            loaded_count: map.get("loadedCount")?.as_u64()?,
            load_more: map.get("loadMore")?.as_bool()?,
        })
    }

    /// 判断一个值是否为截断标记
    pub fn is_marker(v: &Value) -> bool {
        Self::from_value(v).is_some()
    }
}

/// 解析结果：三种策略各自的产物
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// 直接解析：完整数据，未分块
    Direct { data: Value },
    /// 分块预览：仅块0已解析，其余由调用方按需惰性加载
    ChunkedPreview {
        preview: Value,
        total_chunks: usize,
        original_size: usize,
    },
    /// 限深降级：完整解析一次后按上限裁剪
    BoundedDepth { data: Value, truncated: bool },
}

/// 结构分析结果（有界遍历得出，供渲染提示）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureAnalysis {
    /// 根数组前约10个元素是否同类型
    pub is_homogeneous: bool,
    /// 根值的运行时类型
    pub primary_type: NodeKind,
    /// 估算节点数（有界）
    pub estimated_size: u64,
    /// 有界遍历内观测到的最大深度
    pub depth: u32,
    /// 是否见过超过1000项的数组
    pub has_large_arrays: bool,
    /// 是否见过超过500键的对象
    pub has_large_objects: bool,
}

/// 大文档处理器：持有当前文档原文作为分块切片的所有权载体
#[derive(Debug, Default)]
pub struct LargeDocumentHandler {
    config: HandlerConfig,
    source: String,
    chunk_ranges: Vec<Range<usize>>,
    chunk_cache: HashMap<usize, Value>,
}

impl LargeDocumentHandler {
    pub fn new(config: HandlerConfig) -> Self {
        Self {
            config,
            source: String::new(),
            chunk_ranges: Vec::new(),
            chunk_cache: HashMap::new(),
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// 清空在途文档的原文、分块区间与缓存（解析新文档前的失效操作）
    pub fn clear(&mut self) {
        self.source.clear();
        self.chunk_ranges.clear();
        self.chunk_cache.clear();
    }

    fn chunk_bytes(&self) -> usize {
        ((self.config.chunk_size_mb * 1024.0 * 1024.0) as usize).max(1)
    }

    /// 解析入口：接管原文所有权并按估算体积选择策略
    ///
    /// 语法错误原样透传；合法但超限的文档永不报错，只降级为带标记的数据
    pub fn parse(&mut self, text: String) -> Result<ParseOutcome, AppError> {
        self.clear();
        self.source = text;

        let bytes = estimate_bytes(&self.source);
        let chunk_bytes = self.chunk_bytes();

        // 策略一：体积不超过分块阈值，直接整体解析
        if bytes <= chunk_bytes {
            let data: Value = serde_json::from_str(&self.source)?;
            return Ok(ParseOutcome::Direct { data });
        }

        if bytes_to_mb(bytes) > self.config.max_memory_mb {
            tracing::warn!(
                "文档体积 {:.1}MB 超过内存预算 {:.1}MB，按降级策略继续",
                bytes_to_mb(bytes),
                self.config.max_memory_mb
            );
        }

        // 策略二：切块并尝试独立解析块0；成功则返回预览，其余块按需加载
        self.chunk_ranges = split_ranges(&self.source, chunk_bytes);
        let first_slice = &self.source[self.chunk_ranges[0].clone()];
        if let Ok(first) = serde_json::from_str::<Value>(first_slice) {
            let preview = generate_preview(&first);
            tracing::info!(
                "分块预览就绪: 共 {} 块，原始 {} 字节",
                self.chunk_ranges.len(),
                bytes
            );
            let total_chunks = self.chunk_ranges.len();
            self.chunk_cache.insert(0, first);
            return Ok(ParseOutcome::ChunkedPreview {
                preview,
                total_chunks,
                original_size: bytes,
            });
        }

        // 策略三：块边界几乎不会对齐JSON语法，单文档大输入的常规路径是
        // 整体解析一次后按上限裁剪
        let full: Value = serde_json::from_str(&self.source)?;
        let mut truncated = false;
        let data = truncate_value(&full, &self.config, 0, &mut truncated);
        if truncated {
            tracing::info!("限深解析完成，部分内容被截断标记替换");
        }
        Ok(ParseOutcome::BoundedDepth { data, truncated })
    }

    /// 当前文档的分块总数（未分块时为0）
    pub fn total_chunks(&self) -> usize {
        self.chunk_ranges.len()
    }

    /// 惰性加载指定分块：对不可变切片的纯重解析，可乱序安全重入
    ///
    /// 越界或切片不可解析时返回错误标记值而非panic（UI竞态是可恢复情形）
    pub fn load_chunk(&mut self, index: usize) -> Value {
        if index >= self.chunk_ranges.len() {
            tracing::warn!(
                "分块请求越界: {} / 共 {} 块",
                index,
                self.chunk_ranges.len()
            );
            return json!({
                "error": "分块下标越界",
                "requested": index,
                "totalChunks": self.chunk_ranges.len(),
            });
        }
        if let Some(cached) = self.chunk_cache.get(&index) {
            return cached.clone();
        }
        let slice = &self.source[self.chunk_ranges[index].clone()];
        match serde_json::from_str::<Value>(slice) {
            Ok(v) => {
                self.chunk_cache.insert(index, v.clone());
                v
            }
            Err(e) => json!({
                "error": format!("分块解析失败: {}", e),
                "chunk": index,
            }),
        }
    }

    /// 有界的节点数估算：宽集合取前100个子元素采样并按比例外推，
    /// 整体受 node_estimate_cap 硬上限约束，用精确性换可预测耗时
    pub fn node_count_estimate(&self, v: &Value) -> u64 {
        fn sample_children<'a>(
            len: usize,
            children: impl Iterator<Item = &'a Value>,
            cap: u64,
            count: &mut u64,
        ) {
            let before = *count;
            for child in children.take(WIDE_COLLECTION_SAMPLE) {
                if *count >= cap {
                    return;
                }
                walk(child, cap, count);
            }
            if len > WIDE_COLLECTION_SAMPLE {
                let sampled = (*count - before) as f64;
                let per_child = sampled / WIDE_COLLECTION_SAMPLE as f64;
                let rest = (per_child * (len - WIDE_COLLECTION_SAMPLE) as f64) as u64;
                *count = count.saturating_add(rest).min(cap);
            }
        }

        fn walk(v: &Value, cap: u64, count: &mut u64) {
            if *count >= cap {
                return;
            }
            *count += 1;
            match v {
                Value::Array(arr) => sample_children(arr.len(), arr.iter(), cap, count),
                Value::Object(map) => sample_children(map.len(), map.values(), cap, count),
                _ => {}
            }
        }

        let cap = self.config.node_estimate_cap;
        let mut count = 0u64;
        walk(v, cap, &mut count);
        count.min(cap)
    }

    /// 是否建议虚拟滚动
    pub fn should_virtualize(&self, v: &Value) -> bool {
        self.node_count_estimate(v) > self.config.virtual_scroll_threshold
    }

    /// 是否建议懒加载
    pub fn should_lazy_load(&self, v: &Value) -> bool {
        self.node_count_estimate(v) > self.config.lazy_load_threshold
    }

    /// 有界结构分析：深度上限20，每层采样10个子元素，
    /// 以值地址为键的访问集防御程序化构造值中的意外环
    pub fn analyze_structure(&self, v: &Value) -> StructureAnalysis {
        const DEPTH_CAP: u32 = 20;
        const CHILD_SAMPLE: usize = 10;
        const LARGE_ARRAY_ITEMS: usize = 1_000;
        const LARGE_OBJECT_KEYS: usize = 500;

        struct Scan {
            max_depth: u32,
            has_large_arrays: bool,
            has_large_objects: bool,
        }

        fn walk(v: &Value, depth: u32, visited: &mut HashSet<usize>, scan: &mut Scan) {
            if depth >= DEPTH_CAP {
                return;
            }
            if matches!(v, Value::Array(_) | Value::Object(_)) {
                let addr = v as *const Value as usize;
                if !visited.insert(addr) {
                    return;
                }
            }
            if depth > scan.max_depth {
                scan.max_depth = depth;
            }
            match v {
                Value::Array(arr) => {
                    if arr.len() > LARGE_ARRAY_ITEMS {
                        scan.has_large_arrays = true;
                    }
                    for child in arr.iter().take(CHILD_SAMPLE) {
                        walk(child, depth + 1, visited, scan);
                    }
                }
                Value::Object(map) => {
                    if map.len() > LARGE_OBJECT_KEYS {
                        scan.has_large_objects = true;
                    }
                    for child in map.values().take(CHILD_SAMPLE) {
                        walk(child, depth + 1, visited, scan);
                    }
                }
                _ => {}
            }
        }

        let mut scan = Scan {
            max_depth: 0,
            has_large_arrays: false,
            has_large_objects: false,
        };
        let mut visited = HashSet::new();
        walk(v, 0, &mut visited, &mut scan);

        let is_homogeneous = match v {
            Value::Array(arr) => {
                let mut kinds = arr.iter().take(10).map(kind_of);
                match kinds.next() {
                    Some(first) => kinds.all(|k| k == first),
                    None => true,
                }
            }
            _ => true,
        };

        StructureAnalysis {
            is_homogeneous,
            primary_type: kind_of(v),
            estimated_size: self.node_count_estimate(v),
            depth: scan.max_depth,
            has_large_arrays: scan.has_large_arrays,
            has_large_objects: scan.has_large_objects,
        }
    }
}

/// 按固定字节数切块，块边界向后对齐到UTF-8字符边界
fn split_ranges(source: &str, chunk_bytes: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    while start < source.len() {
        let mut end = (start + chunk_bytes).min(source.len());
        while end < source.len() && !source.is_char_boundary(end) {
            end += 1;
        }
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// 按上限裁剪值树：超限集合就地替换为「前N项 + 一个标记」，
/// 触达深度上限的容器整体替换为单个深度标记
fn truncate_value(v: &Value, cfg: &HandlerConfig, depth: u32, truncated: &mut bool) -> Value {
    match v {
        Value::Array(arr) => {
            if depth >= cfg.max_depth {
                *truncated = true;
                return TruncationMarker {
                    kind: TruncationKind::Depth,
                    total_count: arr.len() as u64,
                    loaded_count: 0,
                    load_more: true,
                }
                .to_value();
            }
            let mut out: Vec<Value> = arr
                .iter()
                .take(cfg.max_array_items)
                .map(|c| truncate_value(c, cfg, depth + 1, truncated))
                .collect();
            if arr.len() > cfg.max_array_items {
                *truncated = true;
                out.push(
                    TruncationMarker {
                        kind: TruncationKind::Array,
                        total_count: arr.len() as u64,
                        loaded_count: cfg.max_array_items as u64,
                        load_more: true,
                    }
                    .to_value(),
                );
            }
            Value::Array(out)
        }
        Value::Object(map) => {
            if depth >= cfg.max_depth {
                *truncated = true;
                return TruncationMarker {
                    kind: TruncationKind::Depth,
                    total_count: map.len() as u64,
                    loaded_count: 0,
                    load_more: true,
                }
                .to_value();
            }
            let mut out = Map::new();
            for (k, c) in map.iter().take(cfg.max_object_props) {
                out.insert(k.clone(), truncate_value(c, cfg, depth + 1, truncated));
            }
            if map.len() > cfg.max_object_props {
                *truncated = true;
                out.insert(
                    TRUNCATION_KEY.to_string(),
                    TruncationMarker {
                        kind: TruncationKind::Object,
                        total_count: map.len() as u64,
                        loaded_count: cfg.max_object_props as u64,
                        load_more: true,
                    }
                    .to_value(),
                );
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// 生成O(1)体积的预览：数组取前3个样本，对象取前5个键，嵌套值折叠为类型+数量标签
pub fn generate_preview(v: &Value) -> Value {
    match v {
        Value::Array(arr) => json!({
            "type": "array",
            "length": arr.len(),
            "sample": arr.iter().take(3).map(summarize_value).collect::<Vec<Value>>(),
            "label": format!("Array[{}]", arr.len()),
        }),
        Value::Object(map) => {
            let mut sample = Map::new();
            for (k, c) in map.iter().take(5) {
                sample.insert(k.clone(), summarize_value(c));
            }
            json!({
                "type": "object",
                "keyCount": map.len(),
                "keys": map.keys().take(5).cloned().collect::<Vec<String>>(),
                "sample": sample,
                "label": format!("Object{{{} keys}}", map.len()),
            })
        }
        other => summarize_value(other),
    }
}

/// 单值摘要：容器折叠为标签，超过50字符的字符串截断
fn summarize_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => json!(format!("Object{{{} keys}}", map.len())),
        Value::Array(arr) => json!(format!("Array[{}]", arr.len())),
        Value::String(s) if s.chars().count() > 50 => {
            let truncated: String = s.chars().take(50).collect();
            json!(format!("{}...", truncated))
        }
        other => other.clone(),
    }
}
