//! AppState：文档加载、策略选择与图构建的核心编排

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::classifier::{classify_complexity, ComplexityTier};
use crate::model::graph::{build_graph, JsonGraph};
use crate::model::large_doc::{HandlerConfig, LargeDocumentHandler, ParseOutcome};
use crate::model::size_estimator::{estimate_bytes, SizeThresholds};
use crate::utils::fs::{read_text_file, write_json_file};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("状态错误: {0}")]
    State(String),
}

/// 文档画像：供持久化侧直接索引，免去重复计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentProfile {
    pub byte_size: usize,
    pub node_count: u64,
    pub max_depth: u32,
    pub tier: ComplexityTier,
}

/// 应用核心状态：一次持有一份文档的DOM、结构图与画像
///
/// 图随每份新文档整体重建，不跨文档增量修补；分块缓存在加载前统一失效
#[derive(Debug)]
pub struct AppState {
    pub source_path: Option<PathBuf>,
    pub dom: Option<Value>,
    pub graph: Option<JsonGraph>,
    pub profile: Option<DocumentProfile>,
    /// 当前文档是否走了分块预览策略（此时 dom 为预览值）
    pub chunked: bool,
    /// 当前文档是否被限深裁剪（值树中含截断标记）
    pub truncated: bool,
    thresholds: SizeThresholds,
    handler: LargeDocumentHandler,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SizeThresholds::default(), HandlerConfig::default())
    }
}

impl AppState {
    pub fn new(thresholds: SizeThresholds, config: HandlerConfig) -> Self {
        Self {
            source_path: None,
            dom: None,
            graph: None,
            profile: None,
            chunked: false,
            truncated: false,
            thresholds,
            handler: LargeDocumentHandler::new(config),
        }
    }

    /// 加载JSON文件并构建结构图
    pub fn load_file(&mut self, p: &Path) -> Result<(), AppError> {
        let text = read_text_file(p)?;
        self.load_text(text)?;
        self.source_path = Some(p.to_path_buf());
        Ok(())
    }

    /// 从原文加载：估算体积 → 选择策略 → 构图与画像
    pub fn load_text(&mut self, text: String) -> Result<(), AppError> {
        self.reset();

        let byte_size = estimate_bytes(&text);
        if self.thresholds.is_very_large(byte_size) {
            tracing::warn!("超大文档: {} 字节", byte_size);
        } else if self.thresholds.is_large(byte_size) {
            tracing::info!("大文档: {} 字节", byte_size);
        }

        let dom = match self.handler.parse(text)? {
            ParseOutcome::Direct { data } => data,
            ParseOutcome::BoundedDepth { data, truncated } => {
                self.truncated = truncated;
                data
            }
            ParseOutcome::ChunkedPreview {
                preview,
                total_chunks,
                original_size,
            } => {
                self.chunked = true;
                tracing::info!(
                    "分块预览模式: {} 块，原始 {} 字节",
                    total_chunks,
                    original_size
                );
                preview
            }
        };

        let graph = build_graph(&dom);
        let complexity = classify_complexity(&dom);
        tracing::info!(
            "文档加载完成: {} 个节点, 深度 {}, 分级 {:?}",
            complexity.node_count,
            complexity.max_depth,
            complexity.tier
        );

        self.profile = Some(DocumentProfile {
            byte_size,
            node_count: complexity.node_count,
            max_depth: complexity.max_depth,
            tier: complexity.tier,
        });
        self.graph = Some(graph);
        self.dom = Some(dom);
        Ok(())
    }

    /// 清空上一份文档的全部派生状态（含处理器的分块缓存）
    fn reset(&mut self) {
        self.source_path = None;
        self.dom = None;
        self.graph = None;
        self.profile = None;
        self.chunked = false;
        self.truncated = false;
        self.handler.clear();
    }

    /// 按需加载分块（越界返回错误标记值）
    pub fn load_chunk(&mut self, index: usize) -> Value {
        self.handler.load_chunk(index)
    }

    /// 渲染提示：是否建议虚拟滚动
    pub fn should_virtualize(&self) -> bool {
        self.dom
            .as_ref()
            .map(|d| self.handler.should_virtualize(d))
            .unwrap_or(false)
    }

    /// 渲染提示：是否建议懒加载
    pub fn should_lazy_load(&self) -> bool {
        self.dom
            .as_ref()
            .map(|d| self.handler.should_lazy_load(d))
            .unwrap_or(false)
    }

    /// 将当前DOM格式化保存到指定路径
    pub fn save_to_file(&self, path: &Path) -> Result<(), AppError> {
        let dom = self
            .dom
            .as_ref()
            .ok_or_else(|| AppError::State("DOM尚未加载".into()))?;
        write_json_file(path, dom)?;
        tracing::info!("JSON文件已保存到: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::large_doc::TruncationMarker;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// 创建临时JSON文件用于测试
    fn create_test_json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(content.as_bytes()).expect("写入临时文件失败");
        file
    }

    #[test]
    fn test_load_simple_json() {
        let json_content = r#"{"name": "test", "value": 42}"#;
        let temp_file = create_test_json_file(json_content);

        let mut state = AppState::default();
        let result = state.load_file(temp_file.path());

        assert!(result.is_ok(), "加载简单JSON应该成功");
        assert!(state.dom.is_some(), "DOM应该被加载");
        let graph = state.graph.as_ref().expect("结构图应该被构建");
        assert_eq!(graph.node_count(), 3, "应该有3个节点：根、name、value");
        assert!(!state.chunked);
        assert!(!state.truncated);
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_file = create_test_json_file(r#"{"invalid": json content}"#);
        let mut state = AppState::default();
        let result = state.load_file(temp_file.path());
        assert!(
            matches!(result, Err(AppError::Parse(_))),
            "无效JSON应该透传解析错误"
        );
    }

    #[test]
    fn test_profile_for_persistence() {
        let mut state = AppState::default();
        state
            .load_text(r#"{"a": {"b": [1, 2, 3]}}"#.to_string())
            .unwrap();

        let profile = state.profile.expect("画像应该被计算");
        assert_eq!(profile.byte_size, 23);
        // 根 + a + b + 3个元素 = 6
        assert_eq!(profile.node_count, 6);
        assert_eq!(profile.max_depth, 3);
        assert_eq!(profile.tier, ComplexityTier::Low);
    }

    #[test]
    fn test_reload_rebuilds_everything() {
        let mut state = AppState::default();
        state.load_text(r#"{"a": [1, 2, 3]}"#.to_string()).unwrap();
        let first_nodes = state.graph.as_ref().unwrap().node_count();

        state.load_text(r#"{"x": 1}"#.to_string()).unwrap();
        let second_nodes = state.graph.as_ref().unwrap().node_count();

        assert_eq!(first_nodes, 5);
        assert_eq!(second_nodes, 2, "新文档必须整体重建结构图");
        assert!(state.source_path.is_none(), "文本加载不保留旧文件路径");
    }

    #[test]
    fn test_truncated_document_flagged() {
        let config = HandlerConfig {
            chunk_size_mb: 16.0 / (1024.0 * 1024.0),
            max_array_items: 10,
            ..HandlerConfig::default()
        };
        let mut state = AppState::new(SizeThresholds::default(), config);
        let items: Vec<u64> = (0..100).collect();
        let text = serde_json::to_string(&json!({ "items": items })).unwrap();
        state.load_text(text).unwrap();

        assert!(state.truncated, "超限文档应标记为已截断");
        let arr = state.dom.as_ref().unwrap()["items"].as_array().unwrap();
        assert_eq!(arr.len(), 11);
        assert!(TruncationMarker::is_marker(&arr[10]));
        // 截断后的值树仍可正常构图
        assert!(state.graph.as_ref().unwrap().node_count() > 0);
    }

    #[test]
    fn test_chunked_document_lazy_loading() {
        let config = HandlerConfig {
            chunk_size_mb: 16.0 / (1024.0 * 1024.0),
            ..HandlerConfig::default()
        };
        let mut state = AppState::new(SizeThresholds::default(), config);
        let mut text = String::from("[1,2,3]");
        text.push_str(&" ".repeat(41));
        state.load_text(text).unwrap();

        assert!(state.chunked, "块0可独立解析时应进入分块预览模式");
        let dom = state.dom.as_ref().unwrap();
        assert_eq!(dom["type"], "array", "分块模式下DOM为预览值");

        assert_eq!(state.load_chunk(0), json!([1, 2, 3]));
        let oob = state.load_chunk(42);
        assert!(oob["error"].is_string(), "越界分块请求返回错误标记");
    }

    #[test]
    fn test_render_hints() {
        let mut state = AppState::default();
        state.load_text("[1, 2, 3]".to_string()).unwrap();
        assert!(!state.should_virtualize());
        assert!(!state.should_lazy_load());

        let wide: Vec<u64> = (0..700).collect();
        state
            .load_text(serde_json::to_string(&wide).unwrap())
            .unwrap();
        assert!(state.should_virtualize(), "700个节点应建议虚拟滚动");
        assert!(!state.should_lazy_load());
    }

    #[test]
    fn test_save_to_file_roundtrip() {
        let mut state = AppState::default();
        state
            .load_text(r#"{"用户": {"名字": "张三"}}"#.to_string())
            .unwrap();

        let out = NamedTempFile::new().expect("创建临时文件失败");
        state.save_to_file(out.path()).expect("保存应该成功");

        let mut reloaded = AppState::default();
        reloaded.load_file(out.path()).expect("回读应该成功");
        assert_eq!(reloaded.dom, state.dom, "保存后回读的DOM应一致");
    }

    #[test]
    fn test_save_without_document_fails() {
        let state = AppState::default();
        let out = NamedTempFile::new().expect("创建临时文件失败");
        let result = state.save_to_file(out.path());
        assert!(matches!(result, Err(AppError::State(_))));
    }
}
