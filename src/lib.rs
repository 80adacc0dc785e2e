//! JSON结构图核心库
//!
//! 提供JSON文本的体积估算、大文档分块/限深处理、
//! 以及面向渲染的节点+双边集结构图构建
//! 单线程同步CPU密集转换，无内部并行；图随每份新文档整体重建

pub mod model;
pub mod utils;

// 重新导出主要类型
pub use model::classifier::{
    classify_complexity, kind_of, ComplexityProfile, ComplexityTier, NodeKind,
};
pub use model::data_core::{AppError, AppState, DocumentProfile};
pub use model::graph::{build_graph, Edge, EdgeKind, JsonGraph, SeaNode, SeaNodeKind};
pub use model::large_doc::{
    generate_preview, HandlerConfig, LargeDocumentHandler, ParseOutcome, StructureAnalysis,
    TruncationKind, TruncationMarker, TRUNCATION_KEY,
};
pub use model::path_codec::{build_id, collect_all_ids, decode_segment, encode_segment, ROOT_ID};
pub use model::size_estimator::{bytes_to_mb, estimate_bytes, SizeThresholds};
