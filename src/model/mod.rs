//! 数据模型层：路径编解码、分类、体积估算、构图与大文档处理

pub mod classifier;
pub mod data_core;
pub mod graph;
pub mod large_doc;
pub mod path_codec;
pub mod performance;
pub mod size_estimator;
