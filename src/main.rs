//! 程序入口：初始化日志，从命令行加载JSON文件并输出结构概要

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing_subscriber::fmt::SubscriberBuilder;

use json_haitu::{AppState, HandlerConfig, LargeDocumentHandler};

fn main() -> Result<()> {
    // 初始化日志输出（可观测性）
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("用法: json_haitu <json文件>");
    };

    let mut state = AppState::default();
    state
        .load_file(Path::new(&path))
        .with_context(|| format!("加载文件失败: {}", path))?;

    let profile = state
        .profile
        .context("文档画像缺失")?;
    println!("文件: {}", path);
    println!("字节数: {}", profile.byte_size);
    println!("节点数: {}", profile.node_count);
    println!("最大深度: {}", profile.max_depth);
    println!("复杂度分级: {:?}", profile.tier);
    println!("分块预览: {}", if state.chunked { "是" } else { "否" });
    println!("已截断: {}", if state.truncated { "是" } else { "否" });

    if let Some(graph) = &state.graph {
        println!(
            "结构图: {} 个节点, {} 条包含边, {} 条链式边",
            graph.node_count(),
            graph.containment_edges.len(),
            graph.chain_edges.len()
        );
    }

    if let Some(dom) = &state.dom {
        let handler = LargeDocumentHandler::new(HandlerConfig::default());
        let analysis = handler.analyze_structure(dom);
        println!(
            "结构分析: 主类型 {:?}, 同质 {}, 估算规模 {}, 大数组 {}, 大对象 {}",
            analysis.primary_type,
            analysis.is_homogeneous,
            analysis.estimated_size,
            analysis.has_large_arrays,
            analysis.has_large_objects
        );
    }

    println!("建议虚拟滚动: {}", state.should_virtualize());
    println!("建议懒加载: {}", state.should_lazy_load());

    tracing::info!("分析完成: {}", path);
    Ok(())
}
