//! 性能基准测试模块
//!
//! 用于测试大文档解析、构图与限深裁剪的性能
//! 遵循NFR要求：耗时与输入体积近线性，不得出现平方级退化

use crate::model::data_core::AppState;
use crate::model::graph::build_graph;
use crate::model::large_doc::{HandlerConfig, LargeDocumentHandler};
use serde_json::{json, Value};
use std::time::Instant;

/// 性能测试结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }
}

/// 生成大型测试JSON数据
pub fn generate_large_json(depth: usize, width: usize) -> Value {
    fn create_nested_object(current_depth: usize, max_depth: usize, width: usize) -> Value {
        if current_depth >= max_depth {
            return json!("叶子节点值");
        }

        let mut obj = serde_json::Map::new();

        // 添加各种类型的字段
        for i in 0..width {
            let key = format!("field_{}", i);
            let value = match i % 5 {
                0 => json!(format!("字符串值_{}", i)),
                1 => json!(i as i64),
                2 => json!(i % 2 == 0),
                3 => json!([1, 2, 3, i]),
                4 => create_nested_object(current_depth + 1, max_depth, width / 2),
                _ => json!(null),
            };
            obj.insert(key, value);
        }

        Value::Object(obj)
    }

    let mut root = serde_json::Map::new();
    root.insert(
        "metadata".to_string(),
        json!({
            "generated_at": "2025-01-09T10:00:00Z",
            "depth": depth,
            "width": width,
            "description": "性能测试用大型JSON文档"
        }),
    );

    root.insert("data".to_string(), create_nested_object(0, depth, width));

    // 添加大型数组
    let large_array: Vec<Value> = (0..width * 10)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("项目_{}", i),
                "value": i * 2,
                "active": i % 3 == 0
            })
        })
        .collect();
    root.insert("items".to_string(), json!(large_array));

    Value::Object(root)
}

/// 测试JSON解析性能
pub fn benchmark_json_parsing(json_str: &str) -> PerformanceResult {
    let start = Instant::now();
    let parse_result = serde_json::from_str::<Value>(json_str);
    let duration = start.elapsed();

    match parse_result {
        Ok(_) => PerformanceResult::new(
            "JSON解析",
            duration.as_millis(),
            true,
            &format!("解析了 {} 字节的JSON", json_str.len()),
        ),
        Err(e) => PerformanceResult::new(
            "JSON解析",
            duration.as_millis(),
            false,
            &format!("解析失败: {}", e),
        ),
    }
}

/// 测试结构图构建性能
pub fn benchmark_graph_build(json_data: &Value) -> PerformanceResult {
    let start = Instant::now();
    let graph = build_graph(json_data);
    let duration = start.elapsed();

    let success = graph.node_count() > 0;
    let details = format!(
        "构建了 {} 个节点、{} 条边",
        graph.node_count(),
        graph.edge_count()
    );

    PerformanceResult::new("结构图构建", duration.as_millis(), success, &details)
}

/// 测试大文档处理器的整体耗时（含策略选择与可能的限深裁剪）
pub fn benchmark_handler_parse(json_str: &str, config: HandlerConfig) -> PerformanceResult {
    let mut handler = LargeDocumentHandler::new(config);
    let start = Instant::now();
    let outcome = handler.parse(json_str.to_string());
    let duration = start.elapsed();

    match outcome {
        Ok(_) => PerformanceResult::new(
            "大文档处理",
            duration.as_millis(),
            true,
            &format!("处理了 {} 字节", json_str.len()),
        ),
        Err(e) => PerformanceResult::new(
            "大文档处理",
            duration.as_millis(),
            false,
            &format!("处理失败: {}", e),
        ),
    }
}

/// 运行综合性能测试
pub fn run_performance_suite() -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    // 测试不同规模的数据
    let test_cases = [
        (3, 10), // 小型：深度3，宽度10
        (4, 20), // 中型：深度4，宽度20
        (5, 30), // 大型：深度5，宽度30
    ];

    for (depth, width) in test_cases {
        println!("测试规模：深度{}，宽度{}", depth, width);

        // 生成测试数据
        let start = Instant::now();
        let json_data = generate_large_json(depth, width);
        let generation_time = start.elapsed();

        results.push(PerformanceResult::new(
            &format!("数据生成({}x{})", depth, width),
            generation_time.as_millis(),
            true,
            &format!("生成了深度{}宽度{}的JSON", depth, width),
        ));

        // 序列化与解析测试
        let json_str = serde_json::to_string(&json_data).unwrap();
        results.push(benchmark_json_parsing(&json_str));

        // 构图测试
        results.push(benchmark_graph_build(&json_data));

        // 大文档处理测试
        results.push(benchmark_handler_parse(&json_str, HandlerConfig::default()));

        // AppState整体加载测试
        let start = Instant::now();
        let mut state = AppState::default();
        state.load_text(json_str).unwrap();
        let load_time = start.elapsed();

        results.push(PerformanceResult::new(
            &format!("AppState加载({}x{})", depth, width),
            load_time.as_millis(),
            true,
            &format!(
                "加载了 {} 个节点",
                state.graph.as_ref().map(|g| g.node_count()).unwrap_or(0)
            ),
        ));
    }

    results
}
