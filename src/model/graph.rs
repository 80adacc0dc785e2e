//! 图构建：将JSON值递归转换为节点与双边集（包含边与链式边）

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::model::path_codec::{build_id, ROOT_ID};

/// 图节点类型（对象/数组/原始值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeaNodeKind {
    Object,
    Array,
    Primitive,
}

impl From<&Value> for SeaNodeKind {
    fn from(v: &Value) -> Self {
        match v {
            Value::Object(_) => SeaNodeKind::Object,
            Value::Array(_) => SeaNodeKind::Array,
            _ => SeaNodeKind::Primitive,
        }
    }
}

/// 图节点：以转义后的JSON Pointer路径为唯一ID
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeaNode {
    /// 节点唯一ID（根为固定字面量 `root`）
    pub id: String,
    /// 节点类型
    pub kind: SeaNodeKind,
    /// 节点深度（根为0）
    pub depth: u32,
    /// 祖先ID序列（由根到直接父级）
    pub parent_path_ids: Vec<String>,
    /// 容器节点的子元素数量（对象键数 / 数组长度）
    pub child_count: u32,
    /// 数组子节点在父数组中的下标
    pub array_index: Option<u32>,
    /// 原始值节点携带的值
    pub value: Option<Value>,
    /// 是否为根节点
    pub is_root: bool,
    /// 深度优先访问序号（布局排序的稳定决胜键）
    pub sequence: u64,
    /// 折叠状态：调用方拥有的UI标记，构图过程从不读取
    pub expanded: bool,
}

/// 边类型：包含边构成树；链式边仅连接同一数组的相邻元素
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind {
    Containment,
    Chain,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub kind: EdgeKind,
}

/// 解析上下文：显式穿透递归，不依赖任何全局状态，支持独立文档的可重入解析
#[derive(Debug, Default)]
pub struct ParserContext {
    node_sequence: u64,
    nodes: Vec<SeaNode>,
    containment_edges: Vec<Edge>,
    chain_edges: Vec<Edge>,
}

impl ParserContext {
    fn next_sequence(&mut self) -> u64 {
        let seq = self.node_sequence;
        self.node_sequence += 1;
        seq
    }
}

/// 构图结果：节点与两类边
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonGraph {
    pub nodes: Vec<SeaNode>,
    pub containment_edges: Vec<Edge>,
    pub chain_edges: Vec<Edge>,
}

impl JsonGraph {
    /// 所有边：先包含边后链式边
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.containment_edges.iter().chain(self.chain_edges.iter())
    }

    /// 全部节点ID集合
    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.containment_edges.len() + self.chain_edges.len()
    }
}

/// 将JSON值整体转换为图（确定且幂等：同构输入产生相同的ID与边集）
///
/// 折叠/展开是纯渲染关注点，构图始终物化完整结构图
pub fn build_graph(root: &Value) -> JsonGraph {
    fn child_count_of(v: &Value) -> u32 {
        match v {
            Value::Object(map) => map.len() as u32,
            Value::Array(arr) => arr.len() as u32,
            _ => 0,
        }
    }

    fn visit(
        ctx: &mut ParserContext,
        v: &Value,
        id: &str,
        depth: u32,
        ancestry: &[String],
        array_index: Option<u32>,
    ) {
        let sequence = ctx.next_sequence();
        let kind = SeaNodeKind::from(v);
        ctx.nodes.push(SeaNode {
            id: id.to_string(),
            kind,
            depth,
            parent_path_ids: ancestry.to_vec(),
            child_count: child_count_of(v),
            array_index,
            value: match kind {
                SeaNodeKind::Primitive => Some(v.clone()),
                _ => None,
            },
            is_root: depth == 0,
            sequence,
            expanded: false,
        });

        let mut child_ancestry = Vec::with_capacity(ancestry.len() + 1);
        child_ancestry.extend_from_slice(ancestry);
        child_ancestry.push(id.to_string());

        match v {
            Value::Object(map) => {
                // 对象子节点按键的插入顺序遍历（确定性要求）
                for (key, child) in map {
                    let child_id = build_id(id, key);
                    ctx.containment_edges.push(Edge {
                        source_id: id.to_string(),
                        target_id: child_id.clone(),
                        kind: EdgeKind::Containment,
                    });
                    visit(ctx, child, &child_id, depth + 1, &child_ancestry, None);
                }
            }
            Value::Array(arr) => {
                let mut prev_id: Option<String> = None;
                for (idx, child) in arr.iter().enumerate() {
                    let child_id = build_id(id, &idx.to_string());
                    ctx.containment_edges.push(Edge {
                        source_id: id.to_string(),
                        target_id: child_id.clone(),
                        kind: EdgeKind::Containment,
                    });
                    // 相邻元素之间的链式边，独立于包含边存在
                    if let Some(prev) = prev_id.take() {
                        ctx.chain_edges.push(Edge {
                            source_id: prev,
                            target_id: child_id.clone(),
                            kind: EdgeKind::Chain,
                        });
                    }
                    visit(
                        ctx,
                        child,
                        &child_id,
                        depth + 1,
                        &child_ancestry,
                        Some(idx as u32),
                    );
                    prev_id = Some(child_id);
                }
            }
            _ => {}
        }
    }

    let mut ctx = ParserContext::default();
    visit(&mut ctx, root, ROOT_ID, 0, &[], None);

    JsonGraph {
        nodes: ctx.nodes,
        containment_edges: ctx.containment_edges,
        chain_edges: ctx.chain_edges,
    }
}
