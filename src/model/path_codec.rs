//! 路径编解码：JSON Pointer风格的段转义与节点ID构造

use serde_json::Value;

/// 根节点的固定ID
pub const ROOT_ID: &str = "root";

/// 转义单个路径段：先 `~`→`~0`，再 `/`→`~1`（顺序不可颠倒，否则混合段会被破坏）
pub fn encode_segment(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

/// 反转义路径段：先 `~1`→`/`，再 `~0`→`~`（与编码顺序严格相反）
pub fn decode_segment(s: &str) -> String {
    s.replace("~1", "/").replace("~0", "~")
}

/// 拼接子节点ID：父ID + "/" + 转义后的段
pub fn build_id(parent_id: &str, segment: &str) -> String {
    format!("{}/{}", parent_id, encode_segment(segment))
}

/// 深度优先收集整棵值树的全部节点ID（始终含 `root`，原始值节点同样获得ID）
pub fn collect_all_ids(root: &Value) -> Vec<String> {
    fn walk(ids: &mut Vec<String>, v: &Value, id: &str) {
        ids.push(id.to_string());
        match v {
            Value::Object(map) => {
                for (k, child) in map {
                    let child_id = build_id(id, k);
                    walk(ids, child, &child_id);
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    let child_id = build_id(id, &idx.to_string());
                    walk(ids, child, &child_id);
                }
            }
            _ => {}
        }
    }

    let mut ids = Vec::with_capacity(64);
    walk(&mut ids, root, ROOT_ID);
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_order() {
        // `~/` 段：必须先处理 `~` 再处理 `/`
        assert_eq!(encode_segment("~/"), "~0~1");
        assert_eq!(encode_segment("/~"), "~1~0");
        assert_eq!(encode_segment("a~b/c"), "a~0b~1c");
        // 已经形如转义序列的内容也要正确二次转义
        assert_eq!(encode_segment("~0"), "~00");
        assert_eq!(encode_segment("~1"), "~01");
    }

    #[test]
    fn test_decode_order() {
        assert_eq!(decode_segment("~0~1"), "~/");
        assert_eq!(decode_segment("~1~0"), "/~");
        assert_eq!(decode_segment("~00"), "~0");
        assert_eq!(decode_segment("~01"), "~1");
    }

    #[test]
    fn test_roundtrip_property() {
        // 穷举 `~`、`/` 与普通字符的短组合，验证 decode(encode(s)) == s
        let alphabet = ['~', '/', 'a', '0', '1'];
        for &a in &alphabet {
            for &b in &alphabet {
                for &c in &alphabet {
                    let s: String = [a, b, c].iter().collect();
                    assert_eq!(decode_segment(&encode_segment(&s)), s, "往返失败: {:?}", s);
                }
            }
        }
        // 更长的混合用例
        for s in ["~~//~/~", "a/b~c/d~0e~1f", "中文/键~名", ""] {
            assert_eq!(decode_segment(&encode_segment(s)), s, "往返失败: {:?}", s);
        }
    }

    #[test]
    fn test_build_id() {
        assert_eq!(build_id(ROOT_ID, "user"), "root/user");
        assert_eq!(build_id("root/user", "0"), "root/user/0");
        assert_eq!(build_id(ROOT_ID, "a/b~c"), "root/a~1b~0c");
    }

    #[test]
    fn test_collect_all_ids_contains_root() {
        for v in [json!(null), json!(42), json!([]), json!({})] {
            let ids = collect_all_ids(&v);
            assert!(ids.contains(&"root".to_string()), "缺少根ID: {:?}", v);
        }
    }

    #[test]
    fn test_collect_all_ids_cardinality() {
        // 1个根 + 2个对象键 + 3个数组元素 + 1个嵌套键 = 7
        let v = json!({
            "a": [1, 2, {"deep": true}],
            "b": "x"
        });
        let ids = collect_all_ids(&v);
        assert_eq!(ids.len(), 7, "ID数量应为 1 + 所有键与下标之和");
        assert!(ids.contains(&"root/a/2/deep".to_string()));
    }

    #[test]
    fn test_collect_all_ids_escapes_keys() {
        let v = json!({ "a/b": { "c~d": 1 } });
        let ids = collect_all_ids(&v);
        assert!(ids.contains(&"root/a~1b".to_string()));
        assert!(ids.contains(&"root/a~1b/c~0d".to_string()));
    }
}
