//! IO helper: safe file read/write for JSON

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use crate::model::data_core::AppError;
use serde_json::Value;

/// 读取文件原文（体积估算需要看到编码后的字节，解析延后到策略选择之后）
pub fn read_text_file(p: &Path) -> Result<String, AppError> {
    let f = File::open(p)?;
    let mut rdr = BufReader::new(f);
    let mut text = String::new();
    rdr.read_to_string(&mut text)?;
    Ok(text)
}

/// 将JSON数据保存到文件（格式化输出）
pub fn write_json_file(p: &Path, value: &Value) -> Result<(), AppError> {
    let f = File::create(p)?;
    serde_json::to_writer_pretty(f, value)?;
    Ok(())
}
