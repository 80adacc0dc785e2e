//! 工具层：文件IO

pub mod fs;
