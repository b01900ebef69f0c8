//! 文件处理上下文
//!
//! 封装"我正在处理队列中的第几个文件"这一信息

use std::fmt::Display;

/// 文件处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 在队列中的索引（从0开始）
    pub index: usize,

    /// 队列长度
    pub total: usize,

    /// 文件名（仅用于日志显示）
    pub file_name: String,
}

impl ItemCtx {
    /// 创建新的文件上下文
    pub fn new(index: usize, total: usize, file_name: impl Into<String>) -> Self {
        Self {
            index,
            total,
            file_name: file_name.into(),
        }
    }

    /// 从1开始的序号
    pub fn position(&self) -> usize {
        self.index + 1
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文件 {}/{}]", self.position(), self.total)
    }
}
