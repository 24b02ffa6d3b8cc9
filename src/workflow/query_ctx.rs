//! 查询上下文
//!
//! 封装"这是本次会话的第几个查询"这一信息

use std::fmt::Display;

/// 查询上下文
#[derive(Debug, Clone)]
pub struct QueryCtx {
    /// 查询序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 查询内容
    pub query: String,
}

impl QueryCtx {
    pub fn new(index: usize, query: impl Into<String>) -> Self {
        Self {
            index,
            query: query.into(),
        }
    }
}

impl Display for QueryCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[查询 #{}]", self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefix() {
        assert_eq!(QueryCtx::new(3, "q").to_string(), "[查询 #3]");
    }
}
