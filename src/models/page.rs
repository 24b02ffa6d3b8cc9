//! 文档页面

/// 文档中的一页文本
///
/// 由文档加载器产出，之后在整个 map-reduce 过程中只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 在原始文档中的页码（从1开始，仅用于日志显示）
    pub number: usize,
    /// 页面纯文本
    pub text: String,
}

impl Page {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// 按原始顺序用换行符拼接一组页面
pub fn join_pages(pages: &[Page]) -> String {
    pages
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
