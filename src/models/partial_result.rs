//! 分支结果
//!
//! "没有内容" 与 "内容为空字符串" 必须区分开，所以这里不用空字符串做哨兵值。

/// 一个递归分支（或一次 map / reduce 调用）的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PartialResult {
    /// 模型提取到了内容
    Present(String),
    /// 没有结果：输入为空、模型返回空内容、或者所有子分支都没有结果
    #[default]
    Absent,
}

impl PartialResult {
    /// 将模型原始输出转换为结果，空白输出视为 `Absent`，其余原样保留
    pub fn from_model_output(output: String) -> Self {
        if output.trim().is_empty() {
            PartialResult::Absent
        } else {
            PartialResult::Present(output)
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, PartialResult::Present(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PartialResult::Present(text) => Some(text),
            PartialResult::Absent => None,
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            PartialResult::Present(text) => Some(text),
            PartialResult::Absent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_output_is_absent() {
        assert_eq!(PartialResult::from_model_output(String::new()), PartialResult::Absent);
        assert_eq!(
            PartialResult::from_model_output("  \n\t".to_string()),
            PartialResult::Absent
        );
    }

    #[test]
    fn test_present_output_is_kept_verbatim() {
        let result = PartialResult::from_model_output("  padded answer \n".to_string());
        assert_eq!(result.as_text(), Some("  padded answer \n"));
        assert!(result.is_present());
    }

    #[test]
    fn test_into_option() {
        assert_eq!(PartialResult::Absent.into_option(), None);
        assert_eq!(
            PartialResult::Present("x".to_string()).into_option(),
            Some("x".to_string())
        );
    }
}
