//! map 服务 - 业务能力层
//!
//! 只负责"从一组页面中提取相关内容"，不关心递归和分区

use crate::clients::LanguageModel;
use crate::error::AppResult;
use crate::models::PartialResult;
use crate::services::prompts::{build_map_message, MAP_SYSTEM_PROMPT};
use std::sync::Arc;
use tracing::debug;

/// map 服务
///
/// 职责：
/// - 对一段已拼接的页面文本调用一次 LLM
/// - 模型返回空内容时得到 `Absent`
/// - 调用失败直接向上返回，不重试
#[derive(Clone)]
pub struct MapService {
    llm: Arc<dyn LanguageModel>,
    model_name: String,
    max_output_tokens: u32,
}

impl MapService {
    pub fn new(llm: Arc<dyn LanguageModel>, model_name: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            llm,
            model_name: model_name.into(),
            max_output_tokens,
        }
    }

    /// 提取与查询相关的内容
    ///
    /// # 参数
    /// - `query`: 用户查询
    /// - `content`: 一组页面按顺序换行拼接后的文本
    pub async fn map(&self, query: &str, content: &str) -> AppResult<PartialResult> {
        debug!("map 阶段: 输入 {} 字符", content.len());

        let user_message = build_map_message(query, content);
        let output = self
            .llm
            .complete(
                &self.model_name,
                MAP_SYSTEM_PROMPT,
                &user_message,
                self.max_output_tokens,
            )
            .await?;

        Ok(PartialResult::from_model_output(output))
    }
}
