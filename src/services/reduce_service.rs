//! reduce 服务 - 业务能力层
//!
//! 只负责"把多个分支结果合并为一个"，不关心这些结果从哪来

use crate::clients::LanguageModel;
use crate::error::AppResult;
use crate::models::PartialResult;
use crate::services::prompts::{build_reduce_message, REDUCE_SYSTEM_PROMPT};
use std::sync::Arc;
use tracing::debug;

/// reduce 服务
///
/// 职责：
/// - 过滤掉 `Absent` 的结果，保持原有顺序
/// - 全部为 `Absent` 时直接返回 `Absent`，不调用 LLM
/// - 否则对剩余片段编号后调用一次 LLM 合并
#[derive(Clone)]
pub struct ReduceService {
    llm: Arc<dyn LanguageModel>,
    model_name: String,
    max_output_tokens: u32,
}

impl ReduceService {
    pub fn new(llm: Arc<dyn LanguageModel>, model_name: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            llm,
            model_name: model_name.into(),
            max_output_tokens,
        }
    }

    /// 合并多个分支结果
    ///
    /// # 参数
    /// - `query`: 用户查询
    /// - `partials`: 按分区顺序排列的分支结果
    pub async fn reduce(&self, query: &str, partials: Vec<PartialResult>) -> AppResult<PartialResult> {
        let total = partials.len();
        let segments: Vec<String> = partials
            .into_iter()
            .filter_map(PartialResult::into_option)
            .collect();

        if segments.is_empty() {
            debug!("reduce 阶段: {} 个分支均无结果，跳过 LLM 调用", total);
            return Ok(PartialResult::Absent);
        }

        debug!("reduce 阶段: 合并 {}/{} 个片段", segments.len(), total);

        let user_message = build_reduce_message(query, &segments);
        let output = self
            .llm
            .complete(
                &self.model_name,
                REDUCE_SYSTEM_PROMPT,
                &user_message,
                self.max_output_tokens,
            )
            .await?;

        Ok(PartialResult::from_model_output(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingModel {
        reply: String,
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        async fn complete(
            &self,
            _model: &str,
            system_prompt: &str,
            user_content: &str,
            _max_output_tokens: u32,
        ) -> AppResult<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_content.to_string()));
            Ok(self.reply.clone())
        }
    }

    fn present(text: &str) -> PartialResult {
        PartialResult::Present(text.to_string())
    }

    #[tokio::test]
    async fn test_mixed_results_only_present_are_labelled() {
        let model = Arc::new(RecordingModel {
            reply: "combined".to_string(),
            ..Default::default()
        });
        let service = ReduceService::new(model.clone(), "m", 1024);

        let result = service
            .reduce("q", vec![present("A"), PartialResult::Absent, present("B")])
            .await
            .unwrap();

        assert_eq!(result, present("combined"));
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let (system, user) = &prompts[0];
        assert_eq!(system, REDUCE_SYSTEM_PROMPT);
        assert!(user.contains("segment number 0:\nA"));
        assert!(user.contains("segment number 1:\nB"));
        assert!(!user.contains("segment number 2"));
    }

    #[tokio::test]
    async fn test_all_absent_skips_model() {
        let model = Arc::new(RecordingModel::default());
        let service = ReduceService::new(model.clone(), "m", 1024);

        let result = service
            .reduce("q", vec![PartialResult::Absent; 4])
            .await
            .unwrap();

        assert_eq!(result, PartialResult::Absent);
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_skips_model() {
        let model = Arc::new(RecordingModel::default());
        let service = ReduceService::new(model.clone(), "m", 1024);

        assert_eq!(service.reduce("q", Vec::new()).await.unwrap(), PartialResult::Absent);
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_model_reply_is_absent() {
        let model = Arc::new(RecordingModel::default());
        let service = ReduceService::new(model.clone(), "m", 1024);

        let result = service.reduce("q", vec![present("A")]).await.unwrap();

        assert_eq!(result, PartialResult::Absent);
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }
}
