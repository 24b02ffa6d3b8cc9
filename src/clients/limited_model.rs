//! 带全局并发上限的模型包装
//!
//! 整棵递归树共享同一个 `Semaphore`，每次模型调用持有一个许可。
//! 许可只在调用期间持有，等待子分支时不占用，因此不会因为树太深而死锁。

use crate::clients::LanguageModel;
use crate::error::{AppResult, LlmError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;

pub struct LimitedModel {
    inner: Arc<dyn LanguageModel>,
    permits: Arc<Semaphore>,
}

impl LimitedModel {
    pub fn new(inner: Arc<dyn LanguageModel>, permits: Arc<Semaphore>) -> Self {
        Self { inner, permits }
    }
}

#[async_trait]
impl LanguageModel for LimitedModel {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_content: &str,
        max_output_tokens: u32,
    ) -> AppResult<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| LlmError::LimiterClosed)?;

        self.inner
            .complete(model, system_prompt, user_content, max_output_tokens)
            .await
    }
}
