/// LLM API 客户端
///
/// 编排层只依赖 [`LanguageModel`] 这一能力，具体实现可以替换
/// （OpenAI 兼容服务、测试用的 mock、带限流的包装等）。
use crate::config::Config;
use crate::error::{AppError, AppResult};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

/// 语言模型调用能力
///
/// 必须可以被多个并发分支同时调用。
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// 发送一次补全请求
    ///
    /// 模型没有产出内容时返回空字符串；调用失败时返回错误，不做重试。
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_content: &str,
        max_output_tokens: u32,
    ) -> AppResult<String>;
}

/// OpenAI 兼容的聊天补全客户端
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    temperature: f32,
}

impl OpenAiClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        // 兼容 OpenAI API 的服务都可以通过 base url 接入
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_content: &str,
        max_output_tokens: u32,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", model);
        debug!("用户消息长度: {} 字符", user_content.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(AppError::llm_request_failed)?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_content)
            .build()
            .map_err(AppError::llm_request_failed)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(self.temperature)
            .max_tokens(max_output_tokens)
            .build()
            .map_err(AppError::llm_request_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(model, e)
        })?;

        debug!("LLM API 调用成功");

        // 没有 choice 或 content 为空都视为"没有内容"
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试真实 API 调用
    ///
    /// 运行方式：
    /// ```bash
    /// OPENAI_API_KEY=sk-... cargo test test_complete_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_complete_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().expect("读取环境变量失败");
        let client = OpenAiClient::new(&config);

        let response = client
            .complete(
                &config.llm_model_name,
                "You are a terse assistant.",
                "Reply with the single word: pong",
                16,
            )
            .await
            .expect("LLM 调用失败");

        println!("LLM 响应: {}", response);
        assert!(!response.is_empty());
    }
}
