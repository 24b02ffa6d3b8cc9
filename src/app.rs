use crate::clients::{LanguageModel, OpenAiClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{load_pages, Page, PartialResult};
use crate::utils::logging::log_startup;
use crate::workflow::{QueryCtx, QueryFlow};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    pages: Arc<[Page]>,
    flow: QueryFlow,
}

impl App {
    /// 初始化应用：校验配置、加载文档、创建 LLM 客户端
    pub async fn initialize(config: Config, document: &Path) -> AppResult<Self> {
        config.validate()?;

        info!("\n📁 正在读取文档...");
        let pages = load_pages(document, config.page_limit).await?;

        log_startup(&config, &document.display().to_string(), pages.len());

        let llm: Arc<dyn LanguageModel> = Arc::new(OpenAiClient::new(&config));
        let flow = QueryFlow::from_config(&config, llm)?;

        Ok(Self::with_flow(pages, flow))
    }

    /// 使用已加载的页面和流程创建应用
    pub fn with_flow(pages: Vec<Page>, flow: QueryFlow) -> Self {
        Self {
            pages: pages.into(),
            flow,
        }
    }

    /// 运行应用主逻辑
    ///
    /// 提供了 `query` 时只回答一次，否则进入交互模式。
    pub async fn run(&self, query: Option<String>) -> AppResult<()> {
        match query {
            Some(query) => self.answer_once(query).await,
            None => self.interactive(BufReader::new(tokio::io::stdin())).await,
        }
    }

    /// 单次模式：失败直接返回错误
    async fn answer_once(&self, query: String) -> AppResult<()> {
        let ctx = QueryCtx::new(1, query);
        if let PartialResult::Present(answer) = self.flow.run(&ctx, self.pages.clone()).await? {
            println!("{}", answer);
        }
        Ok(())
    }

    /// 交互模式：逐行读取查询，EOF 或 Ctrl-C 结束
    ///
    /// 空行跳过；没有结果时继续下一个查询；LLM 调用失败时记录错误并结束会话。
    async fn interactive<R: AsyncBufRead + Unpin>(&self, reader: R) -> AppResult<()> {
        let mut lines = reader.lines();
        let mut index = 0;

        loop {
            print!("query: ");
            std::io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    info!("\n收到中断信号，会话结束");
                    break;
                }
            };

            let Some(line) = line else {
                info!("输入结束，会话结束");
                break;
            };

            let query = line.trim();
            if query.is_empty() {
                continue;
            }

            index += 1;
            let ctx = QueryCtx::new(index, query);

            let outcome = tokio::select! {
                outcome = self.flow.run(&ctx, self.pages.clone()) => outcome,
                _ = tokio::signal::ctrl_c() => {
                    warn!("{} 收到中断信号，已取消正在进行的查询", ctx);
                    break;
                }
            };

            match outcome {
                Ok(PartialResult::Present(answer)) => println!("{}", answer),
                Ok(PartialResult::Absent) => continue,
                Err(e) => {
                    error!("{} ❌ 处理过程中发生错误: {}", ctx, e);
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::orchestrator::{MapReduce, MapReduceSettings};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 按查询内容决定回答：`absent` 返回空内容，`boom` 返回错误
    #[derive(Default)]
    struct ScriptedModel {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(
            &self,
            model: &str,
            _system_prompt: &str,
            user_content: &str,
            _max_output_tokens: u32,
        ) -> AppResult<String> {
            let query = user_content
                .lines()
                .next()
                .and_then(|line| line.strip_prefix("Query: "))
                .unwrap_or_default()
                .to_string();
            self.queries.lock().unwrap().push(query.clone());

            match query.as_str() {
                "absent" => Ok(String::new()),
                "boom" => Err(AppError::llm_api_failed(
                    model,
                    std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded"),
                )),
                _ => Ok(format!("answer to {}", query)),
            }
        }
    }

    fn app_with(model: Arc<ScriptedModel>) -> App {
        let settings = MapReduceSettings {
            model_name: "test-model".to_string(),
            context_size: 4,
            max_output_tokens: 64,
            max_concurrent_llm_calls: 2,
        };
        let map_reduce = MapReduce::new(model, settings).unwrap();
        App::with_flow(vec![Page::new(1, "p1")], QueryFlow::new(map_reduce, None))
    }

    fn queries(model: &ScriptedModel) -> Vec<String> {
        model.queries.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_interactive_skips_blank_lines_and_stops_at_eof() {
        let model = Arc::new(ScriptedModel::default());
        let app = app_with(model.clone());

        let result = app.interactive(&b"\nq1\n   \nq2"[..]).await;

        assert!(result.is_ok());
        assert_eq!(queries(&model), vec!["q1", "q2"]);
    }

    #[tokio::test]
    async fn test_interactive_continues_after_absent_answer() {
        let model = Arc::new(ScriptedModel::default());
        let app = app_with(model.clone());

        app.interactive(&b"absent\nq1\n"[..]).await.unwrap();

        assert_eq!(queries(&model), vec!["absent", "q1"]);
    }

    #[tokio::test]
    async fn test_interactive_ends_session_on_model_error() {
        let model = Arc::new(ScriptedModel::default());
        let app = app_with(model.clone());

        let result = app.interactive(&b"\nq1\nboom\nq2\n"[..]).await;

        assert!(result.is_ok());
        assert_eq!(queries(&model), vec!["q1", "boom"]);
    }

    #[tokio::test]
    async fn test_single_query_propagates_error() {
        let model = Arc::new(ScriptedModel::default());
        let app = app_with(model.clone());

        let err = app.run(Some("boom".to_string())).await.unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
        assert_eq!(queries(&model), vec!["boom"]);
    }
}
