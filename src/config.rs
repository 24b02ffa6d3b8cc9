use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量 → 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 采样温度
    pub temperature: f32,
    /// 单次调用的最大输出 token 数
    pub max_output_tokens: u32,
    // --- map-reduce 配置 ---
    /// 每一层最多合并的分组数，同时决定每次扇出的分区数
    pub context_size: usize,
    /// 最多读取的文本页数
    pub page_limit: usize,
    /// 整棵递归树共享的最大并发 LLM 调用数
    pub max_concurrent_llm_calls: usize,
    // --- 输出配置 ---
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 问答记录文件（JSON Lines），为空则不记录
    pub transcript_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_output_tokens: 1024,
            context_size: 4,
            page_limit: 32,
            max_concurrent_llm_calls: 8,
            verbose_logging: false,
            transcript_file: None,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env()
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub async fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.to_string(),
                source,
            }
            .into()
        })
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env(mut self) -> AppResult<Self> {
        if let Some(key) = env_string("OPENAI_API_KEY").or_else(|| env_string("LLM_API_KEY")) {
            self.llm_api_key = key;
        }
        if let Some(url) = env_string("LLM_API_BASE_URL") {
            self.llm_api_base_url = url;
        }
        if let Some(model) = env_string("LLM_MODEL_NAME") {
            self.llm_model_name = model;
        }
        if let Some(path) = env_string("TRANSCRIPT_FILE") {
            self.transcript_file = Some(path);
        }

        self.temperature = env_parse("LLM_TEMPERATURE", "f32")?.unwrap_or(self.temperature);
        self.max_output_tokens =
            env_parse("MAX_OUTPUT_TOKENS", "u32")?.unwrap_or(self.max_output_tokens);
        self.context_size = env_parse("CONTEXT_SIZE", "usize")?.unwrap_or(self.context_size);
        self.page_limit = env_parse("PAGE_LIMIT", "usize")?.unwrap_or(self.page_limit);
        self.max_concurrent_llm_calls = env_parse("MAX_CONCURRENT_LLM_CALLS", "usize")?
            .unwrap_or(self.max_concurrent_llm_calls);
        self.verbose_logging =
            env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging);

        Ok(self)
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }
        if self.context_size < 2 {
            return Err(ConfigError::InvalidContextSize {
                value: self.context_size,
            }
            .into());
        }
        if self.max_concurrent_llm_calls == 0 {
            return Err(ConfigError::InvalidConcurrency {
                value: self.max_concurrent_llm_calls,
            }
            .into());
        }
        if self.page_limit == 0 {
            return Err(ConfigError::InvalidPageLimit.into());
        }
        Ok(())
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn valid_config() -> Config {
        Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.context_size, 4);
        assert_eq!(config.page_limit, 32);
        assert_eq!(config.max_output_tokens, 1024);
        assert_eq!(config.llm_model_name, "gpt-4o-mini");
        assert!(config.transcript_file.is_none());
    }

    #[test]
    fn test_validate_requires_api_key() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_validate_rejects_context_size_below_two() {
        for value in [0, 1] {
            let config = Config {
                context_size: value,
                ..valid_config()
            };
            let err = config.validate().unwrap_err();
            assert!(matches!(
                err,
                AppError::Config(ConfigError::InvalidContextSize { .. })
            ));
        }
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            max_concurrent_llm_calls: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_page_limit() {
        let config = Config {
            page_limit: 0,
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::InvalidPageLimit)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            llm_model_name = "gpt-4o"
            context_size = 6
            transcript_file = "answers.jsonl"
            "#,
            "inline.toml",
        )
        .unwrap();

        assert_eq!(config.llm_model_name, "gpt-4o");
        assert_eq!(config.context_size, 6);
        assert_eq!(config.transcript_file.as_deref(), Some("answers.jsonl"));
        assert_eq!(config.page_limit, 32);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let err = Config::from_toml_str("context_size = \"many\"", "bad.toml").unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
