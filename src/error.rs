//! 错误类型定义
//!
//! 按来源划分为 LLM / 文档 / 配置三类，统一收敛到 [`AppError`]。
//!
//! 注意：模型返回空内容不是错误，而是 `PartialResult::Absent`；
//! 只有真正的调用失败才会以 `AppError` 的形式向上传播。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 文档读取错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 并发分支异常退出（panic 或被取消）
    #[error("分支任务执行失败: {0}")]
    Task(#[from] tokio::task::JoinError),
    /// IO 错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 请求构建失败
    #[error("LLM 请求构建失败: {source}")]
    RequestBuildFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 并发限流器已关闭
    #[error("LLM 并发限流器已关闭")]
    LimiterClosed,
}

/// 文档读取错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 不支持的文件格式
    #[error("不支持的文件格式: {path}")]
    UnsupportedFormat { path: String },
    /// PDF 解析失败
    #[error("PDF解析失败 ({path}): {message}")]
    PdfParsing { path: String, message: String },
    /// 文档中没有任何包含文本的页面
    #[error("文档中没有包含文本的页面: {path}")]
    NoTextPages { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少 API Key
    #[error("缺少 API Key，请设置环境变量 OPENAI_API_KEY")]
    MissingApiKey,
    /// context_size 过小，递归无法收敛
    #[error("context_size 必须大于等于 2，当前值: {value}")]
    InvalidContextSize { value: usize },
    /// 并发数非法
    #[error("最大并发数必须大于 0，当前值: {value}")]
    InvalidConcurrency { value: usize },
    /// 页数上限为 0
    #[error("页数上限必须大于 0")]
    InvalidPageLimit,
    /// TOML 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM请求构建错误
    pub fn llm_request_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Llm(LlmError::RequestBuildFailed {
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
