//! # Doc Map Reduce
//!
//! 对长文档进行查询驱动的递归 map-reduce 摘要
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只暴露 `LanguageModel` 能力
//! - `OpenAiClient` - OpenAI 兼容的聊天补全
//! - `LimitedModel` - 全局并发上限
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每次只做一次 LLM 调用
//! - `MapService` - 从一组页面中提取相关内容
//! - `ReduceService` - 合并多个分支结果
//! - `TranscriptWriter` - 写问答记录
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/partition` - 页面分区
//! - `orchestrator/map_reduce` - 递归扇出与结果折叠
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一个查询"的完整处理流程
//! - `QueryCtx` - 上下文封装（查询序号 + 查询内容）
//! - `QueryFlow` - 流程编排（map-reduce → 统计 → 记录）
//!
//! ## 模块结构

pub mod app;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{LanguageModel, LimitedModel, OpenAiClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Page, PartialResult};
pub use orchestrator::{MapReduce, MapReduceOutcome, MapReduceSettings, MapReduceStats};
pub use workflow::{QueryCtx, QueryFlow};
