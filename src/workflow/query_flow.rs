//! 查询处理流程 - 流程层
//!
//! 核心职责：定义"一个查询"的完整处理流程
//!
//! 流程顺序：
//! 1. 递归 map-reduce 得到结果
//! 2. 输出统计
//! 3. 写入问答记录（如果配置了）

use crate::clients::LanguageModel;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{Page, PartialResult};
use crate::orchestrator::{MapReduce, MapReduceSettings};
use crate::services::TranscriptWriter;
use crate::utils::logging::{log_query_stats, truncate_text};
use crate::workflow::query_ctx::QueryCtx;
use std::sync::Arc;
use tracing::{info, warn};

/// 查询处理流程
///
/// - 不持有页面，页面由调用方传入并在多个查询间共享
/// - 只依赖编排层和记录服务
pub struct QueryFlow {
    map_reduce: MapReduce,
    transcript: Option<TranscriptWriter>,
}

impl QueryFlow {
    pub fn new(map_reduce: MapReduce, transcript: Option<TranscriptWriter>) -> Self {
        Self {
            map_reduce,
            transcript,
        }
    }

    /// 根据配置创建流程
    pub fn from_config(config: &Config, llm: Arc<dyn LanguageModel>) -> AppResult<Self> {
        let map_reduce = MapReduce::new(llm, MapReduceSettings::from_config(config))?;
        let transcript = config
            .transcript_file
            .as_ref()
            .map(TranscriptWriter::with_path);
        Ok(Self::new(map_reduce, transcript))
    }

    pub async fn run(&self, ctx: &QueryCtx, pages: Arc<[Page]>) -> AppResult<PartialResult> {
        info!("{} ❓ {}", ctx, truncate_text(&ctx.query, 80));

        let outcome = self.map_reduce.run(&ctx.query, pages).await?;

        log_query_stats(&ctx.to_string(), &outcome.stats);

        match &outcome.result {
            PartialResult::Present(answer) => {
                info!("{} ✓ 得到回答 ({} 字符)", ctx, answer.chars().count())
            }
            PartialResult::Absent => warn!("{} ⚠️ map-reduce 过程中没有得到任何内容", ctx),
        }

        if let Some(writer) = &self.transcript {
            if let Err(e) = writer.write(&ctx.query, &outcome.result, &outcome.stats).await {
                warn!("{} ⚠️ 写入问答记录 {} 失败: {}", ctx, writer.path(), e);
            }
        }

        Ok(outcome.result)
    }
}
