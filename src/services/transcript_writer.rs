//! 问答记录服务 - 业务能力层
//!
//! 只负责"追加一条问答记录"，不关心流程

use crate::error::AppResult;
use crate::models::PartialResult;
use crate::orchestrator::MapReduceStats;
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 一条问答记录（JSON Lines 中的一行）
#[derive(Debug, Serialize)]
pub struct TranscriptRecord<'a> {
    pub timestamp: String,
    pub query: &'a str,
    /// 没有结果时为 null
    pub answer: Option<&'a str>,
    pub map_calls: usize,
    pub reduce_calls: usize,
    pub skipped_reduces: usize,
    pub max_depth: usize,
    pub elapsed_ms: u64,
}

/// 问答记录写入服务
pub struct TranscriptWriter {
    path: String,
}

impl TranscriptWriter {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 追加一条记录
    ///
    /// # 参数
    /// - `query`: 用户查询
    /// - `result`: map-reduce 的最终结果
    /// - `stats`: 本次运行的统计
    pub async fn write(
        &self,
        query: &str,
        result: &PartialResult,
        stats: &MapReduceStats,
    ) -> AppResult<()> {
        let record = TranscriptRecord {
            timestamp: chrono::Local::now().to_rfc3339(),
            query,
            answer: result.as_text(),
            map_calls: stats.map_calls,
            reduce_calls: stats.reduce_calls,
            skipped_reduces: stats.skipped_reduces,
            max_depth: stats.max_depth,
            elapsed_ms: stats.elapsed.as_millis() as u64,
        };

        let mut line = serde_json::to_string(&record).map_err(std::io::Error::from)?;
        line.push('\n');

        debug!("写入问答记录: {} ({} 字节)", self.path, line.len());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
