//! 递归 map-reduce 编排器 - 编排层
//!
//! ## 流程
//!
//! 对每个节点（一段连续页面）：
//! 1. 没有页面 → `Absent`，不调用 LLM
//! 2. 页数 < `context_size` → 拼接后交给 map 服务
//! 3. 否则分区，每个分区作为子节点并发递归，**全部**完成后按分区顺序交给 reduce 服务
//!
//! ## 并发
//!
//! - 每个扇出节点持有自己的 `JoinSet`，任务数等于分区数
//! - 整棵树共享一个 `Semaphore` 作为 LLM 调用的全局并发上限
//! - 子分支的结果按分区下标归位，与完成顺序无关
//! - 任一子分支失败时取消同层其余分支，错误原样向上传播

use crate::clients::{LanguageModel, LimitedModel};
use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::models::{join_pages, Page, PartialResult};
use crate::orchestrator::partition::partition_bounds;
use crate::services::{MapService, ReduceService};
use futures::future::BoxFuture;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// 编排参数
#[derive(Debug, Clone)]
pub struct MapReduceSettings {
    pub model_name: String,
    pub context_size: usize,
    pub max_output_tokens: u32,
    pub max_concurrent_llm_calls: usize,
}

impl MapReduceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model_name: config.llm_model_name.clone(),
            context_size: config.context_size,
            max_output_tokens: config.max_output_tokens,
            max_concurrent_llm_calls: config.max_concurrent_llm_calls,
        }
    }
}

/// 单次运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapReduceStats {
    /// map 阶段的 LLM 调用数
    pub map_calls: usize,
    /// reduce 阶段实际发生的 LLM 调用数
    pub reduce_calls: usize,
    /// 因子分支全部无结果而跳过的 reduce 数
    pub skipped_reduces: usize,
    /// 到达的最大递归深度（根节点为 0）
    pub max_depth: usize,
    pub elapsed: Duration,
}

/// 单次运行的结果
#[derive(Debug, Clone)]
pub struct MapReduceOutcome {
    pub result: PartialResult,
    pub stats: MapReduceStats,
}

#[derive(Default)]
struct StatsCounter {
    map_calls: AtomicUsize,
    reduce_calls: AtomicUsize,
    skipped_reduces: AtomicUsize,
    max_depth: AtomicUsize,
}

impl StatsCounter {
    fn snapshot(&self, elapsed: Duration) -> MapReduceStats {
        MapReduceStats {
            map_calls: self.map_calls.load(Ordering::Relaxed),
            reduce_calls: self.reduce_calls.load(Ordering::Relaxed),
            skipped_reduces: self.skipped_reduces.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// 一次运行中所有分支共享的只读状态
#[derive(Clone)]
struct RunState {
    query: Arc<str>,
    pages: Arc<[Page]>,
    stats: Arc<StatsCounter>,
}

impl RunState {
    /// 日志前缀，显示深度和原始页码范围
    fn label(&self, range: &Range<usize>, depth: usize) -> String {
        if range.is_empty() {
            return format!("[深度 {} | 空]", depth);
        }
        format!(
            "[深度 {} | 第 {}-{} 页]",
            depth,
            self.pages[range.start].number,
            self.pages[range.end - 1].number
        )
    }
}

struct Inner {
    mapper: MapService,
    reducer: ReduceService,
    context_size: usize,
}

/// 递归 map-reduce 编排器
///
/// 克隆开销很小，内部共享同一组服务和并发限流器。
#[derive(Clone)]
pub struct MapReduce {
    inner: Arc<Inner>,
}

impl MapReduce {
    /// 创建编排器，并为它单独创建一个全局并发限流器
    pub fn new(llm: Arc<dyn LanguageModel>, settings: MapReduceSettings) -> AppResult<Self> {
        if settings.max_concurrent_llm_calls == 0 {
            return Err(ConfigError::InvalidConcurrency {
                value: settings.max_concurrent_llm_calls,
            }
            .into());
        }
        let limiter = Arc::new(Semaphore::new(settings.max_concurrent_llm_calls));
        Self::with_limiter(llm, limiter, settings)
    }

    /// 使用外部注入的并发限流器创建编排器
    ///
    /// `context_size < 2` 时分区不会缩小，递归无法终止，因此直接拒绝。
    pub fn with_limiter(
        llm: Arc<dyn LanguageModel>,
        limiter: Arc<Semaphore>,
        settings: MapReduceSettings,
    ) -> AppResult<Self> {
        if settings.context_size < 2 {
            return Err(ConfigError::InvalidContextSize {
                value: settings.context_size,
            }
            .into());
        }

        let llm: Arc<dyn LanguageModel> = Arc::new(LimitedModel::new(llm, limiter));

        Ok(Self {
            inner: Arc::new(Inner {
                mapper: MapService::new(
                    llm.clone(),
                    settings.model_name.clone(),
                    settings.max_output_tokens,
                ),
                reducer: ReduceService::new(llm, settings.model_name, settings.max_output_tokens),
                context_size: settings.context_size,
            }),
        })
    }

    /// 对整份文档执行一次查询
    ///
    /// # 参数
    /// - `query`: 用户查询，原样传给每一次 LLM 调用
    /// - `pages`: 已过滤掉空白页的页面序列
    ///
    /// # 返回
    /// 最终结果（可能为 `Absent`）和本次运行的统计
    pub async fn run(&self, query: &str, pages: Arc<[Page]>) -> AppResult<MapReduceOutcome> {
        let started = Instant::now();
        let total = pages.len();
        let state = RunState {
            query: Arc::from(query),
            pages,
            stats: Arc::new(StatsCounter::default()),
        };

        info!(
            "🗺️ 开始 map-reduce: {} 页, context_size = {}",
            total, self.inner.context_size
        );

        let result = self.clone().reduce_node(state.clone(), 0..total, 0).await?;
        let stats = state.stats.snapshot(started.elapsed());

        Ok(MapReduceOutcome { result, stats })
    }

    /// 处理一个节点：空 → map → 扇出 + reduce
    fn reduce_node(
        self,
        state: RunState,
        range: Range<usize>,
        depth: usize,
    ) -> BoxFuture<'static, AppResult<PartialResult>> {
        Box::pin(async move {
            state.stats.max_depth.fetch_max(depth, Ordering::Relaxed);

            if range.is_empty() {
                return Ok(PartialResult::Absent);
            }

            let label = state.label(&range, depth);

            if range.len() < self.inner.context_size {
                let content = join_pages(&state.pages[range.clone()]);
                debug!("{} map: {} 页, {} 字符", label, range.len(), content.len());
                state.stats.map_calls.fetch_add(1, Ordering::Relaxed);
                return self.inner.mapper.map(&state.query, &content).await;
            }

            let partials = self.fan_out(&state, range, depth).await?;

            if partials.iter().any(PartialResult::is_present) {
                state.stats.reduce_calls.fetch_add(1, Ordering::Relaxed);
            } else {
                debug!("{} 所有子分支均无结果", label);
                state.stats.skipped_reduces.fetch_add(1, Ordering::Relaxed);
            }

            debug!("{} reduce: {} 个子结果", label, partials.len());
            self.inner.reducer.reduce(&state.query, partials).await
        })
    }

    /// 并发递归处理每个分区，等待全部完成后按分区顺序返回结果
    async fn fan_out(
        &self,
        state: &RunState,
        range: Range<usize>,
        depth: usize,
    ) -> AppResult<Vec<PartialResult>> {
        let bounds = partition_bounds(range.len(), self.inner.context_size);
        let count = bounds.len();

        debug!("{} 扇出 {} 个分区", state.label(&range, depth), count);

        let mut branches = JoinSet::new();
        for (index, bound) in bounds.into_iter().enumerate() {
            let sub_range = (range.start + bound.start)..(range.start + bound.end);
            let branch = self.clone().reduce_node(state.clone(), sub_range, depth + 1);
            branches.spawn(async move { (index, branch.await) });
        }

        let mut slots: Vec<Option<PartialResult>> = (0..count).map(|_| None).collect();

        while let Some(joined) = branches.join_next().await {
            let (index, result) = joined?;
            match result {
                Ok(partial) => slots[index] = Some(partial),
                Err(e) => {
                    warn!(
                        "{} 第 {} 个分区失败，取消其余分支: {}",
                        state.label(&range, depth),
                        index,
                        e
                    );
                    branches.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(slots.into_iter().map(Option::unwrap_or_default).collect())
    }
}
