/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use crate::config::Config;
use crate::orchestrator::MapReduceStats;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 优先使用 `RUST_LOG`，否则默认 `info`（verbose 时为 `debug`）。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置
/// - `document`: 文档路径
/// - `page_count`: 加载的文本页数
pub fn log_startup(config: &Config, document: &str, page_count: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 递归 map-reduce 文档问答");
    info!("📄 文档: {} ({} 页)", document, page_count);
    info!(
        "🤖 模型: {} | context_size: {} | 最大并发: {}",
        config.llm_model_name, config.context_size, config.max_concurrent_llm_calls
    );
    info!("{}", "=".repeat(60));
}

/// 记录单次查询的统计信息
pub fn log_query_stats(prefix: &str, stats: &MapReduceStats) {
    info!("{} {}", prefix, "─".repeat(40));
    info!(
        "{} 📊 map 调用: {} | reduce 调用: {} | 跳过的 reduce: {} | 最大深度: {}",
        prefix, stats.map_calls, stats.reduce_calls, stats.skipped_reduces, stats.max_depth
    );
    info!(
        "{} ⏱️ 耗时: {} ms | 完成时间: {}",
        prefix,
        stats.elapsed.as_millis(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
