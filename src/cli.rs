//! 命令行参数

use crate::config::Config;
use crate::error::AppResult;
use clap::Parser;
use std::path::PathBuf;

/// 对长文档进行递归 map-reduce 问答
#[derive(Debug, Parser)]
#[command(name = "doc_map_reduce", version, about)]
pub struct Cli {
    /// 文档路径（.pdf / .txt / .md）
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// 模型名称
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// 每一层合并的分组数（>= 2）
    #[arg(short = 's', long)]
    pub context_size: Option<usize>,

    /// 最多读取的文本页数
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// 只回答这一个查询；不提供时进入交互模式
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// TOML 配置文件
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// 整个递归树的最大并发 LLM 调用数
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// 问答记录文件（JSON Lines）
    #[arg(long)]
    pub transcript: Option<String>,

    /// 显示详细日志
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// 按 默认值 → 配置文件 → 环境变量 → 命令行 的顺序加载配置
    pub async fn load_config(&self) -> AppResult<Config> {
        let base = match &self.config {
            Some(path) => Config::from_toml_file(path).await?,
            None => Config::default(),
        };
        let mut config = base.with_env()?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// 用命令行参数覆盖配置
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.llm_model_name = model.clone();
        }
        if let Some(context_size) = self.context_size {
            config.context_size = context_size;
        }
        if let Some(limit) = self.limit {
            config.page_limit = limit;
        }
        if let Some(max_concurrency) = self.max_concurrency {
            config.max_concurrent_llm_calls = max_concurrency;
        }
        if let Some(transcript) = &self.transcript {
            config.transcript_file = Some(transcript.clone());
        }
        if self.verbose {
            config.verbose_logging = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "doc_map_reduce",
            "-f",
            "report.pdf",
            "-m",
            "gpt-4o",
            "-s",
            "6",
            "-l",
            "10",
            "-q",
            "what changed?",
        ])
        .unwrap();

        assert_eq!(cli.file, PathBuf::from("report.pdf"));
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.context_size, Some(6));
        assert_eq!(cli.limit, Some(10));
        assert_eq!(cli.query.as_deref(), Some("what changed?"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_file_is_required() {
        assert!(Cli::try_parse_from(["doc_map_reduce", "-q", "x"]).is_err());
    }

    #[test]
    fn test_overrides_only_touch_given_fields() {
        let cli = Cli::try_parse_from([
            "doc_map_reduce",
            "--file",
            "a.txt",
            "--context-size",
            "3",
            "--max-concurrency",
            "2",
            "--transcript",
            "log.jsonl",
            "-v",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.context_size, 3);
        assert_eq!(config.max_concurrent_llm_calls, 2);
        assert_eq!(config.transcript_file.as_deref(), Some("log.jsonl"));
        assert!(config.verbose_logging);
        assert_eq!(config.llm_model_name, "gpt-4o-mini");
        assert_eq!(config.page_limit, 32);
    }
}
