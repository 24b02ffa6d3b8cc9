use anyhow::Result;
use clap::Parser;
use doc_map_reduce::cli::Cli;
use doc_map_reduce::utils::logging;
use doc_map_reduce::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = cli.load_config().await?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config, &cli.file).await?;
    app.run(cli.query.clone()).await?;

    Ok(())
}
