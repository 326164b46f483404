use anyhow::Result;

use ai_competition_creator::config::Config;
use ai_competition_creator::orchestrator::App;
use ai_competition_creator::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
