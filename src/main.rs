use std::path::PathBuf;

use anyhow::Result;
use pathway_analysis::utils::logging;
use pathway_analysis::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 第一个参数可以指定请求文件
    let request_path = std::env::args().nth(1).map(PathBuf::from);

    // 初始化并运行应用
    App::initialize(config, request_path).await?.run().await?;

    Ok(())
}
